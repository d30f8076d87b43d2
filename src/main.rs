use std::{process::ExitCode, time::Duration};

use barbershop::{EventRecorder, ShopInput, TracingObserver};
use tracing::error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: barbershop <input-file> [time-unit-ms]";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    let time_unit = match args.next().map(|ms| ms.parse::<u64>()) {
        None => None,
        Some(Ok(ms)) => Some(Duration::from_millis(ms)),
        Some(Err(_)) => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let input = match ShopInput::from_path(&path) {
        Ok(input) => input,
        Err(err) => {
            error!(error = &err as &(dyn std::error::Error + 'static), "Unable to load {path}");
            return ExitCode::FAILURE;
        }
    };
    let input = match time_unit {
        Some(time_unit) => input.with_time_unit(time_unit),
        None => input,
    };

    let recorder = EventRecorder::new();
    if let Err(err) = barbershop::run(&input, (TracingObserver, recorder.clone())).await {
        error!(error = &err as &(dyn std::error::Error + 'static), "The run did not finish cleanly");
        return ExitCode::FAILURE;
    }

    println!("\n=== Shop ===");
    println!("{}", input.config());
    println!("\n=== Results ===");
    println!("{}", recorder.summary());

    ExitCode::SUCCESS
}
