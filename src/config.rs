//! Shop configuration, and the input format describing a run.

use std::{
    fmt::{self, Display},
    path::Path,
    str::FromStr,
    time::Duration,
};

use bon::bon;
use tracing::debug;

use crate::{
    customer::Customer,
    error::{ConfigError, HeaderField},
};

/// How a shop is set up.
///
/// All durations are whole multiples of `time_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct ShopConfig {
    pub(crate) waiting_chairs: usize,
    pub(crate) barbers: usize,
    pub(crate) service_time: u32,
    pub(crate) time_unit: Duration,
}

#[bon]
impl ShopConfig {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        /// The number of customers who can wait at once.
        waiting_chairs: usize,
        /// The number of barbers. Must be at least one.
        #[builder(default = 1)]
        barbers: usize,
        /// How long a haircut takes, in time units.
        #[builder(default = 3)]
        service_time: u32,
        /// How long one time unit lasts.
        #[builder(default = Duration::from_secs(1))]
        time_unit: Duration,
    ) -> Self {
        Self {
            waiting_chairs,
            barbers,
            service_time,
            time_unit,
        }
    }

    /// The number of customers who can wait at once.
    pub fn waiting_chairs(&self) -> usize {
        self.waiting_chairs
    }

    /// The number of barbers.
    pub fn barbers(&self) -> usize {
        self.barbers
    }

    /// How long one time unit lasts.
    pub fn time_unit(&self) -> Duration {
        self.time_unit
    }

    /// How long a haircut takes.
    pub fn service_duration(&self) -> Duration {
        self.units(self.service_time)
    }

    fn units(&self, n: u32) -> Duration {
        self.time_unit.saturating_mul(n)
    }
}

impl Display for ShopConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "waiting_chairs: {}, barbers: {}, service_time: {:?}",
            self.waiting_chairs,
            self.barbers,
            self.service_duration()
        )
    }
}

/// Everything needed for one run: the shop, and when each customer turns up.
///
/// The text format is a header line of three integers, `waiting_chairs barbers barber_chairs`,
/// followed by one line per customer starting with the number of time units since the previous
/// customer arrived. Blank lines are ignored.
///
/// ```text
/// 5 2 2
/// 0
/// 1
/// 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopInput {
    pub(crate) config: ShopConfig,
    barber_chairs: usize,
    delays: Vec<u32>,
}

impl ShopInput {
    /// A run with the given shop and gaps between arrivals, in time units.
    ///
    /// `barber_chairs` is only carried along, see [`barber_chairs()`](ShopInput::barber_chairs).
    pub fn new(config: ShopConfig, barber_chairs: usize, delays: Vec<u32>) -> Self {
        Self {
            config,
            barber_chairs,
            delays,
        }
    }

    /// Read a run from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// The shop.
    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// Use a different time unit, e.g. to replay a run faster than real time.
    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.config.time_unit = time_unit;
        self
    }

    /// The number of barber chairs given in the input.
    ///
    /// Has no effect: customers wait in one line for whichever barber is free.
    pub fn barber_chairs(&self) -> usize {
        self.barber_chairs
    }

    /// The customers, in arrival order, with offsets from the start of the run.
    pub fn customers(&self) -> Vec<Customer> {
        Customer::from_delays(self.delays.iter().map(|&d| self.config.units(d)))
    }
}

impl FromStr for ShopInput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines.next().ok_or(ConfigError::MissingHeader)?;
        let header = parse_integers(header_line, header)?;
        let field = |i: usize, field: HeaderField| {
            header.get(i).map(|&n| n as usize).ok_or(ConfigError::MissingField {
                line: header_line,
                field,
            })
        };
        let waiting_chairs = field(0, HeaderField::WaitingChairs)?;
        let barbers = field(1, HeaderField::Barbers)?;
        let barber_chairs = field(2, HeaderField::BarberChairs)?;

        let delays = lines
            .map(|(line, text)| {
                // Only the first number on a customer line means anything.
                parse_integers(line, text).map(|numbers| numbers[0])
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            waiting_chairs,
            barbers,
            barber_chairs,
            customers = delays.len(),
            "Parsed shop input"
        );

        Ok(Self {
            config: ShopConfig::builder()
                .waiting_chairs(waiting_chairs)
                .barbers(barbers)
                .build(),
            barber_chairs,
            delays,
        })
    }
}

/// Parse a non-empty line of whitespace-separated non-negative integers.
fn parse_integers(line: usize, text: &str) -> Result<Vec<u32>, ConfigError> {
    text.split_whitespace()
        .map(|value| {
            value.parse().map_err(|_| ConfigError::InvalidInteger {
                line,
                value: value.to_string(),
            })
        })
        .collect()
}
