//! Customers walking in on schedule.

use std::{future::Future, time::Duration};

use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, info_span, Instrument};

use crate::{
    customer::Customer,
    error::{Result, ShopError},
    shop::Reception,
};

/// Offsets beyond this are clamped. Roughly thirty years.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// The ability to wait until a point in time.
///
/// The arrival timeline uses this to decide when each customer walks in.
pub trait Timer: Send + Sync + 'static {
    /// Resolves no earlier than `deadline`.
    fn sleep_until(&self, deadline: Instant) -> impl Future<Output = ()> + Send;
}

/// A [`Timer`] driven by the tokio clock, so it respects `tokio::time::pause()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep_until(&self, deadline: Instant) -> impl Future<Output = ()> + Send {
        tokio::time::sleep_until(deadline)
    }
}

/// Sends each customer to reception at their arrival offset.
///
/// All arrivals share one timeline task, separate from the caller. Customers with the same offset
/// arrive back to back, in order.
#[derive(Debug, Clone)]
pub struct ArrivalScheduler<T = TokioTimer> {
    timer: T,
}

/// The arrival timeline for a run.
///
/// Dropping it leaves the timeline running in the background. Use [`cancel()`](Arrivals::cancel)
/// to stop any arrivals that have not happened yet.
#[derive(Debug)]
pub struct Arrivals {
    handle: JoinHandle<()>,
}

impl ArrivalScheduler<TokioTimer> {
    /// A scheduler using the tokio clock.
    pub fn new() -> Self {
        Self::with_timer(TokioTimer)
    }
}

impl Default for ArrivalScheduler<TokioTimer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Timer> ArrivalScheduler<T> {
    /// A scheduler using the given timer.
    pub fn with_timer(timer: T) -> Self {
        Self { timer }
    }

    /// Start the arrival timeline, measuring offsets from now.
    ///
    /// Arrivals after closing time still happen. Reception turns them away.
    pub fn schedule(self, reception: Reception, mut customers: Vec<Customer>) -> Arrivals {
        let start = Instant::now();
        // Ties keep their original order.
        customers.sort_by_key(|c| c.arrival_offset);

        let timer = self.timer;
        let handle = tokio::spawn(
            async move {
                for customer in customers {
                    let deadline = start + customer.arrival_offset.min(FAR_FUTURE);
                    // Don't yield between customers who are already due, so they arrive together.
                    if deadline > Instant::now() {
                        timer.sleep_until(deadline).await;
                    }
                    reception.arrive(customer.id);
                }
                debug!("Every customer has arrived");
            }
            .instrument(info_span!("arrivals")),
        );

        Arrivals { handle }
    }
}

impl Arrivals {
    /// Wait until every scheduled customer has arrived.
    ///
    /// Fails if the timeline stopped early, e.g. because an observer panicked while a customer was
    /// walking in. The customers after that point never arrived.
    pub async fn wait(self) -> Result<()> {
        self.handle
            .await
            .map_err(|source| ShopError::ArrivalsFailed { source })
    }

    /// Whether the timeline has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop any arrivals that have not happened yet.
    pub fn cancel(self) {
        self.handle.abort();
    }
}
