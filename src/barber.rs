use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{debug, debug_span, info, info_span, Instrument};

use crate::{
    customer::CustomerId,
    error::{Result, ShopError},
    events::{ShopEvent, ShopObserver},
    room::WaitingRoom,
};

/// Identifies a barber. Barbers are numbered from zero.
pub type BarberId = usize;

/// One barber's working day: take the next customer, cut their hair, repeat until sent home.
struct Barber {
    id: BarberId,
    room: Arc<WaitingRoom>,
    service_time: Duration,
    observer: Arc<dyn ShopObserver>,
}

impl Barber {
    async fn run(self) {
        debug!("Barber is waiting for customers");

        let mut served = 0usize;
        while let Some(customer) = self.room.take_next().await {
            self.serve(customer)
                .instrument(debug_span!("haircut", customer.id = customer))
                .await;
            served += 1;
        }

        info!(served, "Barber is going home");
    }

    async fn serve(&self, customer: CustomerId) {
        self.observer.on_event(&ShopEvent::ServiceStarted {
            customer,
            barber: self.id,
        });

        // Closing the shop never interrupts a haircut.
        tokio::time::sleep(self.service_time).await;

        self.observer.on_event(&ShopEvent::ServiceFinished {
            customer,
            barber: self.id,
        });
    }
}

/// The barbers working in a shop, each running as its own task.
///
/// Barbers go home once the waiting room is closed and empty. Dropping the pool before they have
/// done so sends them home immediately, mid-haircut if need be.
#[derive(Debug)]
pub(crate) struct BarberPool {
    handles: Vec<(BarberId, JoinHandle<()>)>,
}

impl BarberPool {
    /// Put `barbers` barbers to work on `room`.
    pub fn spawn(
        barbers: usize,
        room: Arc<WaitingRoom>,
        service_time: Duration,
        observer: Arc<dyn ShopObserver>,
    ) -> Self {
        let handles = (0..barbers)
            .map(|id| {
                let barber = Barber {
                    id,
                    room: Arc::clone(&room),
                    service_time,
                    observer: Arc::clone(&observer),
                };
                let handle =
                    tokio::spawn(barber.run().instrument(info_span!("barber", barber.id = id)));
                (id, handle)
            })
            .collect();

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every barber to go home.
    ///
    /// Waits for all of them even if one has failed, then reports the first failure.
    pub async fn join(&mut self) -> Result<()> {
        let mut first_failure = None;

        for (barber, handle) in self.handles.drain(..) {
            if let Err(source) = handle.await {
                first_failure.get_or_insert(ShopError::BarberPanicked { barber, source });
            }
        }

        first_failure.map_or(Ok(()), Err)
    }
}

impl Drop for BarberPool {
    fn drop(&mut self) {
        for (_, handle) in &self.handles {
            handle.abort();
        }
    }
}
