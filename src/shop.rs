use std::{fmt::Debug, sync::Arc};

use tokio::sync::watch;
use tracing::{info, info_span, Instrument};

use crate::{
    arrival::{ArrivalScheduler, Arrivals, Timer},
    barber::BarberPool,
    config::{ShopConfig, ShopInput},
    customer::{Customer, CustomerId},
    error::{ConfigError, Result},
    events::{ShopEvent, ShopObserver},
    room::{Admission, WaitingRoom},
};

/// Where the shop is in its day.
///
/// Only ever moves forwards: `Open -> Closing -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShopState {
    /// Letting customers in and cutting hair.
    Open,
    /// Turning new customers away, still cutting hair for anyone already waiting.
    Closing,
    /// Every barber has gone home.
    Closed,
}

/// The front door: seats arriving customers or turns them away, and tells the observer which.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct Reception {
    room: Arc<WaitingRoom>,
    observer: Arc<dyn ShopObserver>,
}

impl Debug for Reception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reception")
            .field("room", &self.room)
            .finish_non_exhaustive()
    }
}

impl Reception {
    pub(crate) fn new(room: Arc<WaitingRoom>, observer: Arc<dyn ShopObserver>) -> Self {
        Self { room, observer }
    }

    /// A customer walks in. Never waits.
    pub fn arrive(&self, customer: CustomerId) -> Admission {
        self.room.try_admit_and_report(customer, |admission| {
            let event = match admission {
                Admission::Admitted => ShopEvent::CustomerAdmitted { customer },
                Admission::Rejected(reason) => ShopEvent::CustomerRejected { customer, reason },
            };
            self.observer.on_event(&event);
        })
    }
}

/// A barbershop: a waiting room, some barbers, and a closing time.
///
/// ## Drop
///
/// Dropping a `Shop` without calling [`join()`](Shop::join) sends the barbers home immediately,
/// even mid-haircut. To close gracefully, call [`close()`](Shop::close) then `join()`.
pub struct Shop {
    room: Arc<WaitingRoom>,
    barbers: BarberPool,
    observer: Arc<dyn ShopObserver>,
    state: watch::Sender<ShopState>,
}

impl Debug for Shop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shop")
            .field("room", &self.room)
            .field("barbers", &self.barbers.len())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl Shop {
    /// Open the shop: set out the waiting chairs and put the barbers to work.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: ShopConfig, observer: impl ShopObserver) -> Result<Self> {
        if config.barbers == 0 {
            return Err(ConfigError::NoBarbers.into());
        }

        let observer: Arc<dyn ShopObserver> = Arc::new(observer);
        let room = Arc::new(WaitingRoom::new(config.waiting_chairs));
        let barbers = BarberPool::spawn(
            config.barbers,
            Arc::clone(&room),
            config.service_duration(),
            Arc::clone(&observer),
        );
        let (state, _) = watch::channel(ShopState::Open);

        info!(
            waiting_chairs = config.waiting_chairs,
            barbers = config.barbers,
            "The shop is open"
        );

        Ok(Self {
            room,
            barbers,
            observer,
            state,
        })
    }

    /// The front door, for sending customers in from elsewhere.
    pub fn reception(&self) -> Reception {
        Reception::new(Arc::clone(&self.room), Arc::clone(&self.observer))
    }

    /// A customer walks in now.
    pub fn arrive(&self, customer: CustomerId) -> Admission {
        self.reception().arrive(customer)
    }

    /// Have customers walk in at their arrival offsets, measured from now.
    ///
    /// The arrivals happen whether or not the returned [`Arrivals`] is kept.
    pub fn schedule_arrivals(&self, customers: Vec<Customer>) -> Arrivals {
        ArrivalScheduler::new().schedule(self.reception(), customers)
    }

    /// Like [`schedule_arrivals()`](Shop::schedule_arrivals), with a custom timer.
    pub fn schedule_arrivals_with<T: Timer>(&self, timer: T, customers: Vec<Customer>) -> Arrivals {
        ArrivalScheduler::with_timer(timer).schedule(self.reception(), customers)
    }

    /// Stop letting customers in. Barbers finish everyone already waiting, then go home.
    ///
    /// Idempotent.
    pub fn close(&self) {
        let closing = self.state.send_if_modified(|state| {
            if *state == ShopState::Open {
                *state = ShopState::Closing;
                true
            } else {
                false
            }
        });

        if closing {
            info!(waiting = self.room.len(), "The shop is closing");
            self.room.close();
        }
    }

    /// Wait for every barber to go home.
    ///
    /// Only returns once the shop has been [closed](Shop::close) and the waiting room drained.
    pub async fn join(mut self) -> Result<()> {
        let result = self
            .barbers
            .join()
            .instrument(info_span!("join"))
            .await;

        self.state.send_replace(ShopState::Closed);
        self.observer.on_event(&ShopEvent::ShopClosed);
        info!("The shop is closed");

        result
    }

    /// Where the shop is in its day.
    pub fn state(&self) -> ShopState {
        *self.state.borrow()
    }

    /// Watch the shop's state change.
    pub fn subscribe(&self) -> watch::Receiver<ShopState> {
        self.state.subscribe()
    }

    /// The number of customers currently waiting.
    pub fn waiting(&self) -> usize {
        self.room.len()
    }
}

/// Run a whole day: open the shop, let every customer arrive, close once the last one has walked
/// in, and wait for the barbers to finish.
pub async fn run(input: &ShopInput, observer: impl ShopObserver) -> Result<()> {
    let shop = Shop::start(input.config, observer)?;

    let arrived = shop.schedule_arrivals(input.customers()).wait().await;

    // Serve whoever did get in before reporting a broken timeline.
    shop.close();
    let joined = shop.join().await;

    arrived.and(joined)
}
