use std::{
    collections::VecDeque,
    fmt::{self, Display},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::Notify;
use tracing::debug;

use crate::customer::CustomerId;

/// A bounded FIFO of customers waiting for a barber.
///
/// Arrivals never wait: [`try_admit`](WaitingRoom::try_admit) either seats a customer or turns them
/// away on the spot. Barbers block in [`take_next`](WaitingRoom::take_next) until somebody is
/// waiting or the room has been closed and emptied.
///
/// Safe to share between any number of arrivals and barbers.
#[derive(Debug)]
pub struct WaitingRoom {
    capacity: usize,
    state: Mutex<RoomState>,
    /// Signalled when a customer is seated, broadcast when the room closes.
    changed: Notify,
}

#[derive(Debug)]
struct RoomState {
    queue: VecDeque<CustomerId>,
    closing: bool,
}

/// The outcome of a customer trying to get a seat in the waiting room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The customer took a seat and will be served.
    Admitted,
    /// The customer walked away.
    Rejected(RejectionReason),
}

/// Why a customer was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RejectionReason {
    /// Every waiting chair was taken.
    RoomFull,
    /// The shop has stopped letting people in.
    ShopClosing,
}

impl Admission {
    /// Whether the customer got a seat.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectionReason::RoomFull => "all waiting chairs are taken",
            RejectionReason::ShopClosing => "the shop is closing",
        })
    }
}

impl WaitingRoom {
    /// Create an empty, open waiting room with `capacity` chairs.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(RoomState {
                queue: VecDeque::with_capacity(capacity),
                closing: false,
            }),
            changed: Notify::new(),
        }
    }

    /// The number of waiting chairs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of customers currently waiting.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Whether nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Whether the room has stopped admitting customers.
    pub fn is_closing(&self) -> bool {
        self.lock().closing
    }

    /// Try to seat a customer. Never blocks.
    pub fn try_admit(&self, customer: CustomerId) -> Admission {
        self.try_admit_and_report(customer, |_| {})
    }

    /// Try to seat a customer, calling `report` with the outcome before any barber can see them.
    ///
    /// `report` runs with the room locked, so it must not touch the room.
    pub(crate) fn try_admit_and_report(
        &self,
        customer: CustomerId,
        report: impl FnOnce(Admission),
    ) -> Admission {
        let admission = {
            let mut state = self.lock();

            let admission = if state.closing {
                Admission::Rejected(RejectionReason::ShopClosing)
            } else if state.queue.len() < self.capacity {
                state.queue.push_back(customer);
                Admission::Admitted
            } else {
                Admission::Rejected(RejectionReason::RoomFull)
            };

            debug_assert!(
                state.queue.len() <= self.capacity,
                "waiting room should never hold more customers than it has chairs"
            );

            report(admission);
            admission
        };

        if admission.is_admitted() {
            self.changed.notify_one();
        }

        admission
    }

    /// Take the customer who has been waiting longest.
    ///
    /// Waits while the room is empty. Returns `None` once the room is closing and nobody is left,
    /// which is the barber's cue to go home.
    pub async fn take_next(&self) -> Option<CustomerId> {
        loop {
            // Register interest before looking, so a seat or a close that happens between the
            // check and the await still wakes us.
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(customer) = state.queue.pop_front() {
                    return Some(customer);
                }
                if state.closing {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Take the next customer if one is waiting, without blocking.
    pub fn try_take_next(&self) -> Option<CustomerId> {
        self.lock().queue.pop_front()
    }

    /// Stop admitting customers and wake every idle barber.
    ///
    /// Customers already seated stay seated and will still be served. Idempotent.
    pub fn close(&self) {
        let newly_closed = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.closing, true)
        };

        if newly_closed {
            debug!(waiting = self.len(), "Waiting room closed to new customers");
        }

        self.changed.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        // The queue stays valid even if an admission report panics after `push_back`.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
