//! What happens in the shop, and who gets told about it.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{barber::BarberId, customer::CustomerId, room::RejectionReason};

/// Something that happened during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopEvent {
    /// A customer took a waiting chair.
    CustomerAdmitted {
        /// Who.
        customer: CustomerId,
    },
    /// A customer was turned away.
    CustomerRejected {
        /// Who.
        customer: CustomerId,
        /// Why.
        reason: RejectionReason,
    },
    /// A barber started cutting a customer's hair.
    ServiceStarted {
        /// Whose hair.
        customer: CustomerId,
        /// Which barber.
        barber: BarberId,
    },
    /// A barber finished a haircut and the customer left.
    ServiceFinished {
        /// Whose hair.
        customer: CustomerId,
        /// Which barber.
        barber: BarberId,
    },
    /// Every barber has gone home.
    ShopClosed,
}

impl Display for ShopEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShopEvent::CustomerAdmitted { customer } => {
                write!(f, "Customer {customer} enters and sits in a waiting chair")
            }
            ShopEvent::CustomerRejected { customer, reason } => {
                write!(f, "Customer {customer} arrives but leaves: {reason}")
            }
            ShopEvent::ServiceStarted { customer, barber } => {
                write!(f, "Barber {barber} starts cutting customer {customer}'s hair")
            }
            ShopEvent::ServiceFinished { customer, barber } => {
                write!(f, "Customer {customer} leaves after being served by barber {barber}")
            }
            ShopEvent::ShopClosed => f.write_str("The shop is closed"),
        }
    }
}

/// Receives every [`ShopEvent`] as it happens.
///
/// Called from barber tasks and from the arrival timeline, sometimes with the waiting room locked.
/// Implementations must be quick and must not block.
pub trait ShopObserver: Send + Sync + 'static {
    /// Called once per event, in the order the events happen for any one customer.
    fn on_event(&self, event: &ShopEvent);
}

/// Logs every event with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ShopObserver for TracingObserver {
    fn on_event(&self, event: &ShopEvent) {
        info!("{event}");
    }
}

impl ShopObserver for mpsc::UnboundedSender<ShopEvent> {
    fn on_event(&self, event: &ShopEvent) {
        if self.send(*event).is_err() {
            // Whoever was listening has gone away. Nothing to do but carry on.
            debug!("Dropped shop event, receiver closed: {event}");
        }
    }
}

impl<A: ShopObserver, B: ShopObserver> ShopObserver for (A, B) {
    fn on_event(&self, event: &ShopEvent) {
        self.0.on_event(event);
        self.1.on_event(event);
    }
}

impl<O: ShopObserver + ?Sized> ShopObserver for Arc<O> {
    fn on_event(&self, event: &ShopEvent) {
        (**self).on_event(event);
    }
}

/// Keeps every event, in order.
///
/// Cheap to clone. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<ShopEvent>>>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<ShopEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tally up what has been recorded so far.
    pub fn summary(&self) -> ShopSummary {
        ShopSummary::from_events(&self.events())
    }
}

impl ShopObserver for EventRecorder {
    fn on_event(&self, event: &ShopEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*event);
    }
}

/// Counts of what happened in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopSummary {
    /// Customers who got a waiting chair.
    pub admitted: usize,
    /// Customers turned away because the room was full.
    pub rejected_room_full: usize,
    /// Customers turned away because the shop was closing.
    pub rejected_closing: usize,
    /// Haircuts finished.
    pub served: usize,
    /// Haircuts finished, per barber.
    pub served_by_barber: BTreeMap<BarberId, usize>,
    /// Whether every barber went home.
    pub closed: bool,
}

impl ShopSummary {
    /// Tally a sequence of events.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a ShopEvent>) -> Self {
        events
            .into_iter()
            .fold(ShopSummary::default(), |mut summary, event| {
                match event {
                    ShopEvent::CustomerAdmitted { .. } => summary.admitted += 1,
                    ShopEvent::CustomerRejected { reason, .. } => match reason {
                        RejectionReason::RoomFull => summary.rejected_room_full += 1,
                        RejectionReason::ShopClosing => summary.rejected_closing += 1,
                    },
                    ShopEvent::ServiceStarted { .. } => {}
                    ShopEvent::ServiceFinished { barber, .. } => {
                        summary.served += 1;
                        *summary.served_by_barber.entry(*barber).or_default() += 1;
                    }
                    ShopEvent::ShopClosed => summary.closed = true,
                }
                summary
            })
    }

    /// Customers turned away for any reason.
    pub fn rejected(&self) -> usize {
        self.rejected_room_full + self.rejected_closing
    }
}

impl Display for ShopSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Admitted:           {}", self.admitted)?;
        writeln!(
            f,
            "Rejected:           {} (room full: {}, closing: {})",
            self.rejected(),
            self.rejected_room_full,
            self.rejected_closing
        )?;
        writeln!(f, "Served:             {}", self.served)?;
        for (barber, served) in &self.served_by_barber {
            writeln!(f, "  Barber {barber}:         {served}")?;
        }
        write!(f, "Closed cleanly:     {}", self.closed)
    }
}
