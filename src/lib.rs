//! The sleeping barber, with a bounded waiting room and a graceful closing time.
//!
//! A fixed number of barbers serve customers from a waiting room with a fixed number of chairs.
//! Customers walk in on a schedule. If every chair is taken they leave straight away, otherwise
//! they sit down and wait their turn. Customers are served strictly in the order they sat down,
//! by whichever barber is free first.
//!
//! Each barber runs as its own task and sleeps while nobody is waiting. Closing the shop turns away
//! any further customers, lets the barbers finish everyone already waiting, then sends them home.
//!
//! Everything that happens is reported to a [`ShopObserver`] as a [`ShopEvent`].
//!
//! See the README for an example.

#![deny(missing_docs)]

#[cfg(doctest)]
use doc_comment::doctest;
#[cfg(doctest)]
doctest!("../README.md");

pub mod arrival;
mod barber;
pub mod config;
mod customer;
pub mod error;
pub mod events;
mod room;
mod shop;

pub use arrival::{ArrivalScheduler, Arrivals, Timer, TokioTimer};
pub use barber::BarberId;
pub use config::{ShopConfig, ShopInput};
pub use customer::{Customer, CustomerId};
pub use error::{ConfigError, ShopError};
pub use events::{EventRecorder, ShopEvent, ShopObserver, ShopSummary, TracingObserver};
pub use room::{Admission, RejectionReason, WaitingRoom};
pub use shop::{run, Reception, Shop, ShopState};
