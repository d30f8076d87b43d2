//! Errors.

use std::{fmt::Display, io, path::PathBuf};

use thiserror::Error;
use tokio::task::JoinError;

use crate::barber::BarberId;

/// An error that occurred while setting up or shutting down the shop.
///
/// Turning customers away is not an error: see [`Admission`](crate::Admission).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ShopError {
    /// The shop could not be opened with the given configuration.
    #[error("Invalid shop configuration")]
    InvalidConfig(#[from] ConfigError),

    /// A barber task panicked or was aborted before it could drain the waiting room.
    ///
    /// Unrecoverable.
    #[error("Barber {barber} did not finish cleanly")]
    BarberPanicked {
        /// The barber whose task failed.
        barber: BarberId,
        /// Why the task failed.
        #[source]
        source: JoinError,
    },

    /// The arrival timeline stopped before every customer had walked in.
    ///
    /// Unrecoverable.
    #[error("The arrival timeline did not finish cleanly")]
    ArrivalsFailed {
        /// Why the task failed.
        #[source]
        source: JoinError,
    },
}

/// A problem with the shop's configuration or with the input describing a run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// A shop needs at least one barber.
    #[error("A shop needs at least one barber")]
    NoBarbers,

    /// The input file could not be read.
    #[error("Unable to read input file {}", path.display())]
    Io {
        /// The file we tried to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The input has no header line.
    #[error("The input is empty: expected a header line")]
    MissingHeader,

    /// The header line is too short.
    #[error("Line {line}: missing header field `{field}`")]
    MissingField {
        /// 1-based line number.
        line: usize,
        /// The name of the missing field.
        field: HeaderField,
    },

    /// A value that should have been a non-negative integer.
    #[error("Line {line}: expected a non-negative integer, got `{value}`")]
    InvalidInteger {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        value: String,
    },
}

/// The fields of the input header line, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    /// Number of waiting chairs (waiting room capacity).
    WaitingChairs,
    /// Number of barbers.
    Barbers,
    /// Number of barber chairs.
    BarberChairs,
}

impl Display for HeaderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HeaderField::WaitingChairs => "waiting_chairs",
            HeaderField::Barbers => "barbers",
            HeaderField::BarberChairs => "barber_chairs",
        })
    }
}

/// Result type for shop operations.
pub type Result<T> = std::result::Result<T, ShopError>;
