use std::time::Duration;

/// Identifies a customer. The position of the customer in the arrival sequence.
pub type CustomerId = usize;

/// Someone who will walk into the shop at a fixed point in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customer {
    /// Who they are.
    pub id: CustomerId,
    /// When they arrive, measured from the start of the run.
    pub arrival_offset: Duration,
}

impl Customer {
    /// Turn a sequence of gaps between consecutive arrivals into customers with absolute offsets.
    ///
    /// The first gap is measured from the start of the run.
    pub fn from_delays(delays: impl IntoIterator<Item = Duration>) -> Vec<Customer> {
        delays
            .into_iter()
            .scan(Duration::ZERO, |offset, delay| {
                *offset = offset.saturating_add(delay);
                Some(*offset)
            })
            .enumerate()
            .map(|(id, arrival_offset)| Customer { id, arrival_offset })
            .collect()
    }
}
