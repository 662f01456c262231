//! Splitting a requested total into source-sized requests.

use crate::error::{Error, Result};

/// Ordered batch sizes for one run
///
/// Every batch is `max_per_request` except the last, which carries the
/// remainder when the total is not a multiple of it. The sizes always sum to
/// the requested total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestPlan {
    total_amount: u32,
    max_per_request: u32,
}

impl RequestPlan {
    /// Plan `total_amount` records in requests of at most `max_per_request`
    ///
    /// Sizes are computed on demand, so planning costs the same for any total.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when either argument is zero.
    pub fn new(total_amount: u32, max_per_request: u32) -> Result<Self> {
        if total_amount == 0 {
            return Err(Error::Config {
                message: "total amount must be a positive integer".to_string(),
                key: Some("total_amount".to_string()),
            });
        }
        if max_per_request == 0 {
            return Err(Error::Config {
                message: "max_per_request must be at least 1".to_string(),
                key: Some("batching.max_per_request".to_string()),
            });
        }

        Ok(Self {
            total_amount,
            max_per_request,
        })
    }

    /// Size of the batch at `index`, or `None` past the end of the plan
    pub fn batch_size(&self, index: usize) -> Option<u32> {
        if index >= self.len() {
            return None;
        }
        let sent = index as u64 * u64::from(self.max_per_request);
        let left = u64::from(self.total_amount) - sent;
        Some(left.min(u64::from(self.max_per_request)) as u32)
    }

    /// Batch sizes in request order
    pub fn batches(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(move |index| self.batch_size(index))
    }

    /// Number of requests
    pub fn len(&self) -> usize {
        self.total_amount.div_ceil(self.max_per_request) as usize
    }

    /// A plan is never empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all batch sizes
    pub fn total(&self) -> u32 {
        self.total_amount
    }

    /// True if `index` is the final request
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.len()
    }
}
