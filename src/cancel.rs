//! Cooperative cancellation for fetch runs
//!
//! Each run owns one [`CancellationToken`]. The fetcher observes it before every
//! request and while waiting out the inter-request delay, so a superseded run
//! stops at the next suspension point instead of finishing its sequence.

use std::future::Future;
use std::time::Duration;

pub use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// How a [`cancellable_sleep`] ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration passed
    Elapsed,
    /// The token fired first
    Cancelled,
}

/// Sleep for `duration` unless `token` is cancelled first
///
/// Returns immediately with [`SleepOutcome::Cancelled`] if the token is
/// already cancelled.
pub async fn cancellable_sleep(duration: Duration, token: &CancellationToken) -> SleepOutcome {
    if token.is_cancelled() {
        return SleepOutcome::Cancelled;
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => SleepOutcome::Cancelled,
        _ = tokio::time::sleep(duration) => SleepOutcome::Elapsed,
    }
}

/// Fail with [`Error::Cancelled`] if `token` has fired
pub fn ensure_active(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Drive `operation` to completion unless `token` fires first
///
/// A cancelled operation is dropped, so any response it was waiting on is
/// ignored.
pub async fn run_until_cancelled<F, T>(token: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = operation => result,
    }
}
