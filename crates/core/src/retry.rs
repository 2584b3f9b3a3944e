//! Bounded retry with explicit outcomes.
//!
//! The client is queried with at most one retry, triggered only by an
//! authorization failure on the first attempt; credentials are
//! re-established in between. Callers branch on [`RetryOutcome`] instead
//! of loop sentinels.

use std::future::Future;

use tracing::warn;

/// Result of a bounded-retry operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded on the first attempt or the retry.
    Succeeded(T),
    /// Both attempts failed (or recovery itself failed); carries the
    /// last error observed.
    Exhausted { last_error: E },
}

impl<T, E> RetryOutcome<T, E> {
    /// Convert into a plain `Result`, surfacing the last error.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryOutcome::Succeeded(value) => Ok(value),
            RetryOutcome::Exhausted { last_error } => Err(last_error),
        }
    }
}

/// Run `op`; when it fails with an error `is_recoverable` accepts, run
/// `recover` once and retry `op` a single time.
pub async fn retry_once<T, E, F, Fut, P, R, RFut>(
    mut op: F,
    is_recoverable: P,
    recover: R,
) -> RetryOutcome<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    R: FnOnce() -> RFut,
    RFut: Future<Output = Result<(), E>>,
{
    let first_error = match op().await {
        Ok(value) => return RetryOutcome::Succeeded(value),
        Err(e) if is_recoverable(&e) => e,
        Err(e) => return RetryOutcome::Exhausted { last_error: e },
    };

    warn!("Recoverable failure ({}), retrying once", first_error);
    if let Err(e) = recover().await {
        return RetryOutcome::Exhausted { last_error: e };
    }

    match op().await {
        Ok(value) => RetryOutcome::Succeeded(value),
        Err(e) => RetryOutcome::Exhausted { last_error: e },
    }
}
