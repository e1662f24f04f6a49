//! Retry loops driven by a [`Backoff`] schedule

use super::Backoff;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of a single attempt inside [`retry_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Stop retrying and return the value
    Done(T),
    /// Sleep for the next backoff step and try again
    Retry,
}

/// Run `op` until it returns [`Attempt::Done`] or an error.
///
/// There is no attempt limit. The token is checked before every attempt and
/// raced against both the attempt and the sleep that follows it.
pub async fn retry_until<T, F, Fut>(
    cancel: &CancellationToken,
    mut backoff: Backoff,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let attempt = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            result = op() => result?,
        };

        match attempt {
            Attempt::Done(value) => return Ok(value),
            Attempt::Retry => {
                let delay = backoff.step();
                debug!(?delay, "retrying");
                sleep_or_cancel(cancel, delay).await?;
            }
        }
    }
}

/// Run `op`, retrying every error `is_transient` accepts.
///
/// Errors the predicate rejects are returned as they are.
pub async fn retry_on_transient<T, F, Fut, P>(
    cancel: &CancellationToken,
    backoff: Backoff,
    is_transient: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    let is_transient = &is_transient;
    retry_until(cancel, backoff, move || {
        let attempt = op();
        async move {
            match attempt.await {
                Ok(value) => Ok(Attempt::Done(value)),
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "transient failure, will retry");
                    Ok(Attempt::Retry)
                }
                Err(e) => Err(e),
            }
        }
    })
    .await
}

async fn sleep_or_cancel(cancel: &CancellationToken, delay: Duration) -> Result<()> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        () = tokio::time::sleep(delay) => Ok(()),
    }
}
