use std::{fmt::Display, future::Future};

use tracing::warn;

/// The last error seen once every allowed attempt has failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Runs `op` until it succeeds or `max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. A maximum of zero still makes
/// one attempt.
pub async fn retry_bounded<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(last) if attempt >= max_attempts => {
                warn!(attempt, max_attempts, error = %last, "giving up");
                return Err(RetryExhausted {
                    attempts: attempt,
                    last,
                });
            }
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "attempt failed, retrying");
                attempt += 1;
            }
        }
    }
}
