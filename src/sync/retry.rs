//! Bounded retry for read-only requests.

use std::thread;

use tracing::warn;

use super::server::TransportError;
use super::session::SyncError;
use crate::config::RetryPolicy;

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// policy's retry ceiling is hit, sleeping `policy.delay(n)` before retry `n`.
///
/// Only for reads: a mutation must never go through here.
pub fn with_retry<T, F>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, SyncError>
where
    F: FnMut() -> Result<T, TransportError>,
{
    let mut retry = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && retry < policy.max_retries => {
                let delay = policy.delay(retry);
                warn!(
                    request = what,
                    retry,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "read failed, retrying"
                );
                thread::sleep(delay);
                retry += 1;
            }
            Err(source) => {
                return Err(SyncError::Transport {
                    attempts: retry + 1,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_transient_failures_until_success() {
        let mut calls = 0;
        let result = with_retry(&RetryPolicy::immediate(5), "fetch", || {
            calls += 1;
            if calls < 3 {
                Err(TransportError::Transient("reset".into()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn gives_up_after_ceiling() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(2), "fetch", || {
            calls += 1;
            Err(TransportError::Transient("timeout".into()))
        });
        assert_eq!(calls, 3);
        assert_eq!(
            result,
            Err(SyncError::Transport {
                attempts: 3,
                source: TransportError::Transient("timeout".into())
            })
        );
    }

    #[test]
    fn protocol_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&RetryPolicy::immediate(5), "fetch", || {
            calls += 1;
            Err(TransportError::Protocol("garbage".into()))
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(SyncError::Transport { attempts: 1, .. })));
    }
}
