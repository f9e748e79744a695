//! Completion of two-document writes without a transaction.
//!
//! The caller performs the first write itself. [`DualWrite::complete`] then
//! drives the second write: it retries a bounded number of times, undoes the
//! first write if configured to, and otherwise reports
//! [`AppError::PartialWrite`]. It never reports success for a half-applied
//! operation.

use std::future::Future;
use std::time::Duration;

use murmur_common::{AppError, AppResult, config::ConsistencyConfig};

/// Retry and compensation policy for the second write.
#[derive(Debug, Clone)]
pub struct DualWrite {
    attempts: u32,
    retry_delay: Duration,
    compensate: bool,
}

impl Default for DualWrite {
    fn default() -> Self {
        Self::from_config(&ConsistencyConfig::default())
    }
}

impl DualWrite {
    /// Create a policy. `attempts` below one are treated as one.
    #[must_use]
    pub fn new(attempts: u32, retry_delay: Duration, compensate: bool) -> Self {
        Self {
            attempts: attempts.max(1),
            retry_delay,
            compensate,
        }
    }

    /// Create a policy from the `consistency` configuration section.
    #[must_use]
    pub fn from_config(config: &ConsistencyConfig) -> Self {
        Self::new(
            config.secondary_write_attempts,
            config.retry_delay(),
            config.compensate,
        )
    }

    /// Number of times the second write is attempted.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run the second write of `step`.
    ///
    /// The delay before attempt `n + 1` is `n * retry_delay`. When every
    /// attempt fails, `compensation` runs once (if enabled) and the result is
    /// `AppError::PartialWrite`.
    pub async fn complete<W, WF, C, CF>(
        &self,
        step: &str,
        mut write: W,
        compensation: C,
    ) -> AppResult<()>
    where
        W: FnMut() -> WF,
        WF: Future<Output = AppResult<()>>,
        C: FnOnce() -> CF,
        CF: Future<Output = AppResult<()>>,
    {
        let mut reason = String::new();

        for attempt in 1..=self.attempts {
            match write().await {
                Ok(()) => {
                    if attempt > 1 {
                        tracing::debug!(step, attempt, "Secondary write succeeded after retry");
                    }
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(step, attempt, error = %e, "Secondary write failed");
                    reason = e.to_string();
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        let compensated = if self.compensate {
            match compensation().await {
                Ok(()) => {
                    tracing::warn!(step, "Rolled back first write");
                    true
                }
                Err(e) => {
                    tracing::error!(step, error = %e, "Compensating write failed");
                    false
                }
            }
        } else {
            false
        };

        Err(AppError::PartialWrite {
            step: step.to_string(),
            reason,
            compensated,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fail() -> AppError {
        AppError::Database("connection reset".to_string())
    }

    #[tokio::test]
    async fn test_first_attempt_success_skips_compensation() {
        let policy = DualWrite::new(3, Duration::ZERO, true);
        let compensations = &AtomicU32::new(0);

        policy
            .complete(
                "follow",
                || async { Ok(()) },
                move || async move {
                    compensations.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            )
            .await
            .unwrap();

        assert_eq!(compensations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let policy = DualWrite::new(3, Duration::ZERO, true);
        let calls = &AtomicU32::new(0);

        policy
            .complete(
                "follow",
                move || async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(fail())
                    } else {
                        Ok(())
                    }
                },
                || async { Ok(()) },
            )
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_compensate() {
        let policy = DualWrite::new(2, Duration::ZERO, true);
        let calls = &AtomicU32::new(0);
        let compensations = &AtomicU32::new(0);

        let result = policy
            .complete(
                "comment",
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(fail())
                },
                move || async move {
                    compensations.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(compensations.load(Ordering::SeqCst), 1);
        match result {
            Err(AppError::PartialWrite {
                step,
                reason,
                compensated,
            }) => {
                assert_eq!(step, "comment");
                assert!(reason.contains("connection reset"));
                assert!(compensated);
            }
            other => panic!("expected PartialWrite, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compensation_disabled() {
        let policy = DualWrite::new(1, Duration::ZERO, false);
        let compensations = &AtomicU32::new(0);

        let result = policy
            .complete(
                "unfollow",
                || async { Err(fail()) },
                move || async move {
                    compensations.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            )
            .await;

        assert_eq!(compensations.load(Ordering::SeqCst), 0);
        assert!(matches!(
            result,
            Err(AppError::PartialWrite {
                compensated: false,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_compensation_is_reported() {
        let policy = DualWrite::new(1, Duration::ZERO, true);

        let result = policy
            .complete("follow", || async { Err(fail()) }, || async { Err(fail()) })
            .await;

        assert!(matches!(
            result,
            Err(AppError::PartialWrite {
                compensated: false,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(DualWrite::new(0, Duration::ZERO, true).attempts(), 1);
        assert_eq!(DualWrite::default().attempts(), 3);
    }
}
