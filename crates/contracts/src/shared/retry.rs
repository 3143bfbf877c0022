//! Bounded retry with exponential backoff for backend calls
//!
//! The combinator is runtime-agnostic: the caller supplies the sleep future,
//! so the browser uses `gloo_timers` and tests use an instant fake.

use super::api_error::{ApiError, TRANSIENT_SIGNATURE};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Retry policy: `max_retries` retries after the first attempt,
/// delay before retry `n` (0-based) is `base_delay * 2^n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub transient_signature: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            transient_signature: TRANSIENT_SIGNATURE.to_string(),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(retry_count)
    }

    pub fn is_transient(&self, err: &ApiError) -> bool {
        err.is_transient(&self.transient_signature)
    }
}

/// Notification emitted before each backoff sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryNotice {
    /// 1-based number of the failed attempt
    pub attempt: u32,
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryNotice {
    pub fn message(&self) -> String {
        format!(
            "Database connection pool exhausted. Retrying in {} seconds... (Attempt {}/{})",
            self.delay.as_secs(),
            self.attempt,
            self.max_retries
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("Database connection pool exhausted. Please wait 2-3 minutes and try again. If the issue persists, contact the backend team. (Attempted {attempts} times)")]
    Exhausted { attempts: u32, last: ApiError },

    #[error("{0}")]
    Failed(ApiError),
}

impl RetryError {
    /// Текст для пользователя; `context` добавляется только к нетранзиентным ошибкам
    pub fn user_message(&self, context: &str) -> String {
        match self {
            RetryError::Exhausted { .. } => self.to_string(),
            RetryError::Failed(err) => format!("{}: {}", context, err),
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error,
/// or the retry budget is spent.
pub async fn retry_with_backoff<T, Op, OpFut, Sleep, SleepFut, Notify>(
    policy: &RetryPolicy,
    mut op: Op,
    mut sleep: Sleep,
    mut on_retry: Notify,
) -> Result<T, RetryError>
where
    Op: FnMut() -> OpFut,
    OpFut: Future<Output = Result<T, ApiError>>,
    Sleep: FnMut(Duration) -> SleepFut,
    SleepFut: Future<Output = ()>,
    Notify: FnMut(&RetryNotice),
{
    let mut retry_count = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if policy.is_transient(&err) => {
                if retry_count >= policy.max_retries {
                    return Err(RetryError::Exhausted {
                        attempts: retry_count + 1,
                        last: err,
                    });
                }
                let notice = RetryNotice {
                    attempt: retry_count + 1,
                    max_retries: policy.max_retries,
                    delay: policy.delay_for(retry_count),
                };
                on_retry(&notice);
                sleep(notice.delay).await;
                retry_count += 1;
            }
            Err(err) => return Err(RetryError::Failed(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn transient() -> ApiError {
        ApiError::backend("FATAL: remaining connection slots are reserved")
    }

    #[test]
    fn test_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_exhausts_after_three_retries() {
        let policy = RetryPolicy::default();
        let calls = RefCell::new(0u32);
        let sleeps = RefCell::new(Vec::new());
        let notices = RefCell::new(Vec::new());

        let result: Result<(), _> = retry_with_backoff(
            &policy,
            || {
                *calls.borrow_mut() += 1;
                async { Err(transient()) }
            },
            |d| {
                sleeps.borrow_mut().push(d);
                std::future::ready(())
            },
            |n| notices.borrow_mut().push(n.message()),
        )
        .await;

        assert_eq!(*calls.borrow(), 4);
        assert_eq!(
            *sleeps.borrow(),
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ]
        );
        assert_eq!(
            notices.borrow()[0],
            "Database connection pool exhausted. Retrying in 2 seconds... (Attempt 1/3)"
        );

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Exhausted { attempts: 4, .. }));
        assert!(err.to_string().contains("Attempted 4 times"));
        assert_eq!(err.user_message("Failed to load initial data"), err.to_string());
    }

    #[tokio::test]
    async fn test_non_transient_is_not_retried() {
        let policy = RetryPolicy::default();
        let calls = RefCell::new(0u32);

        let result: Result<(), _> = retry_with_backoff(
            &policy,
            || {
                *calls.borrow_mut() += 1;
                async { Err(ApiError::backend("cm_code is required")) }
            },
            |_| std::future::ready(()),
            |_| {},
        )
        .await;

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(
            result.unwrap_err().user_message("Backend filtering failed"),
            "Backend filtering failed: cm_code is required"
        );
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let policy = RetryPolicy::default();
        let calls = RefCell::new(0u32);

        let result = retry_with_backoff(
            &policy,
            || {
                let n = {
                    let mut c = calls.borrow_mut();
                    *c += 1;
                    *c
                };
                async move {
                    if n < 3 {
                        Err(transient())
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| std::future::ready(()),
            |_| {},
        )
        .await;

        assert_eq!(result, Ok(3));
    }
}
