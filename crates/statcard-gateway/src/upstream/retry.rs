//! Bounded retry with linear backoff.
//!
//! Wraps one upstream operation in [`seatbelt`] retry and timeout layers. The
//! operation reports a flaky answer (bad status, unreadable or zero payload)
//! as an `Err`, and [`classify`] decides whether that is worth another try.

use std::future::Future;
use std::time::Duration;

use layered::{Execute, Service, Stack};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

use statcard_core::error::{Result, StatCardError};

use crate::config::RetrySection;

const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Never less than 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound for a single attempt.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Sleep before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    fn max_retries(&self) -> u32 {
        self.max_attempts.saturating_sub(1)
    }
}

impl From<&RetrySection> for RetryPolicy {
    fn from(s: &RetrySection) -> Self {
        Self::new(s.max_attempts, Duration::from_millis(s.base_delay_ms))
    }
}

/// Classify an attempt for retry purposes.
///
/// Every upstream failure is transient here, including a malformed or zero
/// star payload. Configuration faults are not.
fn classify<T>(result: &Result<T>) -> RecoveryInfo {
    match result {
        Ok(_) => RecoveryInfo::never(),
        Err(StatCardError::Config(_) | StatCardError::BadRequest(_)) => RecoveryInfo::never(),
        Err(_) => RecoveryInfo::retry(),
    }
}

/// Run `op(input)` until it succeeds or the policy is exhausted.
/// Returns the last error on exhaustion.
///
/// `label` names the operation in logs.
pub async fn retry<In, Out, Fut, F>(
    policy: &RetryPolicy,
    label: &'static str,
    input: In,
    op: F,
) -> Result<Out>
where
    In: Clone + Send + Sync + 'static,
    Out: Send + 'static,
    Fut: Future<Output = Result<Out>> + Send,
    F: Fn(In) -> Fut + Send + Sync + Clone + 'static,
{
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name(label);

    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &Result<Out>, _| classify(result))
            .max_retry_attempts(policy.max_retries())
            .base_delay(policy.base_delay)
            .backoff(Backoff::Linear)
            .use_jitter(false)
            .on_retry(move |output: &Result<Out>, args| {
                let error = output.as_ref().err().map(ToString::to_string);
                tracing::debug!(
                    label,
                    attempt = args.attempt().index() + 1,
                    delay_ms = args.retry_delay().as_millis() as u64,
                    error = error.as_deref().unwrap_or(""),
                    "retrying"
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(move |_| StatCardError::Upstream(format!("{label}: attempt timed out")))
            .timeout(policy.attempt_timeout),
        Execute::new(move |input: In| {
            let f = op.clone();
            async move { f(input).await }
        }),
    )
        .into_service();

    service.execute(input).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_linear() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = tokio::time::Instant::now();

        let out: Result<u32> = retry(&policy(), "test", calls.clone(), |calls: Arc<AtomicU32>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StatCardError::Upstream("down".into()))
        })
        .await;

        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first attempt, 2s after the second, none after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3_100));
        assert_eq!(policy().delay_after(2), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let out = retry(&policy(), "test", calls.clone(), |calls: Arc<AtomicU32>| async move {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt < 2 {
                Err(StatCardError::Upstream("flaky".into()))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(out.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn config_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let out: Result<()> = retry(&policy(), "test", calls.clone(), |calls: Arc<AtomicU32>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StatCardError::Config("bad source".into()))
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_policy_never_sleeps() {
        let started = tokio::time::Instant::now();
        let out: Result<()> = retry(&RetryPolicy::new(1, Duration::from_secs(5)), "test", (), |()| async {
            Err(StatCardError::Upstream("down".into()))
        })
        .await;
        assert!(out.is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
