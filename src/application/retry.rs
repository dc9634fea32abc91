//! Bounded exponential backoff for transient provider errors

use std::time::Duration;

use crate::error::ProviderError;

/// Retry schedule shared by node applies and object uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub factor: u32,
    pub cap: Duration,
    /// Total attempts including the first
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            factor: 2,
            cap: Duration::from_secs(5),
            max_attempts: 4,
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no waiting
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            base: Duration::ZERO,
            factor: 1,
            cap: Duration::ZERO,
            max_attempts,
        }
    }

    /// Delay before retrying after failed attempt `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let multiplier = self.factor.saturating_pow(exponent);
        self.base.saturating_mul(multiplier).min(self.cap)
    }

    /// Run `op` until it succeeds, fails permanently, or the budget runs out
    ///
    /// `on_retry` is called with the failed attempt number, the delay about to
    /// be slept, and the error.
    pub fn run<T, F, R>(&self, mut op: F, mut on_retry: R) -> Result<T, ProviderError>
    where
        F: FnMut(u32) -> Result<T, ProviderError>,
        R: FnMut(u32, Duration, &ProviderError),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    on_retry(attempt, delay, &err);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_up_to_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for(10), Duration::from_secs(5));
    }

    #[test]
    fn retries_transient_until_success() {
        let mut retries = Vec::new();
        let result = RetryPolicy::immediate(4).run(
            |attempt| {
                if attempt < 3 {
                    Err(ProviderError::Transient("throttled".into()))
                } else {
                    Ok(attempt)
                }
            },
            |attempt, _, _| retries.push(attempt),
        );
        assert_eq!(result, Ok(3));
        assert_eq!(retries, vec![1, 2]);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::immediate(4).run(
            |_| {
                calls += 1;
                Err(ProviderError::Permanent("denied".into()))
            },
            |_, _, _| {},
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn budget_is_bounded() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::immediate(3).run(
            |_| {
                calls += 1;
                Err(ProviderError::Transient("timeout".into()))
            },
            |_, _, _| {},
        );
        assert_eq!(result, Err(ProviderError::Transient("timeout".into())));
        assert_eq!(calls, 3);
    }
}
