//! Executor Options

use crate::application::retry::RetryPolicy;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Options for the plan executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Upper bound on nodes in flight at once; never below 1
    pub max_concurrency: usize,
    /// Backoff applied to transient provider errors, per node
    pub retry: RetryPolicy,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

impl ExecutorOptions {
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
