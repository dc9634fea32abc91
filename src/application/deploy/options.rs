//! Deploy Options

use crate::application::content_sync::SyncOptions;
use crate::application::executor::ExecutorOptions;

/// Options for the deploy use case
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    pub executor: ExecutorOptions,
    pub sync: SyncOptions,
    /// Apply infrastructure only; leave bucket contents alone
    pub skip_content: bool,
}

impl DeployOptions {
    pub fn with_executor(mut self, executor: ExecutorOptions) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_sync(mut self, sync: SyncOptions) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_skip_content(mut self, skip: bool) -> Self {
        self.skip_content = skip;
        self
    }
}
