//! Plan Executor
//!
//! Applies a `ResourcePlan` through a `ResourceProvider`.
//!
//! ## Structure
//!
//! - `options` - Concurrency and retry settings (`ExecutorOptions`)
//! - `cancel` - Shared cancellation flag (`CancellationToken`)
//! - `outcome` - Per-node outcomes and the aggregate report
//! - `walker` - The topological walk itself (`PlanExecutor`)
//!
//! ## Usage
//!
//! ```ignore
//! use cdnplan::application::executor::{CancellationToken, PlanExecutor};
//!
//! let executor = PlanExecutor::new(provider, state).with_events(sink);
//! let report = executor.execute(&plan, &CancellationToken::new())?;
//! ```

mod cancel;
mod options;
mod outcome;
mod walker;

pub use cancel::CancellationToken;
pub use options::{ExecutorOptions, DEFAULT_MAX_CONCURRENCY};
pub use outcome::{ExecutionReport, NodeOutcome, NodeOutputs};
pub use walker::PlanExecutor;

#[cfg(test)]
mod tests;
