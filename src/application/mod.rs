//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Plan, apply, sync content, invalidate
//! - `CheckUseCase` - Plan and audit without touching a provider
//! - `PlanExecutor` - Apply a plan through a `ResourceProvider`
//! - `ContentSync` - Upload changed content objects
//! - `InvalidationTrigger` - Invalidate the edge cache after a deploy

pub mod check;
pub mod content_sync;
pub mod deploy;
pub mod executor;
pub mod invalidation;
pub mod retry;

pub use check::{CheckItem, CheckResult, CheckStatus, CheckUseCase};
pub use content_sync::{content_type, ContentSync, SyncError, SyncOptions, SyncReport};
pub use deploy::{ContentOutcome, DeployError, DeployOptions, DeployResult, DeployUseCase};
pub use executor::{
    CancellationToken, ExecutionReport, ExecutorOptions, NodeOutcome, NodeOutputs, PlanExecutor,
};
pub use invalidation::{InvalidationOutcome, InvalidationTrigger, INVALIDATION_PATH};
pub use retry::RetryPolicy;
