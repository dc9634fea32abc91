//! cdnplan - planner and executor for secure static-site CDN deployments
//!
//! cdnplan turns a declarative deployment spec into an ordered graph of
//! cloud resources (origin bucket, access identity, distribution, DNS
//! records, edge functions, access policy), applies that graph
//! concurrently in dependency order, syncs the site content and
//! invalidates the edge cache.

pub mod application;
pub mod config;
pub mod domain;
pub mod edge;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{CheckUseCase, DeployOptions, DeployResult, DeployUseCase};
pub use config::{Config, LoadedConfig};
pub use domain::entities::{DeploymentSpec, ResourcePlan};
pub use domain::services::TopologyPlanner;
pub use domain::value_objects::{Environment, OriginAccessModel};
pub use error::{ConfigError, ErrorKind, PlanError, PlanResult, ProviderError};
