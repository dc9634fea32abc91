//! Domain Layer
//!
//! This is the core of cdnplan - pure planning logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - DeploymentSpec, ResourceDecl, ResourcePlan, PolicyDocument, bindings
//! - `value_objects/` - Immutable value types (ResourceId, Fingerprint, OriginAccessModel)
//! - `services/` - TopologyPlanner, binders, dependency graph, plan differ
//! - `policies/` - PolicyEnforcer and the access audit
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or network directly
//! 2. **Pure Functions** - Planning the same spec twice yields the same plan
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod policies;
pub mod ports;
pub mod services;
pub mod value_objects;
