//! Domain Entities
//!
//! Everything the planner derives from a `DeploymentSpec`.

mod deployment_spec;
mod domain_binding;
mod edge_binding;
mod plan;
mod policy;
pub mod reference;
mod resource;

pub use deployment_spec::{
    AclConfig, AclRuleSpec, CacheSettings, CorsConfig, DeploymentSpec, DeploymentSpecBuilder,
    FeatureFlags, ProjectIdentity, RedirectConfig, SecondaryDnsConfig, TlsConfig,
};
pub use domain_binding::{AccessRestriction, AclRule, DomainBinding, RecordType, AUTOMATIC_TTL};
pub use edge_binding::{EdgeBinding, EdgeHandler, HookPoint};
pub use plan::{DeploymentOutputs, ResolvedOutputs, ResourcePlan};
pub use policy::{Condition, Effect, PolicyDocument, Principal, Statement};
pub use reference::{context_value, Reference, ResolveError, CALLER_IDENTITY};
pub use resource::{ResourceDecl, ResourceKind};
