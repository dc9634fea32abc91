//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod aggregate_status;
mod environment;
mod fingerprint;
mod origin_access;
mod redirect;
mod resource_id;

pub use aggregate_status::AggregateStatus;
pub use environment::Environment;
pub use fingerprint::Fingerprint;
pub use origin_access::{OriginAccessModel, SigningIdentityKind};
pub use redirect::{RedirectRule, RedirectTable};
pub use resource_id::ResourceId;
