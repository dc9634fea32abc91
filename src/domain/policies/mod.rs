//! Domain Policies
//!
//! Access rules that govern the origin bucket.
//! These are pure functions that operate on domain entities.

mod access_audit;
mod bucket_policy;

pub use access_audit::{check_access_block, AccessAudit};
pub use bucket_policy::{
    PolicyEnforcer, PublicAccessBlock, DEPLOYER_ACTIONS, EDGE_READ_ACTIONS, EDGE_SERVICE,
    SID_DEPLOYER, SID_EDGE_READ, SID_TRANSPORT,
};
