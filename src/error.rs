//! Error types for cdnplan
//!
//! Planning errors are fatal and surface before any resource is touched.
//! Execution errors are collected per node and never escape as `Err`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for planning operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors raised while turning a `DeploymentSpec` into a `ResourcePlan`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Malformed or missing required configuration
    #[error("invalid deployment spec: {field}: {reason}")]
    SpecInvalid { field: String, reason: String },

    /// A derived policy would grant more than the origin access model allows
    #[error("policy violation in statement '{sid}': {reason}")]
    PolicyViolation { sid: String, reason: String },

    /// The dependency graph is not acyclic
    #[error("dependency cycle detected at node '{node}'")]
    GraphCycle { node: String },

    /// A node depends on an id that is not part of the plan
    #[error("node '{node}' depends on unknown node '{dependency}'")]
    UnknownDependency { node: String, dependency: String },

    /// A node references another node in its attributes without depending on it
    #[error("node '{node}' references '{reference}' without declaring a dependency")]
    UndeclaredReference { node: String, reference: String },

    /// Two nodes share the same id
    #[error("duplicate node id '{node}'")]
    DuplicateNode { node: String },

    /// Two edge functions were bound to the same hook point
    #[error("more than one edge function bound at '{hook}'")]
    DuplicateHookPoint { hook: String },
}

impl PlanError {
    pub fn spec_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpecInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn policy_violation(sid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PolicyViolation {
            sid: sid.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error in the deployment error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SpecInvalid { .. } | Self::DuplicateHookPoint { .. } => ErrorKind::SpecInvalid,
            Self::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            // Everything below is a planner defect, not a user input error.
            Self::GraphCycle { .. }
            | Self::UnknownDependency { .. }
            | Self::UndeclaredReference { .. }
            | Self::DuplicateNode { .. } => ErrorKind::GraphCycle,
        }
    }
}

/// Errors reported by a resource provider, object store or invalidator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Rate limiting, throttling, transient network failure
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Permission denied, quota exceeded, invalid request
    #[error("provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transient(_) => ErrorKind::ProviderTransient,
            Self::Permanent(_) => ErrorKind::ProviderPermanent,
        }
    }
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// The deployment error taxonomy used in outcome reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SpecInvalid,
    PolicyViolation,
    GraphCycle,
    ProviderTransient,
    ProviderPermanent,
    InvalidationFailed,
}

impl ErrorKind {
    /// Whether the error aborts the whole deployment rather than one subtree
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SpecInvalid | Self::PolicyViolation | Self::GraphCycle
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpecInvalid => "spec_invalid",
            Self::PolicyViolation => "policy_violation",
            Self::GraphCycle => "graph_cycle",
            Self::ProviderTransient => "provider_transient",
            Self::ProviderPermanent => "provider_permanent",
            Self::InvalidationFailed => "invalidation_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_spec_invalid() {
        let err = PlanError::spec_invalid("domains", "at least one domain is required");
        assert_eq!(
            err.to_string(),
            "invalid deployment spec: domains: at least one domain is required"
        );
    }

    #[test]
    fn test_error_display_graph_cycle() {
        let err = PlanError::GraphCycle {
            node: "bucket-policy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle detected at node 'bucket-policy'"
        );
    }

    #[test]
    fn plan_errors_map_to_taxonomy() {
        assert_eq!(
            PlanError::spec_invalid("x", "y").kind(),
            ErrorKind::SpecInvalid
        );
        assert_eq!(
            PlanError::policy_violation("1", "too broad").kind(),
            ErrorKind::PolicyViolation
        );
        assert_eq!(
            PlanError::UndeclaredReference {
                node: "a".into(),
                reference: "b".into()
            }
            .kind(),
            ErrorKind::GraphCycle
        );
    }

    #[test]
    fn provider_error_kinds() {
        assert!(ProviderError::Transient("throttled".into()).is_transient());
        assert_eq!(
            ProviderError::Permanent("denied".into()).kind(),
            ErrorKind::ProviderPermanent
        );
    }

    #[test]
    fn invalidation_failure_is_not_fatal() {
        assert!(!ErrorKind::InvalidationFailed.is_fatal());
        assert!(!ErrorKind::ProviderPermanent.is_fatal());
        assert!(ErrorKind::PolicyViolation.is_fatal());
    }
}
