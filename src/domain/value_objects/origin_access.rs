//! Origin Access Model Value Object
//!
//! The closed set of ways the edge network can reach the storage origin.
//! Every structural difference between deployment shapes is a match on this
//! type inside the planner and the policy enforcer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the edge network signs its requests to a private origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SigningIdentityKind {
    /// Current mechanism: SigV4-signed origin access control
    #[default]
    AccessControl,
    /// Legacy origin access identity
    LegacyIdentity,
}

impl SigningIdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessControl => "access-control",
            Self::LegacyIdentity => "legacy-identity",
        }
    }
}

/// How the origin bucket is exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "model", content = "signing", rename_all = "kebab-case")]
pub enum OriginAccessModel {
    /// Bucket serves its website endpoint directly over plain HTTP
    PublicWebsite,
    /// Bucket is private; only the signing identity may read it
    PrivateSigned(SigningIdentityKind),
}

impl OriginAccessModel {
    pub fn is_private(&self) -> bool {
        matches!(self, Self::PrivateSigned(_))
    }

    pub fn signing_identity(&self) -> Option<SigningIdentityKind> {
        match self {
            Self::PublicWebsite => None,
            Self::PrivateSigned(kind) => Some(*kind),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicWebsite => "public-website",
            Self::PrivateSigned(_) => "private-signed",
        }
    }
}

impl fmt::Display for OriginAccessModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicWebsite => f.write_str(self.as_str()),
            Self::PrivateSigned(kind) => write!(f, "{} ({})", self.as_str(), kind.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_model_exposes_signing_identity() {
        let model = OriginAccessModel::PrivateSigned(SigningIdentityKind::LegacyIdentity);
        assert!(model.is_private());
        assert_eq!(
            model.signing_identity(),
            Some(SigningIdentityKind::LegacyIdentity)
        );
        assert_eq!(OriginAccessModel::PublicWebsite.signing_identity(), None);
    }

    #[test]
    fn display_includes_signing_kind() {
        let model = OriginAccessModel::PrivateSigned(SigningIdentityKind::AccessControl);
        assert_eq!(model.to_string(), "private-signed (access-control)");
    }
}
