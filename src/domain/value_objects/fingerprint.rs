//! Fingerprint Value Object
//!
//! SHA-256 digest over canonical JSON. Two nodes with equal fingerprints are
//! structurally identical, which is what makes re-apply idempotent.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Content fingerprint with a `sha256:` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub const PREFIX: &'static str = "sha256:";

    /// Fingerprint raw bytes
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(format!("{}{:x}", Self::PREFIX, digest))
    }

    /// Fingerprint a JSON value
    ///
    /// `serde_json` objects are backed by a sorted map, so the serialized
    /// form is canonical without extra work.
    pub fn of_json(value: &Value) -> Self {
        Self::of_bytes(value.to_string().as_bytes())
    }

    /// Wrap an already-computed fingerprint string (with or without prefix)
    pub fn from_raw(raw: &str) -> Self {
        if raw.starts_with(Self::PREFIX) {
            Self(raw.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex digest without the prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// First `len` hex characters, for naming
    pub fn short(&self, len: usize) -> &str {
        let hex = self.hex();
        &hex[..len.min(hex.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
