//! Redirect Table Value Object
//!
//! Ordered prefix rules consumed by the viewer-request edge function.

use serde::{Deserialize, Serialize};

/// A single prefix rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedirectRule {
    /// Path prefix to match
    pub src: String,
    /// Replacement path
    pub dst: String,
}

impl RedirectRule {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

/// Ordered list of redirect rules; first match wins
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedirectTable(Vec<RedirectRule>);

impl RedirectTable {
    pub fn new(rules: Vec<RedirectRule>) -> Self {
        Self(rules)
    }

    pub fn rules(&self) -> &[RedirectRule] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First rule whose `src` prefixes `path`
    pub fn first_match(&self, path: &str) -> Option<&RedirectRule> {
        self.0.iter().find(|rule| path.starts_with(rule.src.as_str()))
    }
}

impl FromIterator<RedirectRule> for RedirectTable {
    fn from_iter<I: IntoIterator<Item = RedirectRule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
