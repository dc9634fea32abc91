//! StateStore port - persisted mapping from node id to provider resource
//!
//! The store is what makes re-apply idempotent: a node whose fingerprint
//! matches its stored entry is not sent to the provider again.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::domain::value_objects::{Fingerprint, ResourceId};

pub type StateResult<T> = Result<T, StateError>;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid state file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("state file version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("could not lock state: {0}")]
    Lock(String),
}

/// What was applied for one node
#[derive(Debug, Clone, PartialEq)]
pub struct StateEntry {
    pub provider_id: String,
    pub fingerprint: Fingerprint,
    pub outputs: BTreeMap<String, String>,
    /// Attributes as planned, kept for change diffs
    pub attributes: Option<Value>,
    /// RFC 3339 timestamp of the last apply
    pub applied_at: Option<String>,
}

impl StateEntry {
    pub fn new(provider_id: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            provider_id: provider_id.into(),
            fingerprint,
            outputs: BTreeMap::new(),
            attributes: None,
            applied_at: None,
        }
    }
}

/// Object key to content hash, for skipping unchanged uploads
pub type ContentManifest = BTreeMap<String, String>;

pub trait StateStore: Send + Sync {
    fn get(&self, id: &ResourceId) -> StateResult<Option<StateEntry>>;

    fn put(&self, id: &ResourceId, entry: StateEntry) -> StateResult<()>;

    fn entries(&self) -> StateResult<BTreeMap<ResourceId, StateEntry>>;

    fn content_manifest(&self) -> StateResult<ContentManifest>;

    fn put_content_manifest(&self, manifest: ContentManifest) -> StateResult<()>;
}
