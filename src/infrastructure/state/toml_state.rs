//! TOML State Store
//!
//! Persists applied nodes and the content manifest in one versioned TOML
//! file (`cdnplan.state` by default). Writers take an exclusive `fs2` lock on
//! a sibling `.lock` file and replace the state file atomically, so readers
//! never see a half-written file.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::ports::{ContentManifest, StateEntry, StateError, StateResult, StateStore};
use crate::domain::value_objects::{Fingerprint, ResourceId};

pub const STATE_VERSION: u32 = 1;
pub const DEFAULT_STATE_FILE: &str = "cdnplan.state";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlResource {
    provider_id: String,
    fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    applied_at: Option<String>,
    /// Planned attributes as a JSON string; TOML has no null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<String>,
    #[serde(default)]
    outputs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TomlState {
    version: u32,
    #[serde(default)]
    resources: BTreeMap<String, TomlResource>,
    #[serde(default)]
    content: BTreeMap<String, String>,
}

impl Default for TomlState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            resources: BTreeMap::new(),
            content: BTreeMap::new(),
        }
    }
}

pub struct TomlStateStore {
    path: PathBuf,
    // Serializes writers inside this process; the file lock covers others.
    write_guard: Mutex<()>,
}

impl TomlStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> StateResult<TomlState> {
        if !self.path.exists() {
            return Ok(TomlState::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let state: TomlState = toml::from_str(&content).map_err(|e| StateError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        if state.version != STATE_VERSION {
            return Err(StateError::VersionMismatch {
                found: state.version,
                expected: STATE_VERSION,
            });
        }
        Ok(state)
    }

    fn save(&self, state: &TomlState) -> StateResult<()> {
        let content = toml::to_string_pretty(state).map_err(|e| StateError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    /// Load, modify, and save under both the process and the file lock
    fn update<F>(&self, modify: F) -> StateResult<()>
    where
        F: FnOnce(&mut TomlState),
    {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| StateError::Lock("state writer poisoned".to_string()))?;

        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let lock_file = fs::File::create(&lock_path).map_err(|e| self.io_error(e))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StateError::Lock(format!("{}: {}", lock_path.display(), e)))?;

        let result = self.load().and_then(|mut state| {
            modify(&mut state);
            self.save(&state)
        });

        let _ = lock_file.unlock();
        result
    }
}

fn to_entry(resource: TomlResource) -> StateEntry {
    StateEntry {
        provider_id: resource.provider_id,
        fingerprint: Fingerprint::from_raw(&resource.fingerprint),
        outputs: resource.outputs,
        attributes: resource
            .attributes
            .and_then(|raw| serde_json::from_str(&raw).ok()),
        applied_at: resource.applied_at,
    }
}

fn from_entry(entry: StateEntry) -> TomlResource {
    TomlResource {
        provider_id: entry.provider_id,
        fingerprint: entry.fingerprint.as_str().to_string(),
        applied_at: entry.applied_at,
        attributes: entry.attributes.map(|value| value.to_string()),
        outputs: entry.outputs,
    }
}

impl StateStore for TomlStateStore {
    fn get(&self, id: &ResourceId) -> StateResult<Option<StateEntry>> {
        Ok(self.load()?.resources.remove(id.as_str()).map(to_entry))
    }

    fn put(&self, id: &ResourceId, entry: StateEntry) -> StateResult<()> {
        self.update(|state| {
            state.resources.insert(id.to_string(), from_entry(entry));
        })
    }

    fn entries(&self) -> StateResult<BTreeMap<ResourceId, StateEntry>> {
        Ok(self
            .load()?
            .resources
            .into_iter()
            .map(|(id, resource)| (ResourceId::new(id), to_entry(resource)))
            .collect())
    }

    fn content_manifest(&self) -> StateResult<ContentManifest> {
        Ok(self.load()?.content)
    }

    fn put_content_manifest(&self, manifest: ContentManifest) -> StateResult<()> {
        self.update(|state| state.content = manifest)
    }
}
