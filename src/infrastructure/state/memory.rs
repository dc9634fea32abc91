//! In-memory state store
//!
//! Used by `simulate` when no state file is given, and by tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::ports::{ContentManifest, StateEntry, StateError, StateResult, StateStore};
use crate::domain::value_objects::ResourceId;

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<ResourceId, StateEntry>,
    manifest: ContentManifest,
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    inner: Mutex<Inner>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StateResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StateError::Lock("state mutex poisoned".to_string()))
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, id: &ResourceId) -> StateResult<Option<StateEntry>> {
        Ok(self.lock()?.entries.get(id).cloned())
    }

    fn put(&self, id: &ResourceId, entry: StateEntry) -> StateResult<()> {
        self.lock()?.entries.insert(id.clone(), entry);
        Ok(())
    }

    fn entries(&self) -> StateResult<BTreeMap<ResourceId, StateEntry>> {
        Ok(self.lock()?.entries.clone())
    }

    fn content_manifest(&self) -> StateResult<ContentManifest> {
        Ok(self.lock()?.manifest.clone())
    }

    fn put_content_manifest(&self, manifest: ContentManifest) -> StateResult<()> {
        self.lock()?.manifest = manifest;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Fingerprint;

    #[test]
    fn stores_entries_and_manifest() {
        let store = MemoryStateStore::new();
        let id = ResourceId::new("bucket");
        store
            .put(&id, StateEntry::new("site-dev-1a2b3c4d", Fingerprint::of_bytes(b"x")))
            .unwrap();
        store
            .put_content_manifest(ContentManifest::from([("index.html".into(), "abc".into())]))
            .unwrap();

        assert_eq!(store.get(&id).unwrap().unwrap().provider_id, "site-dev-1a2b3c4d");
        assert!(store.get(&ResourceId::new("distribution")).unwrap().is_none());
        assert_eq!(store.content_manifest().unwrap().len(), 1);
    }
}
