//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::Path;
use std::sync::Arc;

use crate::application::{CheckUseCase, DeployUseCase};
use crate::domain::ports::{DeployEventSink, StateStore};
use crate::infrastructure::{
    JsonEventSink, LocalContentSource, MemoryStateStore, SimulatedCloud, TomlStateStore,
    TracingEventSink,
};

/// A deploy use case running entirely against the simulated cloud
///
/// The simulated cloud plays provider, object store and invalidator; content
/// is read from `content_dir`.
pub fn create_simulated_deploy(
    cloud: Arc<SimulatedCloud>,
    state: Arc<dyn StateStore>,
    content_dir: &Path,
    events: Arc<dyn DeployEventSink>,
) -> DeployUseCase {
    DeployUseCase::new(
        cloud.clone(),
        state,
        Arc::new(LocalContentSource::new(content_dir)),
        cloud.clone(),
        cloud,
    )
    .with_events(events)
}

pub fn create_check_use_case() -> CheckUseCase {
    CheckUseCase::new()
}

/// The TOML state file when a path is given, otherwise a throwaway store
pub fn create_state_store(path: Option<&Path>) -> Arc<dyn StateStore> {
    match path {
        Some(path) => Arc::new(TomlStateStore::new(path)),
        None => Arc::new(MemoryStateStore::new()),
    }
}

/// NDJSON on stdout in JSON mode, tracing otherwise
pub fn create_event_sink(command: &'static str, json: bool, verbose: u8) -> Arc<dyn DeployEventSink> {
    if json {
        Arc::new(JsonEventSink::stdout(command))
    } else {
        Arc::new(TracingEventSink::new().detailed(verbose > 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::StateEntry;
    use crate::domain::value_objects::{Fingerprint, ResourceId};
    use tempfile::tempdir;

    #[test]
    fn state_store_without_path_is_in_memory() {
        let store = create_state_store(None);
        store
            .put(&ResourceId::new("bucket"), StateEntry::new("b", Fingerprint::of_bytes(b"x")))
            .unwrap();
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    #[test]
    fn state_store_with_path_writes_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cdnplan.state");
        let store = create_state_store(Some(&path));
        store
            .put(&ResourceId::new("bucket"), StateEntry::new("b", Fingerprint::of_bytes(b"x")))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn json_sink_wants_detailed_events() {
        assert!(create_event_sink("simulate", true, 0).wants_detailed_events());
    }
}
