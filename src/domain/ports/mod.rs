//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod content;
pub mod deploy_events;
pub mod resource_provider;
pub mod state_store;

pub use content::{CacheInvalidator, ContentObject, ContentSource, ObjectStore};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use resource_provider::{AppliedResource, ResourceProvider};
pub use state_store::{ContentManifest, StateEntry, StateError, StateResult, StateStore};
