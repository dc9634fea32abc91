//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `state/` - State stores (TOML file, in-memory)
//! - `content/` - Local content directory source
//! - `events/` - Event sinks (NDJSON, tracing)
//! - `simulated` - Deterministic stand-in for the cloud APIs

pub mod content;
pub mod events;
pub mod simulated;
pub mod state;

// Re-export for convenience
pub use content::LocalContentSource;
pub use events::{JsonEventSink, TracingEventSink};
pub use simulated::SimulatedCloud;
pub use state::{MemoryStateStore, TomlStateStore};
