//! State store implementations

mod memory;
mod toml_state;

pub use memory::MemoryStateStore;
pub use toml_state::{TomlStateStore, DEFAULT_STATE_FILE, STATE_VERSION};
