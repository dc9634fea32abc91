//! Content source implementations

mod local;

pub use local::{LocalContentSource, IGNORE_FILE};
