//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/NDJSON)
//!
//! ## Structure
//!
//! - `cli` - Argument definitions shared by the binary and its tests
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `output` - Text renderers and NDJSON helpers

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, ColorWhen, Commands};
pub use output::Style;
