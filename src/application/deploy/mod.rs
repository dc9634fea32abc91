//! Deploy Module
//!
//! Orchestrates a full deployment of one `DeploymentSpec`.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployOptions`)
//! - `result` - Result types (`DeployResult`, `ContentOutcome`)
//! - `use_case` - Core use case logic (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use cdnplan::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(provider, state, source, store, invalidator);
//! let result = use_case.execute(&spec, &DeployOptions::default(), &cancel)?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::DeployOptions;
pub use result::{ContentOutcome, DeployResult};
pub use use_case::{DeployError, DeployUseCase};
