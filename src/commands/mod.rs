pub mod check;
pub mod plan;
pub mod rewrite;
pub mod simulate;

use std::path::Path;

use anyhow::Result;

use cdnplan::config::{self, ConfigWarning, LoadedConfig};
use cdnplan::domain::entities::DeploymentSpec;

/// Load the effective configuration for the current directory
pub fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    let project_root = std::env::current_dir()?;
    Ok(config::load(config_path, &project_root)?)
}

/// Load the configuration and resolve it into a validated spec
pub fn load_spec(config_path: Option<&Path>) -> Result<(LoadedConfig, DeploymentSpec)> {
    let loaded = load_config(config_path)?;
    let spec = config::resolve_spec(&loaded.config)?;
    Ok((loaded, spec))
}

pub fn print_warnings(warnings: &[ConfigWarning], json: bool) {
    if json {
        return;
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}
