//! Configuration module for cdnplan
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (CDNPLAN_*)
//! 3. Project config (./cdnplan.toml, or the `--config` path)
//! 4. User config (~/.config/cdnplan/config.toml)
//! 5. Built-in defaults (lowest priority)

mod env;
mod loader;
mod resolve;
mod types;

pub use env::{apply_env_overrides, process_env, ENV_PREFIX};
pub use loader::{
    find_config, load, load_with_lookup, load_with_warnings, parse_with_warnings, ConfigWarning,
    LoadedConfig, DEFAULT_CONFIG_FILE,
};
pub use resolve::resolve_spec;
pub use types::{
    AclRuleEntry, AclSection, CacheSection, Config, ContentSection, CorsSection, DnsSection,
    DomainsSection, FeaturesSection, InvalidateSection, ProjectSection, RedirectsSection,
    TlsSection,
};
