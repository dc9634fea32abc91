//! Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::{apply_env_overrides, process_env};
use super::types::Config;

pub const DEFAULT_CONFIG_FILE: &str = "cdnplan.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// A configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration was read from; `None` means defaults only
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        file: path.to_path_buf(),
        source,
    })?;
    parse_with_warnings(&content, path)
}

/// Parse config text; `path` is only used in warnings and errors
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Pick the config file to read
///
/// An explicit path always wins. Otherwise `cdnplan.toml` in `project_root`,
/// then `<user config dir>/cdnplan/config.toml`.
pub fn find_config(explicit: Option<&Path>, project_root: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let project_config = project_root.join(DEFAULT_CONFIG_FILE);
    if project_config.is_file() {
        return Some(project_config);
    }

    dirs::config_dir()
        .map(|dir| dir.join("cdnplan").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Load the effective configuration: file (or defaults), then `CDNPLAN_*`
pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<LoadedConfig, ConfigError> {
    load_with_lookup(explicit, project_root, process_env)
}

/// `load` with an injectable environment
pub fn load_with_lookup<F>(
    explicit: Option<&Path>,
    project_root: &Path,
    lookup: F,
) -> Result<LoadedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let source = find_config(explicit, project_root);
    let (config, warnings) = match &source {
        Some(path) => load_with_warnings(path)?,
        None => (Config::default(), Vec::new()),
    };
    for warning in &warnings {
        tracing::debug!(key = %warning.key, file = %warning.file.display(), "unknown config key");
    }

    Ok(LoadedConfig {
        config: apply_env_overrides(config, lookup)?,
        source,
        warnings,
    })
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "project",
        "name",
        "environment",
        "content",
        "dir",
        "index_document",
        "error_document",
        "domains",
        "base",
        "subdomains",
        "service_subdomain",
        "tls",
        "enabled",
        "certificate_arn",
        "dns",
        "zone_id",
        "record",
        "acl",
        "rules",
        "value",
        "cors",
        "allow_origins",
        "allow_methods",
        "allow_headers",
        "allow_credentials",
        "origin_override",
        "redirects",
        "src",
        "dst",
        "features",
        "restrict_origin_access",
        "versioning",
        "encryption_at_rest",
        "security_headers",
        "signing_identity",
        "cache",
        "default_ttl",
        "min_ttl",
        "max_ttl",
        "price_class",
        "forward_query_string",
        "invalidate",
        "on_deploy",
        "admin_principal",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
