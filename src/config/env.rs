//! Environment overrides (`CDNPLAN_*`)
//!
//! The only place that reads the process environment. Everything else takes
//! a lookup function so tests can inject their own environment.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::types::Config;

pub const ENV_PREFIX: &str = "CDNPLAN_";

/// Read one variable from the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Apply `CDNPLAN_*` overrides on top of a loaded config
///
/// Empty values are ignored. Boolean variables accept `true`/`false`,
/// `1`/`0` and `yes`/`no`; anything else is an error naming the variable.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        lookup(&format!("{}{}", ENV_PREFIX, name))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let flag = |name: &str| -> Result<Option<bool>, ConfigError> {
        var(name).map(|v| parse_bool(name, &v)).transpose()
    };

    if let Some(environment) = var("ENVIRONMENT") {
        config.project.environment = environment;
    }
    if let Some(name) = var("APP_NAME") {
        config.project.name = name;
    }

    if let Some(domain) = var("DOMAIN") {
        config.domains.base = domain;
    }
    if let Some(subdomains) = var("SUBDOMAINS") {
        config.domains.subdomains = split_list(&subdomains);
    }

    if let Some(dir) = var("CONTENT_DIR") {
        config.content.dir = PathBuf::from(dir);
    }
    if let Some(index) = var("INDEX_DOCUMENT") {
        config.content.index_document = index;
    }
    if let Some(error) = var("ERROR_DOCUMENT") {
        config.content.error_document = error;
    }

    if let Some(enabled) = flag("TLS_ENABLED")? {
        config.tls.enabled = enabled;
    }
    if let Some(arn) = var("CERTIFICATE_ARN") {
        config.tls.certificate_arn = Some(arn);
    }

    if let Some(zone) = var("DNS_ZONE_ID") {
        config.dns.zone_id = Some(zone);
    }
    if let Some(enabled) = flag("DNS_RECORD_ENABLED")? {
        config.dns.record = enabled;
    }
    if let Some(enabled) = flag("DNS_ACL_ENABLED")? {
        config.dns.acl.enabled = enabled;
    }

    if let Some(enabled) = flag("CORS_ENABLED")? {
        config.cors.enabled = enabled;
    }
    if let Some(origins) = var("CORS_ALLOW_ORIGINS") {
        config.cors.allow_origins = split_list(&origins);
    }

    if let Some(enabled) = flag("INVALIDATE")? {
        config.invalidate.on_deploy = enabled;
    }

    Ok(config)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: format!("{}{}", ENV_PREFIX, name),
            message: format!("expected a boolean, got '{}'", raw),
        }),
    }
}
