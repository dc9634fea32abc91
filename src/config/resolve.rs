//! Config → DeploymentSpec
//!
//! Turns the loose file/env shape into the validated spec the planner takes.
//! Validation itself lives on `DeploymentSpec`; this only maps field names
//! back to config keys.

use crate::domain::entities::{
    AclConfig, AclRuleSpec, CacheSettings, CorsConfig, DeploymentSpec, FeatureFlags,
    SecondaryDnsConfig, TlsConfig,
};
use crate::domain::value_objects::{Environment, RedirectTable};
use crate::error::{ConfigError, PlanError};

use super::types::{Config, DnsSection, DomainsSection};

/// Build the validated `DeploymentSpec` for a configuration
pub fn resolve_spec(config: &Config) -> Result<DeploymentSpec, ConfigError> {
    let environment: Environment =
        config
            .project
            .environment
            .parse()
            .map_err(|message| ConfigError::Invalid {
                key: "project.environment".to_string(),
                message,
            })?;

    let app_name = config.project.name.trim();
    if app_name.is_empty() {
        return Err(ConfigError::Invalid {
            key: "project.name".to_string(),
            message: "an application name is required (or set CDNPLAN_APP_NAME)".to_string(),
        });
    }
    let service_name = environment.service_name(app_name);

    let mut builder = DeploymentSpec::builder(service_name.clone())
        .environment(environment)
        .content_dir(&config.content.dir)
        .documents(
            config.content.index_document.clone(),
            config.content.error_document.clone(),
        )
        .domains(domain_names(&config.domains, &service_name)?)
        .tls(TlsConfig {
            enabled: config.tls.enabled,
            certificate_ref: config.tls.certificate_arn.clone(),
        })
        .features(FeatureFlags {
            restrict_origin_access: config.features.restrict_origin_access,
            versioning: config.features.versioning,
            encryption_at_rest: config.features.encryption_at_rest,
            security_headers: config.features.security_headers,
            signing_identity: config.features.signing_identity,
        })
        .cache(CacheSettings {
            default_ttl: config.cache.default_ttl,
            min_ttl: config.cache.min_ttl,
            max_ttl: config.cache.max_ttl,
            price_class: config.cache.price_class.clone(),
            forward_query_string: config.cache.forward_query_string,
        })
        .invalidate_on_deploy(config.invalidate.on_deploy);

    if let Some(dns) = dns_config(&config.dns) {
        builder = builder.dns(dns);
    }
    if config.cors.enabled {
        builder = builder.cors(CorsConfig {
            allow_origins: config.cors.allow_origins.clone(),
            allow_methods: config.cors.allow_methods.clone(),
            allow_headers: config.cors.allow_headers.clone(),
            allow_credentials: config.cors.allow_credentials,
            origin_override: config.cors.origin_override,
        });
    }
    if config.redirects.enabled {
        builder = builder.redirects(RedirectTable::new(config.redirects.rules.clone()));
    }
    if let Some(principal) = config.admin_principal.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.admin_principal(principal);
    }

    builder.build().map_err(|err| match err {
        PlanError::SpecInvalid { field, reason } => ConfigError::Invalid {
            key: field,
            message: reason,
        },
        other => ConfigError::Invalid {
            key: "spec".to_string(),
            message: other.to_string(),
        },
    })
}

/// Host names served by the distribution, canonical first
fn domain_names(domains: &DomainsSection, service_name: &str) -> Result<Vec<String>, ConfigError> {
    let base = domains.base.trim();
    if base.is_empty() {
        return Err(ConfigError::Invalid {
            key: "domains.base".to_string(),
            message: "a base domain is required (or set CDNPLAN_DOMAIN)".to_string(),
        });
    }

    let names: Vec<String> = domains
        .subdomains
        .iter()
        .map(|sub| sub.trim())
        .filter(|sub| !sub.is_empty())
        .map(|sub| format!("{}.{}", sub, base))
        .collect();
    if !names.is_empty() {
        return Ok(names);
    }
    if domains.service_subdomain {
        return Ok(vec![format!("{}.{}", service_name, base)]);
    }
    Ok(vec![base.to_string()])
}

fn dns_config(dns: &DnsSection) -> Option<SecondaryDnsConfig> {
    if dns.zone_id.is_none() && !dns.record && !dns.acl.enabled {
        return None;
    }
    Some(SecondaryDnsConfig {
        zone_id: dns.zone_id.clone().unwrap_or_default(),
        record_enabled: dns.record,
        acl: AclConfig {
            enabled: dns.acl.enabled,
            rules: dns
                .acl
                .rules
                .iter()
                .map(|rule| AclRuleSpec::new(rule.name.clone(), rule.value.clone()))
                .collect(),
        },
    })
}
