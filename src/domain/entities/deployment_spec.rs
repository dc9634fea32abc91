//! DeploymentSpec entity - the validated input to the planner
//!
//! A `DeploymentSpec` is constructed once at the boundary (see
//! `config::resolve_spec`) and passed by reference into the pure planner.
//! It is never mutated afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Environment, RedirectTable, SigningIdentityKind};
use crate::error::{PlanError, PlanResult};

/// Who the deployment belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectIdentity {
    /// Service name, already suffixed with the environment where applicable
    pub name: String,
    pub environment: Environment,
}

/// Viewer-side TLS settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    pub enabled: bool,
    /// ACM certificate ARN; only ever attached when `enabled`
    pub certificate_ref: Option<String>,
}

impl TlsConfig {
    pub fn enabled(certificate_ref: impl Into<String>) -> Self {
        Self {
            enabled: true,
            certificate_ref: Some(certificate_ref.into()),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// The certificate to attach, if any
    pub fn active_certificate(&self) -> Option<&str> {
        if self.enabled {
            self.certificate_ref.as_deref()
        } else {
            None
        }
    }
}

/// One IP allow-list entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AclRuleSpec {
    pub name: String,
    pub value: String,
}

impl AclRuleSpec {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// IP allow-list settings on the secondary DNS provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AclConfig {
    pub enabled: bool,
    pub rules: Vec<AclRuleSpec>,
}

/// Secondary DNS provider settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecondaryDnsConfig {
    pub zone_id: String,
    pub record_enabled: bool,
    pub acl: AclConfig,
}

impl SecondaryDnsConfig {
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_enabled: false,
            acl: AclConfig::default(),
        }
    }

    pub fn with_record(mut self, enabled: bool) -> Self {
        self.record_enabled = enabled;
        self
    }

    pub fn with_acl(mut self, rules: Vec<AclRuleSpec>) -> Self {
        self.acl = AclConfig {
            enabled: true,
            rules,
        };
        self
    }

    pub fn is_active(&self) -> bool {
        self.record_enabled || self.acl.enabled
    }
}

/// Response-header CORS settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    pub origin_override: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: vec!["GET".to_string()],
            allow_headers: vec!["*".to_string()],
            allow_credentials: false,
            origin_override: true,
        }
    }
}

/// Viewer-request rewrite settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RedirectConfig {
    pub enabled: bool,
    pub rules: RedirectTable,
}

/// Optional features that change the shape of the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Keep the bucket private behind a signing identity
    pub restrict_origin_access: bool,
    pub versioning: bool,
    pub encryption_at_rest: bool,
    /// Inject security response headers at the edge
    pub security_headers: bool,
    pub signing_identity: SigningIdentityKind,
}

/// Edge cache behaviour
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheSettings {
    pub default_ttl: u32,
    pub min_ttl: u32,
    pub max_ttl: u32,
    pub price_class: String,
    pub forward_query_string: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl: 600,
            min_ttl: 600,
            max_ttl: 600,
            price_class: "PriceClass_All".to_string(),
            forward_query_string: true,
        }
    }
}

/// Validated, immutable deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeploymentSpec {
    project: ProjectIdentity,
    content_dir: PathBuf,
    index_document: String,
    error_document: String,
    domains: Vec<String>,
    tls: TlsConfig,
    dns: Option<SecondaryDnsConfig>,
    cors: Option<CorsConfig>,
    redirects: RedirectConfig,
    features: FeatureFlags,
    cache: CacheSettings,
    invalidate_on_deploy: bool,
    admin_principal: Option<String>,
}

impl DeploymentSpec {
    pub fn builder(project_name: impl Into<String>) -> DeploymentSpecBuilder {
        DeploymentSpecBuilder::new(project_name)
    }

    pub fn project(&self) -> &ProjectIdentity {
        &self.project
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn index_document(&self) -> &str {
        &self.index_document
    }

    pub fn error_document(&self) -> &str {
        &self.error_document
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Canonical domain for single-value DNS bindings
    pub fn primary_domain(&self) -> &str {
        self.domains.first().map(String::as_str).unwrap_or_default()
    }

    pub fn tls(&self) -> &TlsConfig {
        &self.tls
    }

    pub fn dns(&self) -> Option<&SecondaryDnsConfig> {
        self.dns.as_ref()
    }

    pub fn cors(&self) -> Option<&CorsConfig> {
        self.cors.as_ref()
    }

    pub fn redirects(&self) -> &RedirectConfig {
        &self.redirects
    }

    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }

    pub fn cache(&self) -> &CacheSettings {
        &self.cache
    }

    pub fn invalidate_on_deploy(&self) -> bool {
        self.invalidate_on_deploy
    }

    pub fn admin_principal(&self) -> Option<&str> {
        self.admin_principal.as_deref()
    }

    /// Check every structural constraint on the spec
    pub fn validate(&self) -> PlanResult<()> {
        validate_name(&self.project.name)?;

        if self.content_dir.as_os_str().is_empty() {
            return Err(PlanError::spec_invalid(
                "content_dir",
                "a content path is required",
            ));
        }

        validate_document("index_document", &self.index_document)?;
        validate_document("error_document", &self.error_document)?;

        if self.domains.is_empty() {
            return Err(PlanError::spec_invalid(
                "domains",
                "at least one domain is required",
            ));
        }
        let mut seen = BTreeSet::new();
        for domain in &self.domains {
            validate_domain(domain)?;
            if !seen.insert(domain.to_ascii_lowercase()) {
                return Err(PlanError::spec_invalid(
                    "domains",
                    format!("'{}' is listed more than once", domain),
                ));
            }
        }

        if let Some(principal) = &self.admin_principal {
            if principal.trim().is_empty() || principal.contains('*') {
                return Err(PlanError::spec_invalid(
                    "admin_principal",
                    format!("'{}' must name a single identity without wildcards", principal),
                ));
            }
        }

        if self.tls.enabled
            && self
                .tls
                .certificate_ref
                .as_deref()
                .map_or(true, |c| c.trim().is_empty())
        {
            return Err(PlanError::spec_invalid(
                "tls.certificate_ref",
                "TLS is enabled but no certificate is configured",
            ));
        }

        if let Some(dns) = &self.dns {
            if dns.is_active() && dns.zone_id.trim().is_empty() {
                return Err(PlanError::spec_invalid(
                    "dns.zone_id",
                    "a zone id is required when DNS records or ACLs are enabled",
                ));
            }
            for rule in &dns.acl.rules {
                if rule.value.trim().is_empty() {
                    return Err(PlanError::spec_invalid(
                        "dns.acl.rules",
                        format!("rule '{}' has an empty value", rule.name),
                    ));
                }
            }
        }

        if self.redirects.enabled {
            for rule in self.redirects.rules.rules() {
                if !rule.src.starts_with('/') {
                    return Err(PlanError::spec_invalid(
                        "redirects.rules",
                        format!("source '{}' must start with '/'", rule.src),
                    ));
                }
                if rule.dst.trim().is_empty() {
                    return Err(PlanError::spec_invalid(
                        "redirects.rules",
                        format!("rule '{}' has an empty destination", rule.src),
                    ));
                }
            }
        }

        let cache = &self.cache;
        if cache.min_ttl > cache.default_ttl || cache.default_ttl > cache.max_ttl {
            return Err(PlanError::spec_invalid(
                "cache",
                "expected min_ttl <= default_ttl <= max_ttl",
            ));
        }

        Ok(())
    }
}

fn validate_name(name: &str) -> PlanResult<()> {
    if name.is_empty() {
        return Err(PlanError::spec_invalid(
            "project.name",
            "a project name is required",
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(PlanError::spec_invalid(
            "project.name",
            format!("'{}' may only contain lowercase letters, digits and '-'", name),
        ));
    }
    Ok(())
}

fn validate_document(field: &str, name: &str) -> PlanResult<()> {
    if name.trim().is_empty() {
        return Err(PlanError::spec_invalid(field, "document name must not be empty"));
    }
    if name.starts_with('/') {
        return Err(PlanError::spec_invalid(
            field,
            format!("'{}' must be relative to the bucket root", name),
        ));
    }
    Ok(())
}

fn validate_domain(domain: &str) -> PlanResult<()> {
    if domain.trim().is_empty() {
        return Err(PlanError::spec_invalid("domains", "empty domain name"));
    }
    if domain.contains("://") || domain.contains('/') || domain.contains(char::is_whitespace) {
        return Err(PlanError::spec_invalid(
            "domains",
            format!("'{}' must be a bare host name", domain),
        ));
    }
    if domain.split('.').any(str::is_empty) {
        return Err(PlanError::spec_invalid(
            "domains",
            format!("'{}' has an empty label", domain),
        ));
    }
    Ok(())
}

/// Builder for `DeploymentSpec`; `build` validates
#[derive(Debug, Clone)]
pub struct DeploymentSpecBuilder {
    project: ProjectIdentity,
    content_dir: PathBuf,
    index_document: String,
    error_document: String,
    domains: Vec<String>,
    tls: TlsConfig,
    dns: Option<SecondaryDnsConfig>,
    cors: Option<CorsConfig>,
    redirects: RedirectConfig,
    features: FeatureFlags,
    cache: CacheSettings,
    invalidate_on_deploy: bool,
    admin_principal: Option<String>,
}

impl DeploymentSpecBuilder {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project: ProjectIdentity {
                name: project_name.into(),
                environment: Environment::default(),
            },
            content_dir: PathBuf::from("./dist"),
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
            domains: Vec::new(),
            tls: TlsConfig::disabled(),
            dns: None,
            cors: None,
            redirects: RedirectConfig::default(),
            features: FeatureFlags::default(),
            cache: CacheSettings::default(),
            invalidate_on_deploy: false,
            admin_principal: None,
        }
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.project.environment = environment;
        self
    }

    pub fn content_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.content_dir = path.into();
        self
    }

    pub fn documents(mut self, index: impl Into<String>, error: impl Into<String>) -> Self {
        self.index_document = index.into();
        self.error_document = error.into();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.push(domain.into());
        self
    }

    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn dns(mut self, dns: SecondaryDnsConfig) -> Self {
        self.dns = Some(dns);
        self
    }

    pub fn cors(mut self, cors: CorsConfig) -> Self {
        self.cors = Some(cors);
        self
    }

    pub fn redirects(mut self, rules: RedirectTable) -> Self {
        self.redirects = RedirectConfig {
            enabled: true,
            rules,
        };
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn cache(mut self, cache: CacheSettings) -> Self {
        self.cache = cache;
        self
    }

    pub fn invalidate_on_deploy(mut self, enabled: bool) -> Self {
        self.invalidate_on_deploy = enabled;
        self
    }

    pub fn admin_principal(mut self, principal: impl Into<String>) -> Self {
        self.admin_principal = Some(principal.into());
        self
    }

    pub fn build(self) -> PlanResult<DeploymentSpec> {
        let spec = DeploymentSpec {
            project: self.project,
            content_dir: self.content_dir,
            index_document: self.index_document,
            error_document: self.error_document,
            domains: self.domains,
            tls: self.tls,
            dns: self.dns,
            cors: self.cors,
            redirects: self.redirects,
            features: self.features,
            cache: self.cache,
            invalidate_on_deploy: self.invalidate_on_deploy,
            admin_principal: self.admin_principal,
        };
        spec.validate()?;
        Ok(spec)
    }
}
