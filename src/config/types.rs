//! Configuration types
//!
//! The on-disk shape of `cdnplan.toml`. Every section defaults, so an empty
//! file plus environment overrides is a valid starting point.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{RedirectRule, SigningIdentityKind};

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectSection,
    pub content: ContentSection,
    pub domains: DomainsSection,
    pub tls: TlsSection,
    pub dns: DnsSection,
    pub cors: CorsSection,
    pub redirects: RedirectsSection,
    pub features: FeaturesSection,
    pub cache: CacheSection,
    pub invalidate: InvalidateSection,
    /// Explicit deployer identity; the caller identity is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_principal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    /// Application name, before the environment suffix
    pub name: String,
    /// Stage name; `main` and `master` mean production
    pub environment: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: String::new(),
            environment: "development".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    pub dir: PathBuf,
    pub index_document: String,
    pub error_document: String,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./dist"),
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainsSection {
    /// Base domain, e.g. `example.com`
    pub base: String,
    /// Host labels joined with `base`; the first one is canonical
    pub subdomains: Vec<String>,
    /// Serve from `<service-name>.<base>` when no subdomains are listed
    pub service_subdomain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSection {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub record: bool,
    pub acl: AclSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AclSection {
    pub enabled: bool,
    pub rules: Vec<AclRuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRuleEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSection {
    pub enabled: bool,
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    pub origin_override: bool,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_origins: vec!["*".to_string()],
            allow_methods: vec!["GET".to_string()],
            allow_headers: vec!["*".to_string()],
            allow_credentials: false,
            origin_override: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectsSection {
    pub enabled: bool,
    pub rules: Vec<RedirectRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesSection {
    pub restrict_origin_access: bool,
    pub versioning: bool,
    pub encryption_at_rest: bool,
    pub security_headers: bool,
    pub signing_identity: SigningIdentityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub default_ttl: u32,
    pub min_ttl: u32,
    pub max_ttl: u32,
    pub price_class: String,
    pub forward_query_string: bool,
}

impl Default for CacheSection {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvalidateSection {
    /// Invalidate `/*` after a fully successful deploy
    pub on_deploy: bool,
}
