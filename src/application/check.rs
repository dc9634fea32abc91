//! Check Use Case
//!
//! Validates a deployment spec without touching any provider: the spec is
//! planned (which runs the access audit) and the resulting topology is
//! inspected for settings worth a second look.

use serde::Serialize;

use crate::domain::entities::{DeploymentSpec, ResourcePlan};
use crate::domain::services::TopologyPlanner;
use crate::domain::value_objects::{OriginAccessModel, SigningIdentityKind};

/// Status of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    /// How to fix a warning or error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl CheckItem {
    pub fn pass(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Pass, message, None)
    }

    pub fn warning(name: &str, message: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warning, message, Some(recommendation.into()))
    }

    pub fn error(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Error, message, None)
    }

    fn new(
        name: &str,
        status: CheckStatus,
        message: impl Into<String>,
        recommendation: Option<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            recommendation,
        }
    }
}

/// Result of the check operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    /// Selected topology; `None` when planning failed
    pub model: Option<OriginAccessModel>,
    pub node_count: usize,
    pub items: Vec<CheckItem>,
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl CheckResult {
    pub fn push(&mut self, item: CheckItem) {
        match item.status {
            CheckStatus::Pass => self.passed += 1,
            CheckStatus::Warning => self.warnings += 1,
            CheckStatus::Error => self.errors += 1,
        }
        self.items.push(item);
    }

    /// No errors
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    /// No errors and no warnings
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckUseCase {
    planner: TopologyPlanner,
}

impl CheckUseCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(&self, spec: &DeploymentSpec) -> CheckResult {
        let mut result = CheckResult::default();

        let plan = match self.planner.plan(spec) {
            Ok(plan) => plan,
            Err(err) => {
                result.push(CheckItem::error("plan", err.to_string()));
                return result;
            }
        };
        result.model = Some(plan.model());
        result.node_count = plan.len();
        result.push(CheckItem::pass(
            "plan",
            format!("{} nodes, access audit passed", plan.len()),
        ));

        result.push(origin_access(&plan));
        result.push(tls(spec));
        if let Some(item) = dns_acl(spec) {
            result.push(item);
        }
        result
    }
}

fn origin_access(plan: &ResourcePlan) -> CheckItem {
    match plan.model() {
        OriginAccessModel::PublicWebsite => CheckItem::warning(
            "origin-access",
            "bucket website endpoint is publicly readable",
            "set features.restrict_origin_access = true to keep the bucket private",
        ),
        OriginAccessModel::PrivateSigned(SigningIdentityKind::LegacyIdentity) => {
            CheckItem::warning(
                "origin-access",
                "bucket is private behind a legacy origin access identity",
                "use features.signing_identity = \"access-control\"",
            )
        }
        OriginAccessModel::PrivateSigned(SigningIdentityKind::AccessControl) => {
            CheckItem::pass("origin-access", "bucket is private behind origin access control")
        }
    }
}

fn tls(spec: &DeploymentSpec) -> CheckItem {
    if spec.tls().active_certificate().is_some() {
        CheckItem::pass("tls", format!("{} domain(s) served with a custom certificate", spec.domains().len()))
    } else {
        CheckItem::warning(
            "tls",
            "TLS disabled; only the default edge certificate and host name are served",
            "set tls.enabled = true and tls.certificate_arn",
        )
    }
}

fn dns_acl(spec: &DeploymentSpec) -> Option<CheckItem> {
    let dns = spec.dns()?;
    if !dns.acl.enabled {
        return None;
    }
    Some(if dns.acl.rules.is_empty() {
        CheckItem::warning(
            "dns-acl",
            "IP allow-list is enabled but has no rules; nothing is restricted",
            "add [[dns.acl.rules]] entries",
        )
    } else {
        CheckItem::pass("dns-acl", format!("{} allow-list rule(s)", dns.acl.rules.len()))
    })
}
