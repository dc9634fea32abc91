//! Deployment Environment Value Object
//!
//! The stage a deployment belongs to. Used for resource naming and for the
//! service name shown in DNS.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Deployment stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Testing,
    Qa,
    Production,
    Management,
}

impl Environment {
    /// All known environments
    pub const ALL: [Environment; 6] = [
        Environment::Development,
        Environment::Staging,
        Environment::Testing,
        Environment::Qa,
        Environment::Production,
        Environment::Management,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Testing => "testing",
            Self::Qa => "qa",
            Self::Production => "production",
            Self::Management => "management",
        }
    }

    /// Short code used in resource and service names
    pub fn short(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Staging => "stg",
            Self::Testing => "tst",
            Self::Qa => "qa",
            Self::Production => "prd",
            Self::Management => "mgt",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Service name for an application in this environment
    ///
    /// Production keeps the bare application name; every other stage gets a
    /// short suffix so stages never collide in DNS.
    pub fn service_name(&self, app_name: &str) -> String {
        if self.is_production() {
            app_name.to_string()
        } else {
            format!("{}-{}", app_name, self.short())
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" | "stg" => Ok(Self::Staging),
            "testing" | "tst" => Ok(Self::Testing),
            "qa" => Ok(Self::Qa),
            // Branch names deploy straight to production.
            "production" | "prd" | "main" | "master" => Ok(Self::Production),
            "management" | "mgt" => Ok(Self::Management),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}
