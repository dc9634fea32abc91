//! Secondary DNS bindings

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Automatic TTL on the secondary DNS provider
pub const AUTOMATIC_TTL: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Cname,
}

/// An alias record pointing a domain at the distribution
#[derive(Debug, Clone, PartialEq)]
pub struct DomainBinding {
    pub record_type: RecordType,
    pub zone_id: String,
    pub name: String,
    /// Usually a reference to the distribution's domain name
    pub target: Value,
    pub proxied: bool,
    pub ttl: u32,
}

impl DomainBinding {
    pub fn to_attributes(&self) -> Value {
        json!({
            "zone_id": self.zone_id,
            "type": self.record_type,
            "name": self.name,
            "value": self.target,
            "proxied": self.proxied,
            "ttl": self.ttl,
        })
    }
}

/// One IP allow-list entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AclRule {
    pub name: String,
    pub match_value: String,
}

/// Allow-list covering a set of URL patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRestriction {
    pub zone_id: String,
    pub description: String,
    pub urls: Vec<String>,
    pub rules: Vec<AclRule>,
    pub paused: bool,
}

impl AccessRestriction {
    pub fn to_attributes(&self) -> Value {
        let configurations: Vec<Value> = self
            .rules
            .iter()
            .map(|rule| json!({"name": rule.name, "target": "ip", "value": rule.match_value}))
            .collect();
        json!({
            "zone_id": self.zone_id,
            "description": self.description,
            "urls": self.urls,
            "configurations": configurations,
            "paused": self.paused,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_renders_uppercase() {
        let binding = DomainBinding {
            record_type: RecordType::Cname,
            zone_id: "z1".into(),
            name: "site.example.com".into(),
            target: json!("d111.cloudfront.net"),
            proxied: true,
            ttl: AUTOMATIC_TTL,
        };
        assert_eq!(binding.to_attributes()["type"], "CNAME");
    }

    #[test]
    fn empty_rules_render_empty_configurations() {
        let acl = AccessRestriction {
            zone_id: "z1".into(),
            description: "Restrict access to site webapp".into(),
            urls: vec!["site.example.com/*".into()],
            rules: vec![],
            paused: false,
        };
        assert_eq!(acl.to_attributes()["configurations"], json!([]));
    }
}
