//! Bucket policy documents
//!
//! Statements keep node references as markers so the document can be planned
//! before the resources it trusts exist. `to_json` renders the provider's
//! policy grammar with the markers still in place.

use serde_json::{json, Map, Value};

/// Policy grammar version
pub const POLICY_VERSION: &str = "2008-10-17";
/// Policy document id
pub const POLICY_ID: &str = "BUCKET-POLICY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// Who a statement applies to
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    /// Everyone (`*`)
    Any,
    /// A provider service such as `cloudfront.amazonaws.com`
    Service(String),
    /// A provider-issued identity, usually a reference to a signing identity
    Identity(Value),
    /// An account or user principal, usually the deployer
    Account(Value),
}

impl Principal {
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Any => json!("*"),
            Self::Service(name) => json!({ "Service": name }),
            Self::Identity(value) | Self::Account(value) => json!({ "AWS": value }),
        }
    }
}

/// A single `{operator: {key: value}}` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub operator: String,
    pub key: String,
    pub value: Value,
}

impl Condition {
    pub fn new(operator: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            operator: operator.into(),
            key: key.into(),
            value,
        }
    }

    fn to_json(&self) -> Value {
        let mut inner = Map::new();
        inner.insert(self.key.clone(), self.value.clone());
        let mut outer = Map::new();
        outer.insert(self.operator.clone(), Value::Object(inner));
        Value::Object(outer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sid: String,
    pub effect: Effect,
    pub principal: Principal,
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
    pub condition: Option<Condition>,
}

impl Statement {
    /// A deny that fires whenever the request was not sent over TLS
    pub fn is_transport_deny(&self) -> bool {
        self.effect == Effect::Deny
            && self.condition.as_ref().is_some_and(|c| {
                c.operator == "Bool"
                    && c.key == "aws:SecureTransport"
                    && c.value == json!("false")
            })
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("Sid".to_string(), json!(self.sid));
        obj.insert("Effect".to_string(), json!(self.effect.as_str()));
        obj.insert("Principal".to_string(), self.principal.to_json());
        obj.insert("Action".to_string(), json!(self.actions));
        obj.insert("Resource".to_string(), Value::Array(self.resources.clone()));
        if let Some(condition) = &self.condition {
            obj.insert("Condition".to_string(), condition.to_json());
        }
        Value::Object(obj)
    }
}

/// Ordered statements; earlier statements are never weakened by later ones
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyDocument {
    statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn allows(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| s.effect == Effect::Allow)
    }

    pub fn transport_denies(&self) -> usize {
        self.statements.iter().filter(|s| s.is_transport_deny()).count()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Version": POLICY_VERSION,
            "Id": POLICY_ID,
            "Statement": self.statements.iter().map(Statement::to_json).collect::<Vec<_>>(),
        })
    }
}
