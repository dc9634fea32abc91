//! Attribute references between plan nodes
//!
//! A node attribute that needs another node's output (an ARN, an endpoint)
//! stores a `{"$ref": id, "attr": name}` marker instead of the value. Values
//! that only the executor can know, like the deploying caller, are stored as
//! `{"$ctx": key}`. Markers are replaced by `resolve` once the referenced node
//! has been applied.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::domain::value_objects::ResourceId;

const REF_KEY: &str = "$ref";
const ATTR_KEY: &str = "attr";
const SUFFIX_KEY: &str = "suffix";
const CTX_KEY: &str = "$ctx";

/// Context key for the identity running the deployment
pub const CALLER_IDENTITY: &str = "caller_identity";

/// A pointer to one output of another node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub node: ResourceId,
    pub attr: String,
    /// Appended verbatim after resolution, e.g. `/*` for object ARNs
    pub suffix: Option<String>,
}

impl Reference {
    pub fn new(node: impl Into<ResourceId>, attr: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attr: attr.into(),
            suffix: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut marker = Map::new();
        marker.insert(REF_KEY.to_string(), json!(self.node));
        marker.insert(ATTR_KEY.to_string(), json!(self.attr));
        if let Some(suffix) = &self.suffix {
            marker.insert(SUFFIX_KEY.to_string(), json!(suffix));
        }
        Value::Object(marker)
    }

    /// Parse a reference marker; `None` for any other value
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let node = obj.get(REF_KEY)?.as_str()?;
        let attr = obj.get(ATTR_KEY)?.as_str()?;
        let suffix = obj.get(SUFFIX_KEY).and_then(Value::as_str).map(String::from);
        Some(Self {
            node: ResourceId::new(node),
            attr: attr.to_string(),
            suffix,
        })
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        reference.to_value()
    }
}

/// Marker for an executor-supplied context value
pub fn context_value(key: &str) -> Value {
    let mut marker = Map::new();
    marker.insert(CTX_KEY.to_string(), json!(key));
    Value::Object(marker)
}

fn context_key(value: &Value) -> Option<&str> {
    value.as_object()?.get(CTX_KEY)?.as_str()
}

/// Every node id referenced anywhere inside `value`
pub fn collect_references(value: &Value) -> BTreeSet<ResourceId> {
    let mut found = BTreeSet::new();
    walk(value, &mut |reference| {
        found.insert(reference.node);
    });
    found
}

/// Every full reference inside `value`, in document order
pub fn references_in(value: &Value) -> Vec<Reference> {
    let mut found = Vec::new();
    walk(value, &mut |reference| found.push(reference));
    found
}

fn walk(value: &Value, visit: &mut impl FnMut(Reference)) {
    if let Some(reference) = Reference::from_value(value) {
        visit(reference);
        return;
    }
    match value {
        Value::Array(items) => items.iter().for_each(|item| walk(item, visit)),
        Value::Object(map) => map.values().for_each(|item| walk(item, visit)),
        _ => {}
    }
}

/// Why a marker could not be replaced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("output '{attr}' of node '{node}' is not available")]
    MissingOutput { node: ResourceId, attr: String },

    #[error("context value '{0}' is not available")]
    MissingContext(String),
}

/// Replace every marker in `value` with its concrete string
pub fn resolve<F>(
    value: &Value,
    outputs: &F,
    context: &BTreeMap<String, String>,
) -> Result<Value, ResolveError>
where
    F: Fn(&ResourceId, &str) -> Option<String>,
{
    if let Some(reference) = Reference::from_value(value) {
        let resolved =
            outputs(&reference.node, &reference.attr).ok_or_else(|| ResolveError::MissingOutput {
                node: reference.node.clone(),
                attr: reference.attr.clone(),
            })?;
        let suffix = reference.suffix.as_deref().unwrap_or_default();
        return Ok(Value::String(format!("{}{}", resolved, suffix)));
    }
    if let Some(key) = context_key(value) {
        return context
            .get(key)
            .map(|v| Value::String(v.clone()))
            .ok_or_else(|| ResolveError::MissingContext(key.to_string()));
    }
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| resolve(item, outputs, context))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(key.clone(), resolve(item, outputs, context)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}
