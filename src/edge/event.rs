//! CloudFront edge event shapes
//!
//! Only the fields the handlers touch are typed; everything else is carried
//! through untouched so the handler returns the same object it was given.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// One header value as CloudFront represents it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Lower-cased header name to its values
pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfRequest {
    pub uri: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CfRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            headers: Headers::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CfResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            headers: Headers::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<CfRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<CfResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub cf: CfPayload,
}

/// `{"Records": [{"cf": {...}}]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFrontEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

impl CloudFrontEvent {
    pub fn from_request(request: CfRequest) -> Self {
        Self::single(CfPayload {
            request: Some(request),
            response: None,
        })
    }

    pub fn from_response(response: CfResponse) -> Self {
        Self::single(CfPayload {
            request: None,
            response: Some(response),
        })
    }

    fn single(cf: CfPayload) -> Self {
        Self {
            records: vec![EventRecord { cf }],
        }
    }

    /// The request of the first record
    pub fn into_request(self) -> Result<CfRequest, EventError> {
        self.records
            .into_iter()
            .next()
            .ok_or(EventError::NoRecords)?
            .cf
            .request
            .ok_or(EventError::Missing("request"))
    }

    /// The response of the first record
    pub fn into_response(self) -> Result<CfResponse, EventError> {
        self.records
            .into_iter()
            .next()
            .ok_or(EventError::NoRecords)?
            .cf
            .response
            .ok_or(EventError::Missing("response"))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("event has no records")]
    NoRecords,

    #[error("event record has no {0}")]
    Missing(&'static str),
}
