//! Viewer-request handler: prefix rewrites for page paths
//!
//! A pure function of the URI and a static rule table.

use super::event::{CfRequest, CloudFrontEvent, EventError};
use crate::domain::value_objects::RedirectTable;

/// An asset is any path whose final segment contains a `.`
pub fn is_asset(uri: &str) -> bool {
    uri.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

/// The rewritten URI, or `None` when the request passes through
pub fn rewrite_uri<'a>(uri: &str, rules: &'a RedirectTable) -> Option<&'a str> {
    if is_asset(uri) {
        return None;
    }
    rules.first_match(uri).map(|rule| rule.dst.as_str())
}

pub fn handle(mut request: CfRequest, rules: &RedirectTable) -> CfRequest {
    if let Some(dst) = rewrite_uri(&request.uri, rules) {
        request.uri = dst.to_string();
    }
    request
}

pub fn handle_event(event: CloudFrontEvent, rules: &RedirectTable) -> Result<CfRequest, EventError> {
    event.into_request().map(|request| handle(request, rules))
}
