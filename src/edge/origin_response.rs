//! Origin-response handler: security headers on every response

use super::event::{CfResponse, CloudFrontEvent, EventError, HeaderEntry};

/// `(lower-case name, canonical name, value)`
pub const SECURITY_HEADERS: &[(&str, &str, &str)] = &[
    (
        "strict-transport-security",
        "Strict-Transport-Security",
        "max-age=63072000; includeSubdomains; preload",
    ),
    ("x-content-type-options", "X-Content-Type-Options", "nosniff"),
    ("x-frame-options", "X-Frame-Options", "SAMEORIGIN"),
    ("x-xss-protection", "X-XSS-Protection", "1; mode=block"),
    ("referrer-policy", "Referrer-Policy", "same-origin"),
];

/// Set every security header, replacing any upstream value
pub fn handle(mut response: CfResponse) -> CfResponse {
    for (name, key, value) in SECURITY_HEADERS {
        response
            .headers
            .insert((*name).to_string(), vec![HeaderEntry::new(*key, *value)]);
    }
    response
}

pub fn handle_event(event: CloudFrontEvent) -> Result<CfResponse, EventError> {
    event.into_response().map(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_all_headers() {
        let response = handle(CfResponse::new("200"));
        for (name, key, value) in SECURITY_HEADERS {
            assert_eq!(
                response.headers[*name],
                vec![HeaderEntry::new(*key, *value)]
            );
        }
    }

    #[test]
    fn overwrites_upstream_header_instead_of_duplicating() {
        let mut response = CfResponse::new("200");
        response.headers.insert(
            "x-frame-options".to_string(),
            vec![HeaderEntry::new("X-Frame-Options", "ALLOW")],
        );
        let response = handle(response);
        assert_eq!(response.headers["x-frame-options"].len(), 1);
        assert_eq!(response.headers["x-frame-options"][0].value, "SAMEORIGIN");
    }

    #[test]
    fn is_idempotent() {
        let once = handle(CfResponse::new("404"));
        let twice = handle(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_unrelated_headers() {
        let mut response = CfResponse::new("200");
        response.headers.insert(
            "content-type".to_string(),
            vec![HeaderEntry::new("Content-Type", "text/html")],
        );
        let response = handle(response);
        assert_eq!(response.headers["content-type"][0].value, "text/html");
        assert_eq!(response.status, "200");
    }
}
