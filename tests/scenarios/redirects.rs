//! Scenario: Legacy Path Redirects
//!
//! Journey: A site moved its pages from `/old` to `/new` and must keep old
//! links working without touching asset requests.
//!
//! Success Criteria:
//! - Page requests under `/old` are rewritten to `/new`
//! - Asset requests pass through untouched
//! - The `rewrite` command reports the same decisions

use cdnplan::domain::value_objects::{RedirectRule, RedirectTable};
use cdnplan::edge::{viewer_request, CfRequest, CloudFrontEvent};

use crate::common::*;

fn table() -> RedirectTable {
    RedirectTable::new(vec![RedirectRule::new("/old", "/new")])
}

/// SCENARIO: Rewrites applied by the viewer-request handler
#[test]
fn scenario_pages_rewritten_assets_untouched() {
    let page = viewer_request::handle(CfRequest::new("/old/page"), &table());
    assert_eq!(page.uri, "/new");

    let asset = viewer_request::handle(CfRequest::new("/style.css"), &table());
    assert_eq!(asset.uri, "/style.css");
}

/// SCENARIO: The same rewrite through the edge event contract
#[test]
fn scenario_rewrite_through_event() {
    let event: CloudFrontEvent = serde_json::from_value(serde_json::json!({
        "Records": [{"cf": {"request": {"uri": "/old/page", "headers": {}}}}]
    }))
    .unwrap();

    let request = viewer_request::handle_event(event, &table()).unwrap();
    assert_eq!(request.uri, "/new");
}

/// SCENARIO: Checking rewrites from the command line
#[test]
fn scenario_rewrite_command() {
    let env = TestEnv::with_config(PRIVATE_CONFIG);

    let result = env.run(&["rewrite", "/old/page", "/style.css", "/about"]);

    assert!(result.success, "stderr:\n{}", result.stderr);
    assert!(result.stdout.contains("/old/page -> /new"), "{}", result.stdout);
    assert!(result.stdout.contains("/style.css (asset, passed through)"));
    assert!(result.stdout.contains("/about (no matching rule)"));
}
