//! Property tests for the viewer-request rewrite handler.

use proptest::prelude::*;

use cdnplan::domain::value_objects::{RedirectRule, RedirectTable};
use cdnplan::edge::{is_asset, viewer_request, CfRequest};

fn table() -> RedirectTable {
    RedirectTable::new(vec![
        RedirectRule::new("/old", "/new"),
        RedirectRule::new("/docs", "/guide"),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The handler never panics, whatever the URI.
    #[test]
    fn property_handle_never_panics(uri in "(?s).{0,128}") {
        let _ = viewer_request::handle(CfRequest::new(uri), &table());
    }

    /// PROPERTY: Asset requests always pass through unchanged.
    #[test]
    fn property_assets_pass_through(
        dir in "(/[a-z]{1,8}){0,3}",
        stem in "[a-z]{1,8}",
        ext in "[a-z]{1,4}",
    ) {
        let uri = format!("/old{}/{}.{}", dir, stem, ext);
        prop_assert!(is_asset(&uri));
        let request = viewer_request::handle(CfRequest::new(uri.clone()), &table());
        prop_assert_eq!(request.uri, uri);
    }

    /// PROPERTY: Page paths under a rule's prefix go to that rule's destination.
    #[test]
    fn property_matching_pages_are_rewritten(rest in "(/[a-z]{1,8}){0,3}") {
        let uri = format!("/old{}", rest);
        let request = viewer_request::handle(CfRequest::new(uri), &table());
        prop_assert_eq!(request.uri, "/new");
    }

    /// PROPERTY: Page paths no rule matches pass through.
    #[test]
    fn property_unmatched_pages_pass_through(rest in "/[p-z][a-z]{0,8}(/[a-z]{1,8}){0,2}") {
        let request = viewer_request::handle(CfRequest::new(rest.clone()), &table());
        prop_assert_eq!(request.uri, rest);
    }
}
