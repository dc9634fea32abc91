#![no_main]

use libfuzzer_sys::fuzz_target;

use cdnplan::domain::value_objects::RedirectTable;
use cdnplan::edge::{viewer_request, CloudFrontEvent};

fuzz_target!(|data: &[u8]| {
    if let Ok(event) = serde_json::from_slice::<CloudFrontEvent>(data) {
        let _ = viewer_request::handle_event(event, &RedirectTable::default());
    }
});
