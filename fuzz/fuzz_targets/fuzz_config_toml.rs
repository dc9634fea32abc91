#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Config parsing and resolution must never panic
        if let Ok((config, _)) = cdnplan::config::parse_with_warnings(content, Path::new("fuzz.toml")) {
            let _ = cdnplan::config::resolve_spec(&config);
        }
    }
});
