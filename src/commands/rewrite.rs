use std::path::Path;

use anyhow::Result;
use serde_json::json;

use cdnplan::domain::value_objects::RedirectTable;
use cdnplan::edge::{is_asset, viewer_request, CfRequest};
use cdnplan::presentation::output::{emit, render_rewrites};
use cdnplan::presentation::Style;

pub fn cmd_rewrite(
    config_path: Option<&Path>,
    uris: &[String],
    json: bool,
    style: Style,
) -> Result<()> {
    let loaded = super::load_config(config_path)?;
    super::print_warnings(&loaded.warnings, json);

    let redirects = &loaded.config.redirects;
    if !redirects.enabled && !json {
        eprintln!("warning: redirects are disabled; every URI passes through");
    }
    let table = if redirects.enabled {
        RedirectTable::new(redirects.rules.clone())
    } else {
        RedirectTable::default()
    };

    let rewrites: Vec<(String, Option<String>)> = uris
        .iter()
        .map(|uri| {
            let handled = viewer_request::handle(CfRequest::new(uri.as_str()), &table);
            let rewritten = (handled.uri != *uri).then_some(handled.uri);
            (uri.clone(), rewritten)
        })
        .collect();

    if json {
        for (uri, rewritten) in &rewrites {
            emit(json!({
                "event": "rewrite",
                "command": "rewrite",
                "uri": uri,
                "rewritten": rewritten,
                "asset": is_asset(uri),
            }))?;
        }
    } else {
        print!("{}", render_rewrites(&rewrites, style));
    }
    Ok(())
}
