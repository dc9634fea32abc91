use std::path::Path;

use anyhow::Result;
use serde_json::json;

use cdnplan::application::{CheckItem, CheckResult};
use cdnplan::config;
use cdnplan::presentation::factory::create_check_use_case;
use cdnplan::presentation::output::{emit, render_check};
use cdnplan::presentation::Style;

pub fn cmd_check(
    config_path: Option<&Path>,
    strict_warnings: bool,
    json: bool,
    style: Style,
) -> Result<()> {
    let loaded = super::load_config(config_path)?;

    let mut result = match config::resolve_spec(&loaded.config) {
        Ok(spec) => create_check_use_case().execute(&spec),
        Err(err) => {
            let mut result = CheckResult::default();
            result.push(CheckItem::error("config", err.to_string()));
            result
        }
    };
    for warning in &loaded.warnings {
        let recommendation = match &warning.suggestion {
            Some(suggestion) => format!("did you mean '{}'?", suggestion),
            None => "remove the key".to_string(),
        };
        let location = match warning.line {
            Some(line) => format!("{}:{}", warning.file.display(), line),
            None => warning.file.display().to_string(),
        };
        result.push(CheckItem::warning(
            "config",
            format!("unknown key '{}' in {}", warning.key, location),
            recommendation,
        ));
    }

    if json {
        for item in &result.items {
            let mut event = serde_json::to_value(item)?;
            event["event"] = json!("check");
            event["command"] = json!("check");
            emit(event)?;
        }
        emit(json!({
            "event": "complete",
            "command": "check",
            "model": result.model.map(|m| m.as_str()),
            "nodes": result.node_count,
            "passed": result.passed,
            "warnings": result.warnings,
            "errors": result.errors,
            "success": result.is_success(),
        }))?;
    } else {
        print!("{}", render_check(&result, style));
    }

    if !result.is_success() || (strict_warnings && result.warnings > 0) {
        std::process::exit(1);
    }
    Ok(())
}
