use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::json;

use cdnplan::domain::ports::StateStore;
use cdnplan::domain::services::{AppliedNode, Differ, NodeChange, TopologyPlanner};
use cdnplan::domain::value_objects::ResourceId;
use cdnplan::infrastructure::state::{TomlStateStore, DEFAULT_STATE_FILE};
use cdnplan::presentation::output::{emit, render_plan};
use cdnplan::presentation::Style;

pub fn cmd_plan(
    config_path: Option<&Path>,
    state: Option<PathBuf>,
    show_diff: bool,
    json: bool,
    style: Style,
) -> Result<()> {
    let (loaded, spec) = super::load_spec(config_path)?;
    super::print_warnings(&loaded.warnings, json);

    let plan = TopologyPlanner::new().plan(&spec)?;
    let applied = applied_nodes(state)?;
    let diff = Differ::new().plan_diff(&plan, &applied);

    if !json {
        print!("{}", render_plan(&plan, &diff, show_diff, style));
        return Ok(());
    }

    emit(json!({
        "event": "start",
        "command": "plan",
        "model": plan.model().as_str(),
        "signing_identity": plan.model().signing_identity().map(|k| k.as_str()),
        "nodes": plan.len(),
    }))?;
    for (node, (_, change)) in plan.nodes().iter().zip(&diff.changes) {
        let mut event = json!({
            "event": "node",
            "command": "plan",
            "id": node.id,
            "kind": node.kind.as_str(),
            "change": change.as_str(),
            "depends_on": node.depends_on,
            "fingerprint": node.fingerprint().as_str(),
        });
        if let (true, NodeChange::Update(lines)) = (show_diff, change) {
            event["diff"] = json!(lines
                .changed_lines()
                .map(|line| line.content.trim_end().to_string())
                .collect::<Vec<_>>());
        }
        emit(event)?;
    }
    for id in &diff.orphaned {
        emit(json!({"event": "orphaned", "command": "plan", "id": id}))?;
    }
    emit(json!({
        "event": "complete",
        "command": "plan",
        "create": diff.count("create"),
        "update": diff.count("update"),
        "unchanged": diff.count("unchanged"),
        "orphaned": diff.orphaned.len(),
    }))?;
    Ok(())
}

/// Last applied state; an absent default state file means nothing is applied
fn applied_nodes(state: Option<PathBuf>) -> Result<BTreeMap<ResourceId, AppliedNode>> {
    let path = match state {
        Some(path) => path,
        None if Path::new(DEFAULT_STATE_FILE).is_file() => PathBuf::from(DEFAULT_STATE_FILE),
        None => return Ok(BTreeMap::new()),
    };
    let entries = TomlStateStore::new(path).entries()?;
    Ok(entries
        .into_iter()
        .map(|(id, entry)| {
            (
                id,
                AppliedNode {
                    fingerprint: entry.fingerprint,
                    attributes: entry.attributes,
                },
            )
        })
        .collect())
}
