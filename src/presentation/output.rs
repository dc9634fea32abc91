//! Output Rendering
//!
//! Text renderers return strings so commands decide where they go and tests
//! can snapshot them. JSON output goes through `write_event`/`emit`, one
//! object per line.

use std::io::{self, Write};

use is_terminal::IsTerminal;

use crate::application::{
    CheckResult, CheckStatus, ContentOutcome, DeployResult, InvalidationOutcome, NodeOutcome,
};
use crate::domain::entities::{ResolvedOutputs, ResourcePlan};
use crate::domain::services::{DiffTag, NodeChange, PlanDiff};
use crate::edge::is_asset;

use super::cli::ColorWhen;

/// Terminal capabilities for text output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub color: bool,
    pub unicode: bool,
}

impl Style {
    /// No color, ASCII icons
    pub fn plain() -> Self {
        Self {
            color: false,
            unicode: false,
        }
    }

    /// Decide from the `--color` flag and whether stdout is a terminal
    pub fn detect(when: Option<ColorWhen>) -> Self {
        let tty = io::stdout().is_terminal();
        let color = match when.unwrap_or(ColorWhen::Auto) {
            ColorWhen::Always => true,
            ColorWhen::Never => false,
            ColorWhen::Auto => tty,
        };
        Self { color, unicode: tty }
    }

    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.paint(text, "32")
    }

    fn red(&self, text: &str) -> String {
        self.paint(text, "31")
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(text, "33")
    }

    fn dim(&self, text: &str) -> String {
        self.paint(text, "2")
    }
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    warn: &'static str,
    skip: &'static str,
    arrow: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            warn: "⚠",
            skip: "○",
            arrow: "→",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            warn: "[!]",
            skip: "[-]",
            arrow: "->",
        }
    }
}

/// Write a single NDJSON event (one JSON object per line).
pub fn write_event(out: &mut impl Write, event: &serde_json::Value) -> io::Result<()> {
    let line = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convenience helper that writes to stdout.
pub fn emit(event: serde_json::Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_event(&mut out, &event)
}

/// The plan in apply order with the change each node would see
pub fn render_plan(plan: &ResourcePlan, diff: &PlanDiff, show_diff: bool, style: Style) -> String {
    let mut out = format!("Plan: {}, {} nodes\n\n", plan.model(), plan.len());
    let width = plan.ids().map(|id| id.as_str().len()).max().unwrap_or(0);

    for (node, (_, change)) in plan.nodes().iter().zip(&diff.changes) {
        let symbol = match change {
            NodeChange::Create => style.green("+"),
            NodeChange::Update(_) => style.yellow("~"),
            NodeChange::Unchanged => style.dim("="),
        };
        out.push_str(&format!(
            "  {} {:<width$}  {}",
            symbol,
            node.id.as_str(),
            node.kind,
            width = width
        ));
        if !node.depends_on.is_empty() {
            let deps: Vec<&str> = node.depends_on.iter().map(|d| d.as_str()).collect();
            out.push_str(&style.dim(&format!(" <- {}", deps.join(", "))));
        }
        out.push('\n');

        if let (true, NodeChange::Update(lines)) = (show_diff, change) {
            for line in lines.changed_lines() {
                let text = line.content.trim_end();
                let rendered = match line.tag {
                    DiffTag::Insert => style.green(&format!("+{}", text)),
                    DiffTag::Delete => style.red(&format!("-{}", text)),
                    DiffTag::Equal => continue,
                };
                out.push_str(&format!("      {}\n", rendered));
            }
        }
    }

    for id in &diff.orphaned {
        out.push_str(&format!("  {} {}  (no longer planned)\n", style.red("-"), id));
    }

    out.push_str(&format!(
        "\n{} to create, {} to update, {} unchanged\n",
        diff.count("create"),
        diff.count("update"),
        diff.count("unchanged")
    ));
    out
}

pub fn render_check(result: &CheckResult, style: Style) -> String {
    let icons = style.icons();
    let mut out = match result.model {
        Some(model) => format!("Model: {} ({} nodes)\n\n", model, result.node_count),
        None => "Model: unknown (planning failed)\n\n".to_string(),
    };

    for item in &result.items {
        let icon = match item.status {
            CheckStatus::Pass => style.green(icons.check),
            CheckStatus::Warning => style.yellow(icons.warn),
            CheckStatus::Error => style.red(icons.cross),
        };
        out.push_str(&format!("  {} {}: {}\n", icon, item.name, item.message));
        if let Some(recommendation) = &item.recommendation {
            out.push_str(&format!("      {}\n", style.dim(recommendation)));
        }
    }

    let title = if !result.is_success() {
        "Check FAILED"
    } else if result.warnings > 0 {
        "Check passed with warnings"
    } else {
        "All checks passed"
    };
    out.push_str(&format!(
        "\n{}: {} passed, {} warnings, {} errors\n",
        title, result.passed, result.warnings, result.errors
    ));
    out
}

pub fn render_deploy(result: &DeployResult, verbose: u8, style: Style) -> String {
    let icons = style.icons();
    let status = result.status();
    let status_text = if status.is_success() {
        style.green(status.as_str())
    } else {
        style.red(status.as_str())
    };
    let mut out = format!("Simulation: {} - {}\n\n", result.model, status_text);

    let width = result
        .execution
        .nodes
        .iter()
        .map(|(id, _)| id.as_str().len())
        .max()
        .unwrap_or(0);
    for (id, outcome) in &result.execution.nodes {
        let (icon, detail) = match outcome {
            NodeOutcome::Applied {
                provider_id,
                attempts,
            } if *attempts > 1 => (
                style.green(icons.check),
                format!("applied {} after {} attempts", provider_id, attempts),
            ),
            NodeOutcome::Applied { provider_id, .. } => {
                (style.green(icons.check), format!("applied {}", provider_id))
            }
            NodeOutcome::Unchanged { provider_id } => {
                (style.dim(icons.check), format!("unchanged {}", provider_id))
            }
            NodeOutcome::Failed { kind, error } => (
                style.red(icons.cross),
                format!("failed ({}): {}", kind.as_str(), error),
            ),
            NodeOutcome::Skipped { blocked_by } => (
                style.yellow(icons.skip),
                format!("skipped, blocked by {}", blocked_by),
            ),
            NodeOutcome::Cancelled => (style.yellow(icons.skip), "cancelled".to_string()),
        };
        out.push_str(&format!(
            "  {} {:<width$}  {}\n",
            icon,
            id.as_str(),
            detail,
            width = width
        ));
    }

    out.push('\n');
    match &result.content {
        ContentOutcome::Synced(report) => {
            out.push_str(&format!(
                "Content: {} uploaded, {} unchanged, {} failed\n",
                report.uploaded.len(),
                report.skipped.len(),
                report.failed.len()
            ));
            if verbose > 0 {
                for key in &report.uploaded {
                    out.push_str(&format!("  {} {}\n", icons.arrow, key));
                }
            }
            for (key, error) in &report.failed {
                out.push_str(&format!("  {} {}: {}\n", style.red(icons.cross), key, error));
            }
        }
        ContentOutcome::NotRun { reason } => {
            out.push_str(&format!("Content: not run ({})\n", reason));
        }
        ContentOutcome::Error { error } => {
            out.push_str(&format!("Content: {} {}\n", style.red(icons.cross), error));
        }
    }

    match &result.invalidation {
        InvalidationOutcome::Requested { invalidation_id } => {
            out.push_str(&format!("Invalidation: requested {}\n", invalidation_id));
        }
        InvalidationOutcome::NotRun { reason } => {
            out.push_str(&format!("Invalidation: not run ({})\n", reason));
        }
        InvalidationOutcome::Failed { error, .. } => {
            out.push_str(&format!(
                "Invalidation: {} {} (warning only)\n",
                style.yellow(icons.warn),
                error
            ));
        }
    }

    out.push_str(&render_outputs(result.outputs()));
    out
}

fn render_outputs(outputs: &ResolvedOutputs) -> String {
    let rows = [
        ("cdn_domain_name", &outputs.cdn_domain_name),
        ("cdn_url", &outputs.cdn_url),
        ("origin_hostname", &outputs.origin_hostname),
        ("origin_url", &outputs.origin_url),
    ];
    let mut out = String::new();
    for (name, value) in rows {
        if let Some(value) = value {
            if out.is_empty() {
                out.push_str("\nOutputs:\n");
            }
            out.push_str(&format!("  {:<16} {}\n", name, value));
        }
    }
    out
}

/// One line per URI: its rewrite, or why it passes through
pub fn render_rewrites(rewrites: &[(String, Option<String>)], style: Style) -> String {
    let icons = style.icons();
    let mut out = String::new();
    for (uri, rewritten) in rewrites {
        let line = match rewritten {
            Some(dst) => format!("{} {} {}", uri, icons.arrow, dst),
            None if is_asset(uri) => format!("{} {}", uri, style.dim("(asset, passed through)")),
            None => format!("{} {}", uri, style.dim("(no matching rule)")),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
