use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use cdnplan::application::{CancellationToken, DeployOptions, ExecutorOptions};
use cdnplan::infrastructure::SimulatedCloud;
use cdnplan::presentation::factory::{
    create_event_sink, create_simulated_deploy, create_state_store,
};
use cdnplan::presentation::output::{emit, render_deploy};
use cdnplan::presentation::Style;

pub struct SimulateArgs {
    pub concurrency: usize,
    pub state: Option<PathBuf>,
    pub skip_content: bool,
}

pub fn cmd_simulate(
    config_path: Option<&Path>,
    args: SimulateArgs,
    json: bool,
    verbose: u8,
    style: Style,
) -> Result<()> {
    let (loaded, spec) = super::load_spec(config_path)?;
    super::print_warnings(&loaded.warnings, json);

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!(error = %err, "could not install Ctrl-C handler");
    }

    let deploy = create_simulated_deploy(
        Arc::new(SimulatedCloud::new()),
        create_state_store(args.state.as_deref()),
        spec.content_dir(),
        create_event_sink("simulate", json, verbose),
    );
    let options = DeployOptions::default()
        .with_executor(ExecutorOptions::default().with_max_concurrency(args.concurrency))
        .with_skip_content(args.skip_content);

    let result = deploy.execute(&spec, &options, &cancel)?;

    if json {
        emit(json!({
            "event": "result",
            "command": "simulate",
            "status": result.status().as_str(),
            "result": serde_json::to_value(&result)?,
        }))?;
    } else {
        print!("{}", render_deploy(&result, verbose, style));
    }

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
