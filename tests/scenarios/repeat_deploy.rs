//! Scenario: Repeat Deploy With Persistent State
//!
//! Journey: A developer simulates a private site deploy, re-runs it, and
//! then asks for a plan against the saved state.
//!
//! Steps:
//! 1. First run applies every node and uploads the content
//! 2. Second run finds every node unchanged and uploads nothing
//! 3. `plan` against the state file reports nothing to do
//!
//! Success Criteria:
//! - State survives between runs in a TOML file
//! - Nothing is re-applied when the spec did not change

use std::fs;
use std::sync::Arc;

use cdnplan::application::{CancellationToken, DeployOptions};
use cdnplan::domain::entities::{DeploymentSpec, FeatureFlags, TlsConfig};
use cdnplan::domain::ports::NoopEventSink;
use cdnplan::domain::value_objects::AggregateStatus;
use cdnplan::infrastructure::SimulatedCloud;
use cdnplan::presentation::factory::{create_simulated_deploy, create_state_store};

use crate::common::*;

/// SCENARIO: Two runs against the same state file
#[test]
fn scenario_second_run_changes_nothing() {
    let env = TestEnv::new();
    env.write("dist/index.html", "<h1>hello</h1>");
    env.write("dist/error.html", "<h1>oops</h1>");
    let state_path = env.path().join("cdnplan.state");

    let spec = DeploymentSpec::builder("site")
        .domain("site.example.com")
        .content_dir(env.path().join("dist"))
        .tls(TlsConfig::enabled("arn:aws:acm:us-east-1:123456789012:certificate/abc"))
        .features(FeatureFlags {
            restrict_origin_access: true,
            ..FeatureFlags::default()
        })
        .build()
        .unwrap();

    let cloud = Arc::new(SimulatedCloud::new());
    let run = || {
        create_simulated_deploy(
            cloud.clone(),
            create_state_store(Some(state_path.as_path())),
            spec.content_dir(),
            Arc::new(NoopEventSink),
        )
        .execute(&spec, &DeployOptions::default(), &CancellationToken::new())
        .unwrap()
    };

    // Step 1
    let first = run();
    assert_eq!(first.status(), AggregateStatus::Success);
    assert_eq!(first.execution.count("applied"), first.execution.nodes.len());
    assert_eq!(first.content.report().unwrap().uploaded.len(), 2);
    assert!(state_path.is_file());
    let applied_after_first = cloud.applied().len();

    // Step 2
    let second = run();
    assert_eq!(second.status(), AggregateStatus::Success);
    assert_eq!(second.execution.count("unchanged"), second.execution.nodes.len());
    assert!(second.content.report().unwrap().uploaded.is_empty());
    assert_eq!(cloud.applied().len(), applied_after_first);
    assert_eq!(second.outputs(), first.outputs());
}

/// SCENARIO: `simulate` then `plan` from the command line
#[test]
fn scenario_plan_after_simulate_is_clean() {
    let env = TestEnv::with_config(PUBLIC_CONFIG);
    env.write("dist/index.html", "<h1>hello</h1>");

    // Step 1
    let result = env.run(&["simulate", "--state", "cdnplan.state"]);
    assert!(result.success, "stdout:\n{}\nstderr:\n{}", result.stdout, result.stderr);
    assert!(result.stdout.contains("Simulation: public-website - success"));
    assert!(fs::metadata(env.path().join("cdnplan.state")).is_ok());

    // Step 3
    let result = env.run(&["plan"]);
    assert!(result.success, "stderr:\n{}", result.stderr);
    assert!(
        result.stdout.contains("0 to create, 0 to update, 2 unchanged"),
        "{}",
        result.stdout
    );
}
