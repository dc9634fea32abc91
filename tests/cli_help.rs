mod common;

use common::*;

#[test]
fn test_help_lists_commands() {
    let env = TestEnv::new();

    let result = env.run(&["--help"]);

    assert!(result.success);
    for command in ["plan", "check", "simulate", "rewrite"] {
        assert!(result.stdout.contains(command), "missing {}:\n{}", command, result.stdout);
    }
}

#[test]
fn test_rewrite_requires_uris() {
    let env = TestEnv::new();

    let result = env.run(&["rewrite"]);

    assert!(!result.success);
}
