//! Common test utilities for cdnplan CLI and scenario tests.
//!
//! `TestEnv` owns an isolated project directory with its own
//! `cdnplan.toml` and runs the binary inside it.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Minimal public site: one domain, no TLS, no DNS
pub const PUBLIC_CONFIG: &str = r#"
[project]
name = "site"

[domains]
base = "site.example.com"
"#;

/// Private site with TLS, DNS ACLs and redirects
pub const PRIVATE_CONFIG: &str = r#"
[project]
name = "site"
environment = "production"

[domains]
base = "example.com"
subdomains = ["a", "b"]

[tls]
enabled = true
certificate_arn = "arn:aws:acm:us-east-1:123456789012:certificate/abc"

[dns]
zone_id = "zone-123"
record = true

[dns.acl]
enabled = true
rules = [{ name = "admin", value = "10.0.0.1" }]

[redirects]
enabled = true
rules = [{ src = "/old", dst = "/new" }]
"#;

pub struct TestEnv {
    dir: TempDir,
}

pub struct TestResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Parsed NDJSON lines from stdout
    pub fn events(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
            .collect()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn with_config(config: &str) -> Self {
        let env = Self::new();
        env.write("cdnplan.toml", config);
        env
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        let mut command = Command::new(env!("CARGO_BIN_EXE_cdnplan"));
        command
            .current_dir(self.dir.path())
            .args(args)
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env_remove("RUST_LOG");
        for (key, _) in std::env::vars() {
            if key.starts_with("CDNPLAN_") {
                command.env_remove(key);
            }
        }
        let output = command.output().unwrap();
        TestResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
