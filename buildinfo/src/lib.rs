// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Build-time version stamping for fogman binaries.
//!
//! Call [`generate_version_info`] from a `build.rs`; the binary then
//! reads the result with `env!("FOGMAN_BUILD_INFO")`.

use std::{env, fmt, process::Command};

use chrono::Utc;

const BUILD_INFO_VAR: &str = "FOGMAN_BUILD_INFO";
const BUILD_TIMESTAMP_VAR: &str = "FOGMAN_BUILD_TIMESTAMP";

/// Exports `FOGMAN_BUILD_INFO` to the crate being built and registers
/// the inputs that should re-run the build script.
///
/// The value has the form `<version> (<git> <origin> <timestamp>)
/// <rustc>`; the git, origin and rustc parts are left out when they
/// cannot be determined. Set `FOGMAN_BUILD_TIMESTAMP` for reproducible
/// builds.
pub fn generate_version_info() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed={BUILD_TIMESTAMP_VAR}");
    println!("cargo:rustc-env={BUILD_INFO_VAR}={}", BuildInfo::collect());
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BuildInfo {
    version: String,
    git_version: Option<String>,
    git_origin: Option<String>,
    timestamp: String,
    rustc_version: Option<String>,
}

impl BuildInfo {
    fn collect() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_version: git_version(),
            git_origin: command_output("git", &["config", "--get", "remote.origin.url"]),
            timestamp: build_timestamp(),
            rustc_version: command_output("rustc", &["--version"]),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.version)?;
        if let Some(git) = &self.git_version {
            write!(f, "{git} ")?;
        }
        if let Some(origin) = &self.git_origin {
            write!(f, "{origin} ")?;
        }
        write!(f, "{})", self.timestamp)?;
        if let Some(rustc) = &self.rustc_version {
            write!(f, " {rustc}")?;
        }
        Ok(())
    }
}

/// Runs a command and returns its trimmed stdout, or `None` if it
/// could not run, failed or printed nothing.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `git describe` output such as `v0.1.0-12-g77959d44-dirty`, falling
/// back to the short commit hash in untagged repositories. `None`
/// outside a git checkout.
fn git_version() -> Option<String> {
    if let Some(describe) = command_output("git", &["describe", "--tags", "--always", "--dirty"]) {
        return Some(describe);
    }

    let hash = command_output("git", &["rev-parse", "--short=10", "HEAD"])?;
    let dirty = command_output("git", &["status", "--porcelain"]).is_some();
    Some(if dirty { format!("{hash}-dirty") } else { hash })
}

fn build_timestamp() -> String {
    env::var(BUILD_TIMESTAMP_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string())
}
