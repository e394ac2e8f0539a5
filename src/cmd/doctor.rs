// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment check.
//!
//! ```text
//! git on PATH?        which      required
//! git --version       process    required
//! inside work tree?   gix        required (bare repos named)
//! current branch      gix        info
//! audit log path      config     info
//! ```

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::git::discovery::{current_branch, discover_workdir, is_git_repo};

/// Result of one doctor check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub name: &'static str,
    pub ok: bool,
    /// Optional checks never fail the run.
    pub required: bool,
    pub detail: String,
}

impl Diagnostic {
    fn new(name: &'static str, ok: bool, required: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            ok,
            required,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn line(&self) -> String {
        let status = match (self.ok, self.required) {
            (true, _) => "ok",
            (false, true) => "FAIL",
            (false, false) => "--",
        };
        format!("[{status:>4}] {:<14} {}", self.name, self.detail)
    }
}

/// Run every check against the repository containing `start`.
#[must_use]
pub fn diagnose(start: &Path, config: &Config) -> Vec<Diagnostic> {
    let mut checks = Vec::new();

    match which::which("git") {
        Ok(path) => {
            checks.push(Diagnostic::new("git", true, true, path.display().to_string()));
            checks.push(git_version(&path));
        }
        Err(e) => {
            checks.push(Diagnostic::new(
                "git",
                false,
                true,
                format!("not found on PATH ({e}); install git"),
            ));
        }
    }

    match discover_workdir(start) {
        Ok(workdir) => {
            checks.push(Diagnostic::new(
                "repository",
                true,
                true,
                workdir.display().to_string(),
            ));
            checks.push(match current_branch(&workdir) {
                Ok(Some(branch)) => Diagnostic::new("current branch", true, false, branch),
                Ok(None) => Diagnostic::new("current branch", false, false, "detached HEAD"),
                Err(e) => Diagnostic::new("current branch", false, false, e.to_string()),
            });
            checks.push(audit_location(&workdir, config));
        }
        Err(_) if is_git_repo(start) => checks.push(Diagnostic::new(
            "repository",
            false,
            true,
            format!("{} is a bare repository; run inside a work tree", start.display()),
        )),
        Err(e) => checks.push(Diagnostic::new(
            "repository",
            false,
            true,
            format!("{} is not inside a git work tree ({})", start.display(), e.kind),
        )),
    }

    debug!(checks = checks.len(), "doctor finished");
    checks
}

/// Whether every required check passed.
#[must_use]
pub fn is_healthy(checks: &[Diagnostic]) -> bool {
    checks.iter().all(|c| c.ok || !c.required)
}

/// Print the checks. Returns whether the environment is usable.
#[must_use]
pub fn run_doctor_command(start: &Path, config: &Config) -> bool {
    let checks = diagnose(start, config);
    for check in &checks {
        println!("{}", check.line());
    }
    is_healthy(&checks)
}

fn git_version(git: &Path) -> Diagnostic {
    match Command::new(git).arg("--version").output() {
        Ok(output) if output.status.success() => Diagnostic::new(
            "git version",
            true,
            true,
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ),
        Ok(output) => Diagnostic::new(
            "git version",
            false,
            true,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ),
        Err(e) => Diagnostic::new("git version", false, true, e.to_string()),
    }
}

fn audit_location(workdir: &Path, config: &Config) -> Diagnostic {
    match gix::discover(workdir) {
        Ok(repo) => {
            let log = AuditLog::for_repo(repo.git_dir(), config.audit.path.as_deref());
            let state = if log.path().exists() { "exists" } else { "not created yet" };
            Diagnostic::new(
                "audit log",
                true,
                false,
                format!("{} ({state})", log.path().display()),
            )
        }
        Err(e) => Diagnostic::new("audit log", false, false, e.to_string()),
    }
}
