// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch name suggestions for input that does not normalize to ASCII.
//!
//! ```text
//! "用户认证" --> NameSuggester::suggest --> ["user-auth", ...]
//!                      |
//!               unavailable / empty
//!                      v
//!              prompt for an ASCII name
//! ```

use std::process::Command;

use tracing::{debug, warn};

use super::name::normalize_branch_name;

/// Turns raw input into candidate branch names.
///
/// An empty result means no suggestion is available; callers fall back to
/// asking the user.
pub trait NameSuggester {
    fn suggest(&self, raw: &str) -> Vec<String>;
}

/// No suggestion service configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSuggester;

impl NameSuggester for NoSuggester {
    fn suggest(&self, _raw: &str) -> Vec<String> {
        Vec::new()
    }
}

/// External program called with the raw input as its only argument.
///
/// Each non-empty stdout line is a candidate. Candidates are normalized and
/// invalid ones dropped.
#[derive(Debug, Clone)]
pub struct CommandSuggester {
    program: String,
}

impl CommandSuggester {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl NameSuggester for CommandSuggester {
    fn suggest(&self, raw: &str) -> Vec<String> {
        let output = match Command::new(&self.program).arg(raw).output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                warn!(
                    program = %self.program,
                    status = %output.status,
                    "name suggestion service failed"
                );
                return Vec::new();
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "name suggestion service unavailable");
                return Vec::new();
            }
        };

        let mut suggestions: Vec<String> = Vec::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            if let Some(name) = normalize_branch_name(line.trim())
                && !suggestions.contains(&name)
            {
                suggestions.push(name);
            }
        }
        debug!(count = suggestions.len(), "received name suggestions");
        suggestions
    }
}

/// Suggester for `naming.suggest_command`.
#[must_use]
pub fn from_command(command: Option<&str>) -> Box<dyn NameSuggester> {
    match command.map(str::trim).filter(|c| !c.is_empty()) {
        Some(program) => Box::new(CommandSuggester::new(program)),
        None => Box::new(NoSuggester),
    }
}
