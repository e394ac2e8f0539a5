// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   branch create / list, rollback, audit, doctor, options, configs
//!
//! Workspace: repository + config + audit log + name suggester,
//!            opened once per invocation
//! ```

pub mod audit;
pub mod branch;
pub mod config;
pub mod console;
pub mod doctor;
pub mod operation;
pub mod rollback;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::error::Result;
use crate::git::backend::{ShellBackend, VcsQuery};
use crate::safety::suggest::{self, NameSuggester};

use self::operation::OperationContext;

/// Everything a repository command needs, opened once per invocation.
pub struct Workspace {
    pub backend: ShellBackend,
    pub config: Config,
    pub audit: AuditLog,
    pub suggester: Box<dyn NameSuggester>,
}

impl Workspace {
    /// Bind `config` to the work tree at `workdir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the git directory cannot be determined.
    pub fn open(workdir: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let backend = ShellBackend::new(workdir, config.global.remote.clone());
        let git_dir = backend
            .git_dir()
            .with_context(|| format!("not a git work tree: {}", backend.workdir().display()))?;
        let audit = AuditLog::for_repo(&git_dir, config.audit.path.as_deref());
        let suggester = suggest::from_command(config.naming.suggest_command.as_deref());
        Ok(Self {
            backend,
            config,
            audit,
            suggester,
        })
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        self.backend.workdir()
    }

    #[must_use]
    pub fn context(&self) -> OperationContext<'_> {
        OperationContext {
            vcs: &self.backend,
            config: &self.config,
            audit: &self.audit,
            suggester: self.suggester.as_ref(),
        }
    }
}
