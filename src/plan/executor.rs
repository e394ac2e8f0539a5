// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Plan execution.
//!
//! ```text
//! Requested -> Validated -> Aborted
//!                        -> Planned -> BackedUp -> Executing -> Committed
//!                                   -> Skipped  ->           -> RolledBackLocally
//!                                                                    |
//!                                                 Logged <-----------'
//! ```
//!
//! Steps run one at a time. The first failure stops the sequence; steps
//! already applied are reported, not undone.

use std::fmt;

use tracing::{debug, error, info};

use super::{BackupPlan, Plan};
use crate::backup::{BackupManager, BackupRef};
use crate::error::{BackupError, OperationError, VcsError, VcsErrorKind};
use crate::git::backend::{Vcs, short_id};

/// Lifecycle of a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Requested,
    Validated,
    Aborted,
    Planned,
    BackedUp,
    Skipped,
    Executing,
    Committed,
    RolledBackLocally,
    Logged,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requested => "requested",
            Self::Validated => "validated",
            Self::Aborted => "aborted",
            Self::Planned => "planned",
            Self::BackedUp => "backed-up",
            Self::Skipped => "skipped",
            Self::Executing => "executing",
            Self::Committed => "committed",
            Self::RolledBackLocally => "rolled-back-locally",
            Self::Logged => "logged",
        })
    }
}

/// Log a phase transition.
pub fn enter(phase: Phase) -> Phase {
    debug!(%phase, "phase");
    phase
}

/// What happened while executing a plan.
#[derive(Debug)]
pub struct ExecutionReport {
    pub phase: Phase,
    pub backup: Option<BackupRef>,
    /// Commands issued to the VCS, including the failed one.
    pub issued: Vec<String>,
    /// Steps that completed.
    pub completed: usize,
    pub failure: Option<OperationError>,
}

impl ExecutionReport {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

pub struct Executor<'a> {
    vcs: &'a dyn Vcs,
    remote: &'a str,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub fn new(vcs: &'a dyn Vcs, remote: &'a str) -> Self {
        Self { vcs, remote }
    }

    /// Take the backup, then run every step until one fails.
    #[must_use]
    pub fn execute(&self, plan: &Plan) -> ExecutionReport {
        let mut report = ExecutionReport {
            phase: Phase::Planned,
            backup: None,
            issued: Vec::new(),
            completed: 0,
            failure: None,
        };

        match &plan.backup {
            BackupPlan::Required { branch, revision } => {
                match BackupManager::new(self.vcs).create_backup(branch, revision) {
                    Ok(backup) => {
                        report
                            .issued
                            .push(format!("git branch --no-track {} {revision}", backup.name));
                        report.backup = Some(backup);
                        report.phase = enter(Phase::BackedUp);
                    }
                    Err(e) => {
                        error!(error = %e, "backup failed");
                        report.failure = Some(OperationError::ExecutionFailure {
                            step: "backup".to_string(),
                            source: backup_source(e),
                            last_known_good: self.last_known_good(),
                        });
                        report.phase = enter(Phase::Aborted);
                        return report;
                    }
                }
            }
            BackupPlan::NotNeeded | BackupPlan::OptedOut => {
                report.phase = enter(Phase::Skipped);
            }
        }

        report.phase = enter(Phase::Executing);
        for step in &plan.steps {
            if step.action.is_destructive()
                && report.backup.is_none()
                && plan.backup != BackupPlan::OptedOut
            {
                report.failure = Some(OperationError::ExecutionFailure {
                    step: step.action.name().to_string(),
                    source: VcsError::new(
                        VcsErrorKind::Generic,
                        step.action.command_line(self.remote),
                        "refusing to run a destructive step without a backup",
                    ),
                    last_known_good: self.last_known_good(),
                });
                report.phase = enter(Phase::RolledBackLocally);
                return report;
            }

            let command = step.action.command_line(self.remote);
            info!(step = step.action.name(), %command, "executing");
            report.issued.push(command);

            if let Err(e) = step.action.apply(self.vcs) {
                error!(step = step.action.name(), error = %e, "step failed");
                let step_name = step.action.name().to_string();
                report.failure = Some(if step.action.is_network() && e.kind.is_transient() {
                    OperationError::NetworkFailure {
                        step: step_name,
                        source: e,
                    }
                } else {
                    OperationError::ExecutionFailure {
                        step: step_name,
                        source: e,
                        last_known_good: self.last_known_good(),
                    }
                });
                report.phase = enter(Phase::RolledBackLocally);
                return report;
            }
            report.completed += 1;
        }

        report.phase = enter(Phase::Committed);
        report
    }

    fn last_known_good(&self) -> Option<String> {
        self.vcs.resolve("HEAD").ok().map(|id| short_id(&id).to_string())
    }
}

fn backup_source(error: BackupError) -> VcsError {
    match error {
        BackupError::Vcs(e) => e,
        other @ BackupError::AlreadyExists { .. } => {
            VcsError::new(VcsErrorKind::Generic, "backup", other.to_string())
        }
    }
}
