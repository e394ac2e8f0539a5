// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Operation planning.
//!
//! ```text
//! (request, SafetyReport, RepositoryState)
//!          |
//!          v  blocked? --> ValidationBlocked
//!       Planner
//!          |
//!          v
//!        Plan
//!          steps          [CreateBranch, Checkout, Push]
//!                         [Checkout?, ResetHard | RevertRange, Push?]
//!          strategy       reset | revert, with the reason
//!          backup         Required | NotNeeded | OptedOut
//!          confirmations  destructive steps, policy overrides
//! ```
//!
//! # Rollback strategy
//!
//! ```text
//! --action given                 --> as requested
//! no <remote>/<target>           --> reset
//! remote tip older than window   --> reset
//! remote tip within window       --> revert
//! ```

pub mod executor;

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::types::PolicyConfig;
use crate::error::{OperationError, VcsResult};
use crate::git::backend::{VcsMutation, VcsQuery, short_id};
use crate::git::state::RepositoryState;
use crate::operation::{OperationKind, OperationRequest, RollbackAction};
use crate::safety::SafetyReport;

/// One VCS adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    CreateBranch { name: String, base: String },
    Checkout { reference: String },
    ResetHard { reference: String },
    RevertRange { from: String, to: String },
    Push { branch: String, set_upstream: bool },
}

impl StepAction {
    /// Short name used in logs, audit records, and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateBranch { .. } => "create_branch",
            Self::Checkout { .. } => "checkout",
            Self::ResetHard { .. } => "reset_hard",
            Self::RevertRange { .. } => "revert_range",
            Self::Push { .. } => "push",
        }
    }

    /// Equivalent git command line.
    #[must_use]
    pub fn command_line(&self, remote: &str) -> String {
        match self {
            Self::CreateBranch { name, base } => format!("git branch --no-track {name} {base}"),
            Self::Checkout { reference } => format!("git checkout {reference}"),
            Self::ResetHard { reference } => format!("git reset --hard {reference}"),
            Self::RevertRange { from, to } => {
                format!("git revert --no-edit $(git rev-list --first-parent {from}..{to})")
            }
            Self::Push {
                branch,
                set_upstream: true,
            } => format!("git push --set-upstream {remote} {branch}"),
            Self::Push { branch, .. } => format!("git push {remote} {branch}"),
        }
    }

    /// Discards commits or local changes.
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self, Self::ResetHard { .. })
    }

    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Push { .. })
    }

    pub(crate) fn apply(&self, vcs: &dyn VcsMutation) -> VcsResult<()> {
        match self {
            Self::CreateBranch { name, base } => vcs.create_branch(name, base),
            Self::Checkout { reference } => vcs.checkout(reference),
            Self::ResetHard { reference } => vcs.reset_hard(reference),
            Self::RevertRange { from, to } => vcs.revert_range(from, to),
            Self::Push {
                branch,
                set_upstream,
            } => vcs.push(branch, *set_upstream),
        }
    }
}

/// A step plus the sentence shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: StepAction,
    pub description: String,
}

impl Step {
    fn new(action: StepAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Reset-or-revert choice for a rollback, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyDecision {
    pub action: RollbackAction,
    pub reason: String,
    /// The remote counterpart has commits inside the activity window.
    pub remote_active: bool,
    /// Chosen with `--action` rather than by policy.
    pub explicit: bool,
}

/// Decide between reset and revert for rolling back `target`.
#[must_use]
pub fn choose_strategy(
    request: &OperationRequest,
    state: &RepositoryState,
    policy: &PolicyConfig,
    remote: &str,
    now: DateTime<Utc>,
) -> StrategyDecision {
    let target = request.branch();
    let days = policy.recent_activity_days;
    let tracking = state.remote_branch(remote, target);
    let remote_active =
        tracking.is_some_and(|b| now.signed_duration_since(b.tip_time) < policy.recent_activity_window());

    if let Some(action) = request.action() {
        return StrategyDecision {
            action,
            reason: format!("{action} requested with --action"),
            remote_active,
            explicit: true,
        };
    }

    let (action, reason) = match tracking {
        None => (
            RollbackAction::Reset,
            format!("no remote-tracking branch '{remote}/{target}'; history can be rewritten"),
        ),
        Some(_) if remote_active => (
            RollbackAction::Revert,
            format!("'{remote}/{target}' has commits from the last {days} day(s); history is preserved"),
        ),
        Some(_) => (
            RollbackAction::Reset,
            format!("'{remote}/{target}' has no commits from the last {days} day(s); history can be rewritten"),
        ),
    };
    StrategyDecision {
        action,
        reason,
        remote_active,
        explicit: false,
    }
}

/// What to snapshot before the first step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupPlan {
    Required { branch: String, revision: String },
    /// The operation has no destructive step.
    NotNeeded,
    /// Quick mode with `--no-backup`.
    OptedOut,
}

/// Ordered steps for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub kind: OperationKind,
    /// Branch created, switched to, or rolled back.
    pub target: String,
    pub steps: Vec<Step>,
    pub strategy: Option<StrategyDecision>,
    pub backup: BackupPlan,
    /// Yes/no questions to ask before executing, unless `--yes`.
    pub confirmations: Vec<String>,
}

impl Plan {
    #[must_use]
    pub fn has_destructive_step(&self) -> bool {
        self.steps.iter().any(|s| s.action.is_destructive())
    }

    /// Command lines of all steps, in order.
    #[must_use]
    pub fn command_lines(&self, remote: &str) -> Vec<String> {
        self.steps
            .iter()
            .map(|s| s.action.command_line(remote))
            .collect()
    }
}

/// Builds a [`Plan`] from a validated request.
pub struct Planner<'a> {
    vcs: &'a dyn VcsQuery,
    policy: &'a PolicyConfig,
    remote: &'a str,
    now: DateTime<Utc>,
}

impl<'a> Planner<'a> {
    #[must_use]
    pub fn new(vcs: &'a dyn VcsQuery, policy: &'a PolicyConfig, remote: &'a str) -> Self {
        Self {
            vcs,
            policy,
            remote,
            now: Utc::now(),
        }
    }

    /// Evaluate remote activity relative to `now` instead of the current time.
    #[must_use]
    pub const fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// # Errors
    ///
    /// Returns [`OperationError::ValidationBlocked`] if the report has a
    /// blocking finding or a revision no longer resolves, and
    /// [`OperationError::Configuration`] for flag combinations the policy
    /// does not allow.
    pub fn plan(
        &self,
        request: &OperationRequest,
        report: &SafetyReport,
        state: &RepositoryState,
    ) -> Result<Plan, OperationError> {
        if report.is_blocked() {
            return Err(OperationError::ValidationBlocked {
                findings: report.blocking_messages(),
            });
        }
        if request.skip_backup() && request.mode().backup_required() {
            return Err(OperationError::Configuration(format!(
                "--no-backup is only allowed in quick mode, not {}",
                request.mode()
            )));
        }

        let plan = match request.kind() {
            OperationKind::CreateBranch => self.plan_create(request, state)?,
            OperationKind::Rollback => self.plan_rollback(request, state)?,
        };
        info!(
            operation = %plan.kind,
            target = %plan.target,
            steps = plan.steps.len(),
            strategy = plan.strategy.as_ref().map(|s| s.action.to_string()),
            "planned"
        );
        Ok(plan)
    }

    fn plan_create(
        &self,
        request: &OperationRequest,
        state: &RepositoryState,
    ) -> Result<Plan, OperationError> {
        let name = request.branch().to_string();
        let mut steps = Vec::new();

        if request.switch_existing() {
            if state.current_branch.as_deref() != Some(name.as_str()) {
                steps.push(Step::new(
                    StepAction::Checkout {
                        reference: name.clone(),
                    },
                    format!("switch to existing branch '{name}'"),
                ));
            }
        } else {
            let base = request
                .revision()
                .map(String::from)
                .or_else(|| state.current_branch.clone())
                .or_else(|| state.head.clone())
                .ok_or_else(|| OperationError::ValidationBlocked {
                    findings: vec!["repository has no commits to branch from".to_string()],
                })?;
            steps.push(Step::new(
                StepAction::CreateBranch {
                    name: name.clone(),
                    base: base.clone(),
                },
                format!("create branch '{name}' from '{base}'"),
            ));
            steps.push(Step::new(
                StepAction::Checkout {
                    reference: name.clone(),
                },
                format!("switch to '{name}'"),
            ));
        }

        if request.push() {
            steps.push(self.push_step(&name, true));
        }

        Ok(Plan {
            kind: OperationKind::CreateBranch,
            target: name,
            steps,
            strategy: None,
            backup: BackupPlan::NotNeeded,
            confirmations: Vec::new(),
        })
    }

    fn plan_rollback(
        &self,
        request: &OperationRequest,
        state: &RepositoryState,
    ) -> Result<Plan, OperationError> {
        let target = request.branch().to_string();
        let blocked = |message: String| OperationError::ValidationBlocked {
            findings: vec![message],
        };

        let head = state
            .local_branch(&target)
            .map(|b| b.tip.clone())
            .ok_or_else(|| blocked(format!("rollback target '{target}' is not a local branch")))?;
        let destination = request
            .revision()
            .ok_or_else(|| blocked("no rollback revision given".to_string()))?;
        let destination = self
            .vcs
            .resolve(destination)
            .map_err(|e| blocked(e.to_string()))?;

        let strategy = choose_strategy(request, state, self.policy, self.remote, self.now);
        debug!(action = %strategy.action, reason = %strategy.reason, "rollback strategy");

        let mut steps = Vec::new();
        if state.current_branch.as_deref() != Some(target.as_str()) {
            steps.push(Step::new(
                StepAction::Checkout {
                    reference: target.clone(),
                },
                format!("switch to '{target}'"),
            ));
        }

        let mut confirmations = Vec::new();
        match strategy.action {
            RollbackAction::Reset => {
                if request.push() {
                    return Err(OperationError::Configuration(
                        "--push after a reset needs a force push; push manually or use --action revert"
                            .to_string(),
                    ));
                }
                steps.push(Step::new(
                    StepAction::ResetHard {
                        reference: destination.clone(),
                    },
                    format!(
                        "reset '{target}' to {} (rewrites history)",
                        short_id(&destination)
                    ),
                ));
                confirmations.push(format!(
                    "Reset '{target}' from {} to {}? Commits after {} and uncommitted changes will be discarded",
                    short_id(&head),
                    short_id(&destination),
                    short_id(&destination)
                ));
                if strategy.explicit && strategy.remote_active {
                    confirmations.push(format!(
                        "'{}/{target}' has recent activity; others may have pulled these commits. Reset anyway?",
                        self.remote
                    ));
                }
            }
            RollbackAction::Revert => {
                steps.push(Step::new(
                    StepAction::RevertRange {
                        from: destination.clone(),
                        to: head.clone(),
                    },
                    format!(
                        "revert commits {}..{} on '{target}' (preserves history)",
                        short_id(&destination),
                        short_id(&head)
                    ),
                ));
                if request.push() {
                    steps.push(self.push_step(&target, false));
                }
            }
        }

        let backup = if request.skip_backup() {
            BackupPlan::OptedOut
        } else {
            BackupPlan::Required {
                branch: target.clone(),
                revision: head,
            }
        };

        Ok(Plan {
            kind: OperationKind::Rollback,
            target,
            steps,
            strategy: Some(strategy),
            backup,
            confirmations,
        })
    }

    fn push_step(&self, branch: &str, set_upstream: bool) -> Step {
        Step::new(
            StepAction::Push {
                branch: branch.to_string(),
                set_upstream,
            },
            format!("push '{branch}' to '{}'", self.remote),
        )
    }
}
