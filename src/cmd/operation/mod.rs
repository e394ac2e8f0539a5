// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Drives one operation through the pipeline.
//!
//! ```text
//! request --> [fetch, retried] --> capture state --> validate
//!                                        ^              |
//!                                        '-- remediate -+  (bad name, collision)
//!                                                       v
//!             render findings --> confirm findings --> plan
//!                                                       |
//!                          dry run? --> print steps, no audit record
//!                                                       v
//!                        confirm plan --> execute --> audit record
//! ```
//!
//! Every run except a dry run leaves exactly one audit record: `success`,
//! `aborted` (blocked, cancelled, bad flags), or `failed` (a step failed).

use std::io;

use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLog, AuditRecord, Outcome};
use crate::backup::BackupRef;
use crate::config::Config;
use crate::error::{OperationError, VcsErrorKind};
use crate::git::backend::{Vcs, short_id};
use crate::git::retry::retry_read_only;
use crate::git::state::RepositoryState;
use crate::operation::{OperationKind, OperationRequest};
use crate::plan::executor::{Executor, Phase, enter};
use crate::plan::{BackupPlan, Plan, Planner};
use crate::safety::name::check_branch_name;
use crate::safety::suggest::NameSuggester;
use crate::safety::{Check, Confirmation, Finding, SafetyReport, Severity, Validator};

use super::console::Console;

/// Collaborators of an operation run.
#[derive(Clone, Copy)]
pub struct OperationContext<'a> {
    pub vcs: &'a dyn Vcs,
    pub config: &'a Config,
    pub audit: &'a AuditLog,
    pub suggester: &'a dyn NameSuggester,
}

/// A run that completed, or a dry run that stopped after planning.
#[derive(Debug)]
pub struct OperationSummary {
    /// The request after remediation.
    pub request: OperationRequest,
    pub plan: Plan,
    pub backup: Option<BackupRef>,
    /// Commands issued, empty for a dry run.
    pub issued: Vec<String>,
    /// `None` for a dry run.
    pub record: Option<AuditRecord>,
}

impl OperationSummary {
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.request.dry_run()
    }
}

/// Run `request` to completion.
///
/// # Errors
///
/// Returns the [`OperationError`] that ended the run. The audit record has
/// been written (or a write failure logged) by the time this returns.
pub fn run_operation(
    ctx: OperationContext<'_>,
    console: &mut dyn Console,
    request: OperationRequest,
) -> Result<OperationSummary, OperationError> {
    enter(Phase::Requested);
    let dry_run = request.dry_run();
    let mut entry = AuditEntry::start(ctx.audit, &request);

    let result = drive(ctx, console, request, &mut entry);

    if dry_run {
        entry.discard();
        return result;
    }

    match result {
        Ok(mut summary) => {
            match entry.finish(Outcome::Success, None) {
                Ok(record) => summary.record = Some(record),
                Err(e) => warn!(error = %e, "operation succeeded but the audit record was not written"),
            }
            enter(Phase::Logged);
            Ok(summary)
        }
        Err(error) => {
            if let Err(e) = entry.finish(outcome_for(&error), Some(error.to_string())) {
                warn!(error = %e, "failed to write audit record");
            }
            enter(Phase::Logged);
            Err(error)
        }
    }
}

/// Audit outcome for a run that ended with `error`.
#[must_use]
pub const fn outcome_for(error: &OperationError) -> Outcome {
    match error {
        OperationError::ExecutionFailure { .. } | OperationError::NetworkFailure { .. } => {
            Outcome::Failed
        }
        OperationError::Configuration(_)
        | OperationError::ValidationBlocked { .. }
        | OperationError::Cancelled => Outcome::Aborted,
    }
}

fn drive(
    ctx: OperationContext<'_>,
    console: &mut dyn Console,
    request: OperationRequest,
    entry: &mut AuditEntry<'_>,
) -> Result<OperationSummary, OperationError> {
    let refresh = refresh_remote(ctx, &request);
    let (request, state, report) = validate(ctx, console, request, refresh, entry)?;

    for finding in &report.findings {
        console.show(&finding.to_string());
    }
    if request.mode().detailed_audit() {
        for finding in &report.findings {
            entry.add_detail(finding.to_string());
        }
        entry.add_detail(describe_state(&state));
    }

    if report.is_blocked() {
        enter(Phase::Aborted);
        return Err(OperationError::ValidationBlocked {
            findings: report.blocking_messages(),
        });
    }
    enter(Phase::Validated);

    if !request.assume_yes() && !request.dry_run() {
        confirm_findings(console, &report)?;
    }

    let remote = ctx.config.global.remote.as_str();
    let plan = Planner::new(ctx.vcs, &ctx.config.policy, remote)
        .plan(&request, &report, &state)
        .inspect_err(|_| {
            enter(Phase::Aborted);
        })?;
    enter(Phase::Planned);
    if let Some(strategy) = &plan.strategy {
        entry.set_strategy(strategy.action);
    }
    show_plan(console, &plan, remote);

    if request.dry_run() {
        console.show("dry run: no changes made");
        return Ok(OperationSummary {
            request,
            plan,
            backup: None,
            issued: Vec::new(),
            record: None,
        });
    }

    if !request.assume_yes() {
        for question in &plan.confirmations {
            if !console.confirm(question).map_err(prompt_failed)? {
                enter(Phase::Aborted);
                return Err(OperationError::Cancelled);
            }
        }
    }

    let mut execution = Executor::new(ctx.vcs, remote).execute(&plan);
    for command in &execution.issued {
        entry.push_step(command.clone());
    }
    if let Some(backup) = &execution.backup {
        entry.set_backup(backup);
        console.show(&format!(
            "backup: created '{}' at {}",
            backup.name,
            short_id(&backup.revision)
        ));
    }
    if let Some(failure) = execution.failure.take() {
        console.show(&format!(
            "stopped after {} of {} step(s)",
            execution.completed,
            plan.steps.len()
        ));
        return Err(failure);
    }

    info!(operation = %plan.kind, target = %plan.target, "operation completed");
    Ok(OperationSummary {
        request,
        plan,
        backup: execution.backup,
        issued: execution.issued,
        record: None,
    })
}

/// Fetch the remote when the mode or policy asks for it.
///
/// Returns a warning finding when the remote could not be refreshed.
fn refresh_remote(ctx: OperationContext<'_>, request: &OperationRequest) -> Option<Finding> {
    if request.dry_run()
        || !(request.mode().refreshes_remote() || ctx.config.policy.fetch_before_validate)
    {
        return None;
    }
    let remote = ctx.config.global.remote.as_str();
    match retry_read_only(&ctx.config.retry, "fetch", || ctx.vcs.fetch(remote)) {
        Ok(()) => None,
        Err(e) if e.kind == VcsErrorKind::NotARepository => None,
        Err(e) => {
            warn!(remote, error = %e, "remote refresh failed");
            Some(Finding::warning(
                Check::RemoteRefresh,
                format!("could not fetch '{remote}' ({}); remote state may be stale", e.kind),
            ))
        }
    }
}

/// Validate, remediating bad names and collisions until the request is
/// either clean or blocked for a reason the user cannot fix here.
fn validate(
    ctx: OperationContext<'_>,
    console: &mut dyn Console,
    mut request: OperationRequest,
    refresh: Option<Finding>,
    entry: &mut AuditEntry<'_>,
) -> Result<(OperationRequest, RepositoryState, SafetyReport), OperationError> {
    loop {
        let state = RepositoryState::capture(ctx.vcs).map_err(|e| {
            OperationError::Configuration(format!("could not read repository state: {e}"))
        })?;
        let mut report = Validator::new(ctx.vcs, &ctx.config.policy).validate(&request, &state);
        if let Some(finding) = &refresh {
            report.findings.insert(0, finding.clone());
        }

        let next = if request.kind() != OperationKind::CreateBranch {
            None
        } else if report.is_blocked() {
            remediate_name(ctx, console, &request, &report)?
        } else {
            remediate_collision(console, &request, &report)?
        };

        match next {
            Some(next) => {
                info!(from = request.branch(), to = next.branch(), "request remediated");
                entry.set_target(next.branch());
                request = next;
            }
            None => return Ok((request, state, report)),
        }
    }
}

fn remediate_name(
    ctx: OperationContext<'_>,
    console: &mut dyn Console,
    request: &OperationRequest,
    report: &SafetyReport,
) -> Result<Option<OperationRequest>, OperationError> {
    if request.assume_yes() || report.blocking().any(|f| f.check != Check::BranchName) {
        return Ok(None);
    }
    let Some(finding) = report.find(Check::BranchName) else {
        return Ok(None);
    };
    console.show(&finding.to_string());

    if let Some(suggested) = &finding.suggestion {
        if console
            .confirm(&format!("Use '{suggested}' instead?"))
            .map_err(prompt_failed)?
        {
            return Ok(Some(request.with_branch(suggested.clone())));
        }
    } else {
        let suggestions = ctx.suggester.suggest(request.branch());
        if !suggestions.is_empty()
            && let Some(index) = console
                .choose("Suggested branch names:", &suggestions)
                .map_err(prompt_failed)?
        {
            return Ok(Some(request.with_branch(suggestions[index].clone())));
        }
    }

    loop {
        let answer = console
            .ask("Branch name (A-Z, a-z, 0-9, '.', '_', '/', '-'; empty to cancel)")
            .map_err(prompt_failed)?;
        let Some(answer) = answer.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) else {
            enter(Phase::Aborted);
            return Err(OperationError::Cancelled);
        };
        match check_branch_name(&answer) {
            Ok(()) => return Ok(Some(request.with_branch(answer))),
            Err(issue) => console.show(&format!("[{}] {issue}", Severity::Blocking)),
        }
    }
}

fn remediate_collision(
    console: &mut dyn Console,
    request: &OperationRequest,
    report: &SafetyReport,
) -> Result<Option<OperationRequest>, OperationError> {
    let Some(finding) = report
        .find(Check::Collision)
        .filter(|f| f.severity == Severity::Warning)
    else {
        return Ok(None);
    };
    if request.assume_yes() {
        info!(branch = request.branch(), "branch exists; switching to it");
        return Ok(Some(request.switching_to_existing()));
    }

    let name = request.branch();
    let mut options = vec![format!("switch to existing branch '{name}'")];
    if let Some(suffixed) = &finding.suggestion {
        options.push(format!("create '{suffixed}' instead"));
    }
    match console
        .choose(&finding.to_string(), &options)
        .map_err(prompt_failed)?
    {
        Some(0) => Ok(Some(request.switching_to_existing())),
        Some(_) => Ok(finding
            .suggestion
            .as_ref()
            .map(|suffixed| request.with_branch(suffixed.clone()))),
        None => {
            enter(Phase::Aborted);
            Err(OperationError::Cancelled)
        }
    }
}

fn confirm_findings(console: &mut dyn Console, report: &SafetyReport) -> Result<(), OperationError> {
    for finding in report.confirmations() {
        let accepted = match &finding.confirmation {
            Confirmation::None => true,
            Confirmation::YesNo => console
                .confirm(&format!("{}. Continue?", finding.message))
                .map_err(prompt_failed)?,
            Confirmation::Typed(expected) => console
                .ask(&format!("{}. Type '{expected}' to continue", finding.message))
                .map_err(prompt_failed)?
                .is_some_and(|answer| answer.trim() == expected),
        };
        if !accepted {
            enter(Phase::Aborted);
            return Err(OperationError::Cancelled);
        }
    }
    Ok(())
}

fn show_plan(console: &mut dyn Console, plan: &Plan, remote: &str) {
    if let Some(strategy) = &plan.strategy {
        console.show(&format!("strategy: {} ({})", strategy.action, strategy.reason));
    }
    match &plan.backup {
        BackupPlan::Required { branch, revision } => console.show(&format!(
            "backup: '{branch}' at {} before the first step",
            short_id(revision)
        )),
        BackupPlan::OptedOut => console.show("backup: skipped (--no-backup)"),
        BackupPlan::NotNeeded => {}
    }
    if plan.steps.is_empty() {
        console.show("plan: nothing to do");
        return;
    }
    console.show("plan:");
    for (i, step) in plan.steps.iter().enumerate() {
        console.show(&format!(
            "  {}. {step}  [{}]",
            i + 1,
            step.action.command_line(remote)
        ));
    }
}

fn describe_state(state: &RepositoryState) -> String {
    format!(
        "state: branch={} head={} changes={} local_branches={} remote_branches={}",
        state.current_branch.as_deref().unwrap_or("(detached)"),
        state.head.as_deref().map_or("(none)", short_id),
        state.changes.len(),
        state.local_branches.len(),
        state.remote_branches.len()
    )
}

fn prompt_failed(error: io::Error) -> OperationError {
    warn!(error = %error, "could not read answer");
    enter(Phase::Aborted);
    OperationError::Cancelled
}
