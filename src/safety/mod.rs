// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pre-flight validation.
//!
//! ```text
//! validate(request, state) --> SafetyReport
//!
//!  (1) repository    accessible?                  blocking
//!  (2) branch name   grammar, suggestion          blocking
//!  (3) collision     local + remote names         warning (suffix | switch)
//!  (4) working tree  dirty?                       warning, info in quick
//!  (5) reference     base / target / destination  blocking
//!  (6) protected     policy globs                 warning (+ confirm)
//!  (7) ancestry      destination reachable        blocking
//! ```
//!
//! The validator only reads. Running it twice on the same state yields the
//! same report.

pub mod name;
pub mod suggest;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::types::PolicyConfig;
use crate::error::{VcsError, VcsErrorKind};
use crate::git::backend::{VcsQuery, short_id};
use crate::git::state::RepositoryState;
use crate::operation::{OperationKind, OperationRequest, ProtectedPolicy};

use self::name::{check_branch_name, normalize_branch_name, suffixed_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Blocking,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Blocking => "blocking",
        })
    }
}

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Repository,
    BranchName,
    Collision,
    WorkingTree,
    Reference,
    Protected,
    Ancestry,
    RemoteRefresh,
}

/// What the user must do before a finding lets the operation proceed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Confirmation {
    #[default]
    None,
    /// Answer yes.
    YesNo,
    /// Type this exact text.
    Typed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub check: Check,
    pub severity: Severity,
    /// What is wrong and how to fix it.
    pub message: String,
    /// Replacement value (branch name) the user may accept.
    pub suggestion: Option<String>,
    pub confirmation: Confirmation,
}

impl Finding {
    pub fn new(check: Check, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
            suggestion: None,
            confirmation: Confirmation::None,
        }
    }

    pub fn info(check: Check, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Info, message)
    }

    pub fn warning(check: Check, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Warning, message)
    }

    pub fn blocking(check: Check, message: impl Into<String>) -> Self {
        Self::new(check, Severity::Blocking, message)
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    #[must_use]
    pub fn with_confirmation(mut self, confirmation: Confirmation) -> Self {
        self.confirmation = confirmation;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Ordered validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetyReport {
    pub findings: Vec<Finding>,
}

impl SafetyReport {
    pub fn push(&mut self, finding: Finding) {
        debug!(check = ?finding.check, severity = %finding.severity, message = %finding.message, "finding");
        self.findings.push(finding);
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Blocking)
    }

    pub fn blocking(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Blocking)
    }

    /// Findings the user must confirm, in report order.
    pub fn confirmations(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.confirmation != Confirmation::None)
    }

    #[must_use]
    pub fn find(&self, check: Check) -> Option<&Finding> {
        self.findings.iter().find(|f| f.check == check)
    }

    /// Messages of the blocking findings, for error reporting.
    #[must_use]
    pub fn blocking_messages(&self) -> Vec<String> {
        self.blocking().map(|f| f.message.clone()).collect()
    }
}

/// Runs the pre-flight checks for one request.
pub struct Validator<'a> {
    vcs: &'a dyn VcsQuery,
    policy: &'a PolicyConfig,
}

impl<'a> Validator<'a> {
    #[must_use]
    pub fn new(vcs: &'a dyn VcsQuery, policy: &'a PolicyConfig) -> Self {
        Self { vcs, policy }
    }

    #[must_use]
    pub fn validate(&self, request: &OperationRequest, state: &RepositoryState) -> SafetyReport {
        let mut report = SafetyReport::default();

        if let Some(problem) = &state.problem {
            report.push(Finding::blocking(
                Check::Repository,
                format!(
                    "repository is not accessible ({problem}); run inside a git work tree or pass -C <dir>"
                ),
            ));
            return report;
        }

        match request.kind() {
            OperationKind::CreateBranch => self.validate_create(request, state, &mut report),
            OperationKind::Rollback => self.validate_rollback(request, state, &mut report),
        }

        debug!(
            findings = report.findings.len(),
            blocked = report.is_blocked(),
            "validation finished"
        );
        report
    }

    fn validate_create(
        &self,
        request: &OperationRequest,
        state: &RepositoryState,
        report: &mut SafetyReport,
    ) {
        let name = request.branch();
        let name_ok = check_branch_name_finding(name, report);

        if name_ok && state.has_branch(name) {
            if request.switch_existing() {
                report.push(Finding::info(
                    Check::Collision,
                    format!("branch '{name}' already exists; switching to it"),
                ));
            } else {
                let suffixed = suffixed_name(name, |c| state.has_branch(c));
                report.push(
                    Finding::warning(
                        Check::Collision,
                        format!(
                            "branch '{name}' already exists; switch to it or use '{suffixed}'"
                        ),
                    )
                    .with_suggestion(Some(suffixed)),
                );
            }
        }

        check_working_tree(request, state, report);

        let base = match request.revision() {
            Some(base) => Some(base.to_string()),
            None => state.current_branch.clone().or_else(|| state.head.clone()),
        };
        match base {
            Some(base) => {
                if !request.switch_existing() {
                    self.check_reference(Check::Reference, "base revision", &base, report);
                    self.check_protected(request, &base, false, report);
                }
            }
            None => report.push(Finding::blocking(
                Check::Reference,
                "repository has no commits to branch from; make an initial commit first",
            )),
        }
    }

    fn validate_rollback(
        &self,
        request: &OperationRequest,
        state: &RepositoryState,
        report: &mut SafetyReport,
    ) {
        let target = request.branch();

        check_working_tree(request, state, report);

        let target_head = match state.local_branch(target) {
            Some(branch) => Some(branch.tip.clone()),
            None => {
                report.push(Finding::blocking(
                    Check::Reference,
                    format!(
                        "rollback target '{target}' is not a local branch; list branches with `safegit branch list`"
                    ),
                ));
                None
            }
        };

        let destination = match request.revision() {
            Some(revision) => {
                self.check_reference(Check::Reference, "rollback revision", revision, report)
            }
            None => {
                report.push(Finding::blocking(
                    Check::Reference,
                    "no rollback revision given; pass --to <revision>",
                ));
                None
            }
        };

        if target_head.is_some() {
            self.check_protected(request, target, true, report);
        }

        if let (Some(head), Some(destination)) = (target_head, destination) {
            self.check_ancestry(target, &head, &destination, report);
        }
    }

    /// Resolve `reference`, adding a blocking finding if it does not exist.
    fn check_reference(
        &self,
        check: Check,
        what: &str,
        reference: &str,
        report: &mut SafetyReport,
    ) -> Option<String> {
        match self.vcs.resolve(reference) {
            Ok(id) => Some(id),
            Err(e) => {
                report.push(Finding::blocking(check, reference_message(what, reference, &e)));
                None
            }
        }
    }

    /// `mutated` is true when the operation rewrites `branch` itself.
    fn check_protected(
        &self,
        request: &OperationRequest,
        branch: &str,
        mutated: bool,
        report: &mut SafetyReport,
    ) {
        if !self.policy.is_protected(branch) {
            return;
        }
        let policy = request.mode().protected_policy();
        let confirmation = match policy {
            ProtectedPolicy::TypedConfirm => Confirmation::Typed(branch.to_string()),
            ProtectedPolicy::SingleConfirm => Confirmation::YesNo,
            ProtectedPolicy::WarnOnly => Confirmation::None,
        };
        let message = if mutated {
            format!("'{branch}' is a protected branch and will be rewritten")
        } else {
            format!("base '{branch}' is a protected branch")
        };
        report.push(Finding::warning(Check::Protected, message).with_confirmation(confirmation));
    }

    fn check_ancestry(
        &self,
        target: &str,
        head: &str,
        destination: &str,
        report: &mut SafetyReport,
    ) {
        if head == destination {
            report.push(Finding::blocking(
                Check::Ancestry,
                format!(
                    "'{target}' is already at {}; nothing to roll back",
                    short_id(destination)
                ),
            ));
            return;
        }
        match self.vcs.is_ancestor(destination, head) {
            Ok(true) => {}
            Ok(false) => report.push(Finding::blocking(
                Check::Ancestry,
                format!(
                    "{} is not an ancestor of '{target}' ({}); pick a revision from `git log {target}`",
                    short_id(destination),
                    short_id(head)
                ),
            )),
            Err(e) => report.push(Finding::blocking(
                Check::Ancestry,
                format!("could not compare revisions: {e}"),
            )),
        }
    }
}

/// Grammar check for a new branch name. Returns whether the name is valid.
fn check_branch_name_finding(name: &str, report: &mut SafetyReport) -> bool {
    let Err(issue) = check_branch_name(name) else {
        return true;
    };
    let suggestion = normalize_branch_name(name);
    let message = match &suggestion {
        Some(suggested) => format!("{issue}; suggested: '{suggested}'"),
        None => format!("{issue}; choose a name using only A-Z, a-z, 0-9, '.', '_', '/', '-'"),
    };
    report.push(Finding::blocking(Check::BranchName, message).with_suggestion(suggestion));
    false
}

fn check_working_tree(
    request: &OperationRequest,
    state: &RepositoryState,
    report: &mut SafetyReport,
) {
    if !state.is_dirty() {
        return;
    }
    let count = state.changes.len();
    if request.mode().confirms_dirty_tree() {
        report.push(
            Finding::warning(
                Check::WorkingTree,
                format!(
                    "working tree has {count} uncommitted change(s); commit or stash them, or confirm to continue"
                ),
            )
            .with_confirmation(Confirmation::YesNo),
        );
    } else {
        report.push(Finding::info(
            Check::WorkingTree,
            format!("working tree has {count} uncommitted change(s); continuing in quick mode"),
        ));
    }
}

fn reference_message(what: &str, reference: &str, error: &VcsError) -> String {
    match error.kind {
        VcsErrorKind::RefNotFound => format!(
            "{what} '{reference}' does not exist; check the name with `safegit branch list`"
        ),
        _ => format!("{what} '{reference}' could not be resolved: {error}"),
    }
}
