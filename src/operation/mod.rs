// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! What the user asked for.
//!
//! ```text
//! OperationRequest (immutable)
//!   kind      create_branch | rollback
//!   branch    new branch name | rollback target
//!   revision  base revision   | rollback destination
//!   mode      quick | standard | comprehensive
//!   action    reset | revert (rollback only, optional)
//!   push, dry_run, assume_yes, skip_backup, switch_existing
//! ```
//!
//! # Safety mode policy
//!
//! ```text
//! mode           backup      dirty tree     protected branch
//! quick          flag-gated  warn only      warn only
//! standard       yes         confirm        warn + confirm
//! comprehensive  yes         confirm        typed confirm + detail
//! ```

use bon::Builder;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How much ceremony an operation goes through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum SafetyMode {
    Quick,
    #[default]
    Standard,
    Comprehensive,
}

/// Confirmation required before mutating a protected branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedPolicy {
    WarnOnly,
    SingleConfirm,
    TypedConfirm,
}

impl SafetyMode {
    /// Whether a backup must be taken before a rollback.
    #[must_use]
    pub const fn backup_required(self) -> bool {
        !matches!(self, Self::Quick)
    }

    /// Whether a dirty working tree needs the user's confirmation.
    #[must_use]
    pub const fn confirms_dirty_tree(self) -> bool {
        !matches!(self, Self::Quick)
    }

    #[must_use]
    pub const fn protected_policy(self) -> ProtectedPolicy {
        match self {
            Self::Quick => ProtectedPolicy::WarnOnly,
            Self::Standard => ProtectedPolicy::SingleConfirm,
            Self::Comprehensive => ProtectedPolicy::TypedConfirm,
        }
    }

    /// Whether remote branches are refreshed before validation.
    #[must_use]
    pub const fn refreshes_remote(self) -> bool {
        matches!(self, Self::Comprehensive)
    }

    /// Whether audit records carry the findings and repository snapshot.
    #[must_use]
    pub const fn detailed_audit(self) -> bool {
        matches!(self, Self::Comprehensive)
    }
}

impl std::fmt::Display for SafetyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Comprehensive => "comprehensive",
        })
    }
}

impl std::str::FromStr for SafetyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "comprehensive" => Ok(Self::Comprehensive),
            _ => Err(ConfigError::InvalidValue {
                section: "global".to_string(),
                key: "default_mode".to_string(),
                message: format!(
                    "expected 'quick', 'standard', or 'comprehensive', got '{s}'"
                ),
            }),
        }
    }
}

/// The two supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateBranch,
    Rollback,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::CreateBranch => "create_branch",
            Self::Rollback => "rollback",
        })
    }
}

/// How a rollback moves the branch back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RollbackAction {
    /// Move the branch pointer; rewrites history.
    Reset,
    /// Add commits that undo the range; preserves history.
    Revert,
}

impl RollbackAction {
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, Self::Reset)
    }
}

impl std::fmt::Display for RollbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Reset => "reset",
            Self::Revert => "revert",
        })
    }
}

/// A parsed, immutable operation request.
///
/// Remediation (renaming a branch, switching to an existing one) produces a
/// new request rather than editing this one.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct OperationRequest {
    kind: OperationKind,
    /// New branch name (`create_branch`) or rollback target.
    #[builder(into)]
    branch: String,
    /// Base revision (`create_branch`) or rollback destination.
    #[builder(into)]
    revision: Option<String>,
    #[builder(default)]
    mode: SafetyMode,
    action: Option<RollbackAction>,
    #[builder(default)]
    push: bool,
    #[builder(default)]
    dry_run: bool,
    #[builder(default)]
    assume_yes: bool,
    #[builder(default)]
    skip_backup: bool,
    #[builder(default)]
    switch_existing: bool,
}

impl OperationRequest {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    #[must_use]
    pub const fn mode(&self) -> SafetyMode {
        self.mode
    }

    #[must_use]
    pub const fn action(&self) -> Option<RollbackAction> {
        self.action
    }

    #[must_use]
    pub const fn push(&self) -> bool {
        self.push
    }

    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub const fn assume_yes(&self) -> bool {
        self.assume_yes
    }

    #[must_use]
    pub const fn skip_backup(&self) -> bool {
        self.skip_backup
    }

    #[must_use]
    pub const fn switch_existing(&self) -> bool {
        self.switch_existing
    }

    /// Same request for a different branch name.
    #[must_use]
    pub fn with_branch(&self, branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..self.clone()
        }
    }

    /// Same request, switching to the branch if it already exists.
    #[must_use]
    pub fn switching_to_existing(&self) -> Self {
        Self {
            switch_existing: true,
            ..self.clone()
        }
    }
}
