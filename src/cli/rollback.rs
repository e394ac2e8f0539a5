// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Rollback command arguments.

use clap::Args;

use crate::operation::{RollbackAction, SafetyMode};

/// Arguments for the `rollback` command.
#[derive(Debug, Clone, Args)]
pub struct RollbackArgs {
    /// Branch to roll back.
    #[arg(short = 't', long)]
    pub target: String,

    /// Revision the branch should end up at.
    #[arg(long, value_name = "REV")]
    pub to: String,

    /// Safety mode (default: global.default_mode).
    #[arg(short = 'm', long, value_enum)]
    pub mode: Option<SafetyMode>,

    /// Forces reset or revert instead of the policy choice.
    #[arg(short = 'a', long, value_enum)]
    pub action: Option<RollbackAction>,

    /// Pushes the branch after a revert.
    #[arg(long)]
    pub push: bool,

    /// Skips the backup reference. Quick mode only.
    #[arg(long)]
    pub no_backup: bool,

    /// Validates and prints the plan without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Answers yes to every confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,
}
