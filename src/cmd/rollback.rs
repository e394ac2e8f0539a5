// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Rollback command implementation for safegit.

use super::Workspace;
use super::console::Console;
use super::operation::run_operation;
use crate::cli::rollback::RollbackArgs;
use crate::error::Result;
use crate::operation::{OperationKind, OperationRequest};

/// Main handler for rollback command.
///
/// # Errors
///
/// Returns an [`OperationError`](crate::error::OperationError) if the
/// rollback did not complete.
pub fn run_rollback_command(
    args: &RollbackArgs,
    workspace: &Workspace,
    console: &mut dyn Console,
) -> Result<()> {
    let request = OperationRequest::builder()
        .kind(OperationKind::Rollback)
        .branch(args.target.as_str())
        .revision(args.to.as_str())
        .mode(args.mode.unwrap_or(workspace.config.global.default_mode))
        .maybe_action(args.action)
        .push(args.push)
        .dry_run(args.dry_run)
        .assume_yes(args.yes)
        .skip_backup(args.no_backup)
        .build();

    let summary = run_operation(workspace.context(), console, request)?;
    if summary.is_dry_run() {
        return Ok(());
    }

    let action = summary
        .plan
        .strategy
        .as_ref()
        .map_or_else(String::new, |s| format!(" ({})", s.action));
    console.show(&format!(
        "Rolled back '{}' to {}{action}",
        summary.plan.target, args.to
    ));
    if let Some(backup) = &summary.backup {
        console.show(&format!(
            "Restore with: git reset --hard {} (on '{}')",
            backup.name, backup.branch
        ));
    }
    Ok(())
}
