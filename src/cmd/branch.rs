// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch command implementation for safegit.

use anyhow::bail;

use super::Workspace;
use super::console::Console;
use super::operation::run_operation;
use crate::backup::is_backup;
use crate::cli::branch::{BranchArgs, BranchSubcommand, CreateArgs, ListArgs};
use crate::config::types::PolicyConfig;
use crate::error::Result;
use crate::git::backend::{BranchInfo, short_id};
use crate::git::state::RepositoryState;
use crate::operation::{OperationKind, OperationRequest};

/// Main handler for branch command.
///
/// # Errors
///
/// Returns an [`OperationError`](crate::error::OperationError) if the
/// operation did not complete, or any error reading the repository.
pub fn run_branch_command(
    args: &BranchArgs,
    workspace: &Workspace,
    console: &mut dyn Console,
) -> Result<()> {
    match &args.subcommand {
        BranchSubcommand::Create(create) => run_create_command(create, workspace, console),
        BranchSubcommand::List(list) => run_list_command(list, workspace),
    }
}

fn run_create_command(
    args: &CreateArgs,
    workspace: &Workspace,
    console: &mut dyn Console,
) -> Result<()> {
    let request = OperationRequest::builder()
        .kind(OperationKind::CreateBranch)
        .branch(args.name.as_str())
        .maybe_revision(args.base.as_deref())
        .mode(args.mode.unwrap_or(workspace.config.global.default_mode))
        .push(args.push)
        .dry_run(args.dry_run)
        .assume_yes(args.yes)
        .build();

    let summary = run_operation(workspace.context(), console, request)?;
    if !summary.is_dry_run() {
        let name = summary.request.branch();
        if summary.request.switch_existing() {
            console.show(&format!("Switched to existing branch '{name}'"));
        } else {
            console.show(&format!("Created and switched to branch '{name}'"));
        }
    }
    Ok(())
}

fn run_list_command(args: &ListArgs, workspace: &Workspace) -> Result<()> {
    let state = RepositoryState::capture(&workspace.backend)?;
    if let Some(problem) = &state.problem {
        bail!("cannot list branches: {problem}");
    }
    let lines = format_branch_list(&state, &workspace.config.policy, args.all);
    if lines.is_empty() {
        println!("No branches");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// One line per branch: current marker, name, tip, tip date, protection.
///
/// Backup and remote-tracking branches are listed only with `all`.
#[must_use]
pub fn format_branch_list(state: &RepositoryState, policy: &PolicyConfig, all: bool) -> Vec<String> {
    let mut shown: Vec<&BranchInfo> = state
        .local_branches
        .iter()
        .filter(|b| all || !is_backup(&b.name))
        .collect();
    if all {
        shown.extend(state.remote_branches.iter());
    }

    let names: Vec<String> = shown.iter().map(|b| b.display_name()).collect();
    let width = names.iter().map(String::len).max().unwrap_or(0);

    shown
        .iter()
        .zip(names)
        .map(|(branch, name)| {
            let current = !branch.is_remote()
                && state.current_branch.as_deref() == Some(branch.name.as_str());
            let marker = if current { '*' } else { ' ' };
            let protected = if !branch.is_remote() && policy.is_protected(&branch.name) {
                "  [protected]"
            } else {
                ""
            };
            format!(
                "{marker} {name:<width$}  {}  {}{protected}",
                short_id(&branch.tip),
                branch.tip_time.format("%Y-%m-%d")
            )
        })
        .collect()
}
