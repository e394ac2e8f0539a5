// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch command arguments.
//!
//! ```text
//! branch create --name NAME [--base REV] [--mode M] [--push] [--dry-run] [--yes]
//! branch list [--all]
//! ```

use clap::{Args, Subcommand};

use crate::operation::SafetyMode;

/// Arguments for the `branch` command.
#[derive(Debug, Clone, Args)]
pub struct BranchArgs {
    #[command(subcommand)]
    pub subcommand: BranchSubcommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BranchSubcommand {
    /// Creates a branch and switches to it.
    Create(CreateArgs),

    /// Lists branches with their tips.
    List(ListArgs),
}

/// Arguments for `branch create`.
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Name of the new branch. Non-ASCII input gets a suggested name.
    #[arg(short = 'n', long)]
    pub name: String,

    /// Branch or revision to start from (default: current branch).
    #[arg(short = 'b', long, value_name = "REV")]
    pub base: Option<String>,

    /// Safety mode (default: global.default_mode).
    #[arg(short = 'm', long, value_enum)]
    pub mode: Option<SafetyMode>,

    /// Pushes the new branch and sets its upstream.
    #[arg(long)]
    pub push: bool,

    /// Validates and prints the plan without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Answers yes to every confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for `branch list`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Includes remote-tracking and backup branches.
    #[arg(short = 'a', long)]
    pub all: bool,
}
