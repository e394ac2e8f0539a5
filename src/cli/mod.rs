// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for safegit using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! safegit [global options] <command>
//! branch {create|list}
//! rollback --target BRANCH --to REV
//! audit
//! doctor
//! options
//! configs
//! version
//! ```

pub mod audit;
pub mod branch;
pub mod global;
pub mod rollback;


use crate::cli::audit::AuditArgs;
use crate::cli::branch::BranchArgs;
use crate::cli::global::GlobalOptions;
use crate::cli::rollback::RollbackArgs;
use clap::{Parser, Subcommand};

/// Safe branch creation and rollback for git repositories.
#[derive(Debug, Parser)]
#[command(
    name = "safegit",
    author,
    version,
    about = "Safe Branch & Rollback Tool",
    long_about = "safegit Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Creates branches and rolls them back with validation, backup\n\
                  references, and an append-only audit log.\n\n\
                  See `safegit <command> --help` for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  safegit reads `safegit.toml` from the repository root if it\n\
                  exists. Files given with --config are loaded after it, then\n\
                  SAFEGIT_* environment variables (SAFEGIT_POLICY__RECENT_ACTIVITY_DAYS=7),\n\
                  then --set overrides.\n\n\
                  EXIT CODES:\n\n\
                  0 success, 1 configuration error or blocked by validation,\n\
                  2 execution failure, 130 cancelled by the user."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their effective values.
    Options,

    /// Lists the configuration files that were loaded.
    Configs,

    /// Creates or lists branches.
    Branch(BranchArgs),

    /// Rolls a branch back to an earlier revision.
    Rollback(RollbackArgs),

    /// Shows the audit log.
    Audit(AuditArgs),

    /// Checks that git and the repository are usable.
    Doctor,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Tries to parse command-line arguments from an iterator.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version
/// information was requested.
pub fn try_parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
