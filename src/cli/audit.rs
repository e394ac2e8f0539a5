// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Audit command arguments.

use clap::Args;

use crate::audit::Outcome;
use crate::operation::OperationKind;

/// Arguments for the `audit` command.
#[derive(Debug, Clone, Args)]
pub struct AuditArgs {
    /// Only records of this operation.
    #[arg(short = 'o', long, value_enum)]
    pub operation: Option<OperationKind>,

    /// Only records with this outcome.
    #[arg(long, value_enum)]
    pub outcome: Option<Outcome>,

    /// Only records from the last N days.
    #[arg(long, value_name = "N")]
    pub days: Option<u32>,

    /// Shows the newest N records.
    #[arg(short = 'n', long, value_name = "N")]
    pub limit: Option<usize>,

    /// Prints one JSON record per line.
    #[arg(long)]
    pub json: bool,
}
