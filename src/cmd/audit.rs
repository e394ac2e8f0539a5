// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Audit command implementation for safegit.

use chrono::{DateTime, Duration, Utc};

use crate::audit::{AuditFilter, AuditLog, AuditRecord};
use crate::cli::audit::AuditArgs;
use crate::error::Result;

/// Main handler for audit command.
///
/// # Errors
///
/// Returns an error if the log cannot be read or holds a corrupt record.
pub fn run_audit_command(args: &AuditArgs, log: &AuditLog) -> Result<()> {
    let filter = AuditFilter {
        operation: args.operation,
        outcome: args.outcome,
        since: args.days.and_then(|days| cutoff(Utc::now(), days)),
        limit: args.limit,
    };
    let records = log.query(&filter)?;

    if args.json {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
        return Ok(());
    }

    if records.is_empty() {
        println!("No audit records in {}", log.path().display());
        return Ok(());
    }
    for record in &records {
        for line in format_record(record) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Start of the last `days` days, `None` when it predates the calendar.
#[must_use]
pub fn cutoff(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|span| now.checked_sub_signed(span))
}

/// Human-readable lines for one record.
#[must_use]
pub fn format_record(record: &AuditRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  {:<8} {:<13} {:<13} {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.outcome.to_string(),
        record.operation.to_string(),
        record.mode.to_string(),
        record.target
    )];
    if let Some(strategy) = record.strategy {
        lines.push(format!("    strategy: {strategy}"));
    }
    if let Some(backup) = &record.backup_ref {
        lines.push(format!("    backup:   {backup}"));
    }
    for step in &record.steps {
        lines.push(format!("    $ {step}"));
    }
    if let Some(error) = &record.error {
        lines.push(format!("    error:    {error}"));
    }
    lines
}
