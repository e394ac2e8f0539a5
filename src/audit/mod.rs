// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Append-only audit log.
//!
//! ```text
//! <git-dir>/safegit/audit.jsonl      one JSON record per line
//!
//! AuditEntry::start ---> push_step / set_backup / add_detail
//!        |
//!        +--> finish(outcome) --> record() --> appended, fsynced
//!        +--> discard()       --> nothing written (dry run)
//!        +--> drop            --> appended as `failed`, "interrupted"
//! ```
//!
//! Records are never rewritten or deleted. Rotation is left to the user.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backup::BackupRef;
use crate::error::AuditError;
use crate::operation::{OperationKind, OperationRequest, RollbackAction, SafetyMode};

pub const AUDIT_FILE: &str = "audit.jsonl";

const INTERRUPTED: &str = "operation interrupted before completion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Aborted,
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        })
    }
}

/// One operation, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the operation started.
    pub timestamp: DateTime<Utc>,
    pub operation: OperationKind,
    pub mode: SafetyMode,
    pub outcome: Outcome,
    /// Branch created or rolled back.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<RollbackAction>,
    /// VCS commands actually issued, in order.
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_ref: Option<String>,
    /// Findings and state notes, recorded in comprehensive mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl AuditRecord {
    #[must_use]
    pub fn new(request: &OperationRequest) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: request.kind(),
            mode: request.mode(),
            outcome: Outcome::Failed,
            target: request.branch().to_string(),
            revision: request.revision().map(String::from),
            strategy: None,
            steps: Vec::new(),
            backup_ref: None,
            detail: Vec::new(),
            error: None,
            finished_at: None,
        }
    }
}

/// Which records `query` returns.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub operation: Option<OperationKind>,
    pub outcome: Option<Outcome>,
    pub since: Option<DateTime<Utc>>,
    /// Keep only the newest `limit` matches.
    pub limit: Option<usize>,
}

impl AuditFilter {
    fn matches(&self, record: &AuditRecord) -> bool {
        self.operation.is_none_or(|op| record.operation == op)
            && self.outcome.is_none_or(|o| record.outcome == o)
            && self.since.is_none_or(|t| record.timestamp >= t)
    }
}

/// The audit log file of one repository.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `configured` if set, else `<git_dir>/safegit/audit.jsonl`.
    #[must_use]
    pub fn for_repo(git_dir: &Path, configured: Option<&Path>) -> Self {
        match configured {
            Some(path) => Self::new(path),
            None => Self::new(git_dir.join("safegit").join(AUDIT_FILE)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AuditError {
        AuditError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append `record` as one line and flush it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.io_error(e))?;
        file.sync_data().map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), outcome = %record.outcome, "audit record written");
        Ok(())
    }

    /// Records matching `filter`, oldest first.
    ///
    /// A missing log is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a record.
    pub fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AuditError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord =
                serde_json::from_str(line).map_err(|e| AuditError::Corrupt {
                    path: self.path.clone(),
                    line: index + 1,
                    message: e.to_string(),
                })?;
            if filter.matches(&record) {
                records.push(record);
            }
        }

        if let Some(limit) = filter.limit {
            let skip = records.len().saturating_sub(limit);
            records.drain(..skip);
        }
        Ok(records)
    }
}

/// An operation's record while the operation runs.
///
/// Dropping an unfinished entry persists it as `failed`.
pub struct AuditEntry<'a> {
    log: &'a AuditLog,
    record: Option<AuditRecord>,
}

impl<'a> AuditEntry<'a> {
    #[must_use]
    pub fn start(log: &'a AuditLog, request: &OperationRequest) -> Self {
        Self {
            log,
            record: Some(AuditRecord::new(request)),
        }
    }

    fn with_record(&mut self, f: impl FnOnce(&mut AuditRecord)) {
        if let Some(record) = self.record.as_mut() {
            f(record);
        }
    }

    pub fn push_step(&mut self, command: impl Into<String>) {
        let command = command.into();
        self.with_record(|r| r.steps.push(command));
    }

    pub fn set_backup(&mut self, backup: &BackupRef) {
        self.with_record(|r| r.backup_ref = Some(backup.name.clone()));
    }

    pub fn set_strategy(&mut self, action: RollbackAction) {
        self.with_record(|r| r.strategy = Some(action));
    }

    pub fn set_target(&mut self, target: impl Into<String>) {
        let target = target.into();
        self.with_record(|r| r.target = target);
    }

    pub fn add_detail(&mut self, detail: impl Into<String>) {
        let detail = detail.into();
        self.with_record(|r| r.detail.push(detail));
    }

    /// Persist the record with its final outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn finish(
        mut self,
        outcome: Outcome,
        error: Option<String>,
    ) -> Result<AuditRecord, AuditError> {
        let Some(mut record) = self.record.take() else {
            return Err(AuditError::Io {
                path: self.log.path.clone(),
                source: std::io::Error::other("audit entry already finalized"),
            });
        };
        record.outcome = outcome;
        record.error = error;
        record.finished_at = Some(Utc::now());
        self.log.record(&record)?;
        Ok(record)
    }

    /// Drop the entry without writing anything.
    pub fn discard(mut self) {
        self.record = None;
    }
}

impl Drop for AuditEntry<'_> {
    fn drop(&mut self) {
        if let Some(mut record) = self.record.take() {
            record.outcome = Outcome::Failed;
            record.error = Some(INTERRUPTED.to_string());
            record.finished_at = Some(Utc::now());
            if let Err(e) = self.log.record(&record) {
                warn!(error = %e, "failed to persist interrupted audit record");
            }
        }
    }
}
