// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup references taken before destructive steps.
//!
//! ```text
//! backup/<branch>-<YYYYMMDDTHHMMSSZ>-<short-rev>
//! backup/main-20260301T101500Z-1a2b3c4
//! backup/main-20260301T101500Z-1a2b3c4-2      same second, second backup
//! ```
//!
//! A backup is a plain branch. It is never moved or overwritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BackupError;
use crate::git::backend::{Vcs, short_id};

pub const BACKUP_PREFIX: &str = "backup/";

/// Suffixes tried after the plain name is taken.
const MAX_SUFFIX: u32 = 99;

/// A snapshot of a branch tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRef {
    /// Branch name of the backup, `backup/...`.
    pub name: String,
    /// Branch that was backed up.
    pub branch: String,
    /// Revision the backup points at.
    pub revision: String,
    pub created_at: DateTime<Utc>,
}

/// Deterministic backup name for `branch` at `revision` taken at `at`.
#[must_use]
pub fn backup_name(branch: &str, at: DateTime<Utc>, revision: &str) -> String {
    format!(
        "{BACKUP_PREFIX}{branch}-{}-{}",
        at.format("%Y%m%dT%H%M%SZ"),
        short_id(revision)
    )
}

#[must_use]
pub fn is_backup(branch: &str) -> bool {
    branch.starts_with(BACKUP_PREFIX)
}

pub struct BackupManager<'a> {
    vcs: &'a dyn Vcs,
}

impl<'a> BackupManager<'a> {
    #[must_use]
    pub fn new(vcs: &'a dyn Vcs) -> Self {
        Self { vcs }
    }

    /// Create a backup of `branch` pointing at `revision`, timestamped now.
    ///
    /// # Errors
    ///
    /// See [`create_backup_at`](Self::create_backup_at).
    pub fn create_backup(&self, branch: &str, revision: &str) -> Result<BackupRef, BackupError> {
        self.create_backup_at(branch, revision, Utc::now())
    }

    /// Create a backup with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::AlreadyExists`] when the name and every suffix
    /// up to `-99` are taken, or [`BackupError::Vcs`] if the ref cannot be
    /// created.
    pub fn create_backup_at(
        &self,
        branch: &str,
        revision: &str,
        at: DateTime<Utc>,
    ) -> Result<BackupRef, BackupError> {
        let base = backup_name(branch, at, revision);
        let name = self.free_name(&base)?;

        self.vcs.create_branch(&name, revision)?;
        info!(backup = %name, branch, revision = short_id(revision), "created backup");

        Ok(BackupRef {
            name,
            branch: branch.to_string(),
            revision: revision.to_string(),
            created_at: at,
        })
    }

    fn free_name(&self, base: &str) -> Result<String, BackupError> {
        let candidates =
            std::iter::once(base.to_string()).chain((2..=MAX_SUFFIX).map(|n| format!("{base}-{n}")));
        for candidate in candidates {
            if !self.vcs.ref_exists(&format!("refs/heads/{candidate}"))? {
                return Ok(candidate);
            }
        }
        Err(BackupError::AlreadyExists {
            name: base.to_string(),
        })
    }
}
