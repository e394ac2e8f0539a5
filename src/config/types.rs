// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for safegit.
//!
//! ```text
//! [global]  default_mode, remote, log levels, log_file
//! [policy]  protected globs, recent_activity_days, fetch_before_validate
//! [retry]   attempts, base_delay_ms
//! [audit]   path
//! [naming]  suggest_command
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wax::Program as _;

use crate::logging::LogLevel;
use crate::operation::SafetyMode;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Mode used when `--mode` is not given.
    pub default_mode: SafetyMode,
    /// Remote used for push, fetch, and remote-activity checks.
    pub remote: String,
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file. No file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_mode: SafetyMode::Standard,
            remote: "origin".to_string(),
            output_log_level: LogLevel::WARN,
            file_log_level: LogLevel::DEBUG,
            log_file: None,
        }
    }
}

/// Branch protection and rollback strategy policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Glob patterns of protected branch names.
    pub protected: Vec<String>,
    /// Remote tips younger than this many days count as recent activity,
    /// which makes `revert` the default rollback action.
    pub recent_activity_days: u32,
    /// Fetch the remote before validation in every mode, not only
    /// comprehensive.
    pub fetch_before_validate: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            protected: vec![
                "main".to_string(),
                "master".to_string(),
                "production".to_string(),
            ],
            recent_activity_days: 14,
            fetch_before_validate: false,
        }
    }
}

impl PolicyConfig {
    /// Whether `branch` matches any protected pattern.
    ///
    /// Invalid patterns never match; they are rejected at load time.
    #[must_use]
    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected.iter().any(|pattern| {
            pattern == branch
                || wax::Glob::new(pattern).is_ok_and(|glob| glob.is_match(branch))
        })
    }

    #[must_use]
    pub fn recent_activity_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.recent_activity_days))
    }
}

/// Retry policy for read-only network calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 1,
            base_delay_ms: 500,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (0-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1_u64.checked_shl(retry).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Audit log location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Overrides `<git-dir>/safegit/audit.jsonl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Branch name suggestion service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Program called with the raw name; prints one suggestion per line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggest_command: Option<String>,
}
