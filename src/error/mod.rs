// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            SafeGitError (~24 bytes)
//!                     |
//!   +------+------+---+---+------+------+
//!   v      v      v       v      v      v
//! Vcs   Config  Backup  Audit   Io    Other
//! Box    Box     Box     Box    Box  Box<str>
//!
//! Sub-errors:
//!   Vcs     kind: NotARepository | NetworkUnreachable
//!                 PermissionDenied | RefNotFound | Generic
//!   Config  ReadError, ParseError, InvalidValue
//!   Backup  AlreadyExists, Vcs
//!   Audit   Io, Serialize, Corrupt
//!
//! OperationError (exit code taxonomy):
//!   Configuration     -> 1
//!   ValidationBlocked -> 1
//!   ExecutionFailure  -> 2
//!   NetworkFailure    -> 2
//!   Cancelled         -> 130
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`SafeGitError`].
pub type SafeGitResult<T> = std::result::Result<T, SafeGitError>;

/// Result type for VCS adapter calls.
pub type VcsResult<T> = std::result::Result<T, VcsError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum SafeGitError {
    /// VCS call failed.
    #[error("vcs error: {0}")]
    Vcs(#[from] Box<VcsError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Backup creation failed.
    #[error("backup error: {0}")]
    Backup(#[from] Box<BackupError>),

    /// Audit log could not be read or written.
    #[error("audit error: {0}")]
    Audit(#[from] Box<AuditError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for SafeGitError {
                fn from(err: $error) -> Self {
                    SafeGitError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    VcsError => Vcs,
    ConfigError => Config,
    BackupError => Backup,
    AuditError => Audit,
    std::io::Error => Io,
}

// --- VCS Errors ---

/// Classification of a failed VCS call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsErrorKind {
    /// The working directory is not inside a repository.
    NotARepository,
    /// A remote could not be reached.
    NetworkUnreachable,
    /// The filesystem or the remote refused access.
    PermissionDenied,
    /// A branch, tag, or revision does not exist.
    RefNotFound,
    /// Anything else.
    Generic,
}

impl VcsErrorKind {
    /// Classify a VCS diagnostic message.
    #[must_use]
    pub fn classify(stderr: &str) -> Self {
        let lower = stderr.to_ascii_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if any(&["not a git repository", "not a work tree"]) {
            Self::NotARepository
        } else if any(&[
            "could not resolve host",
            "unable to access",
            "connection refused",
            "connection timed out",
            "network is unreachable",
            "could not read from remote repository",
            "operation timed out",
        ]) {
            Self::NetworkUnreachable
        } else if any(&["permission denied", "access denied", "authentication failed"]) {
            Self::PermissionDenied
        } else if any(&[
            "unknown revision",
            "not a valid object name",
            "did not match any",
            "bad revision",
            "invalid reference",
            "couldn't find remote ref",
            "needed a single revision",
            "not a valid ref",
        ]) {
            Self::RefNotFound
        } else {
            Self::Generic
        }
    }

    /// Whether a retry may succeed without user intervention.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::NetworkUnreachable)
    }
}

impl fmt::Display for VcsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotARepository => "not a repository",
            Self::NetworkUnreachable => "network unreachable",
            Self::PermissionDenied => "permission denied",
            Self::RefNotFound => "reference not found",
            Self::Generic => "command failed",
        })
    }
}

/// A failed VCS adapter call.
#[derive(Debug, Clone, Error)]
#[error("{kind}: `{command}`: {message}")]
pub struct VcsError {
    pub kind: VcsErrorKind,
    pub command: String,
    pub message: String,
}

impl VcsError {
    pub fn new(kind: VcsErrorKind, command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            command: command.into(),
            message: message.into(),
        }
    }

    /// Build an error from a command line and its diagnostic output.
    pub fn from_stderr(command: impl Into<String>, stderr: &str) -> Self {
        let message = stderr.trim();
        Self::new(VcsErrorKind::classify(message), command, message)
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Backup Errors ---

/// Backup manager errors.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Every suffixed variant of the backup name is taken.
    #[error("backup reference already exists: {name}")]
    AlreadyExists { name: String },

    /// The VCS refused to create the reference.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

// --- Audit Errors ---

/// Audit log errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Could not open, append to, or read the log file.
    #[error("audit log I/O on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded.
    #[error("failed to encode audit record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A stored line is not a valid record.
    #[error("corrupt audit record at {}:{line}: {message}", .path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

// --- Operation outcome taxonomy ---

/// Why an operation did not complete. Each variant maps to a process exit code.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Bad flags or missing repository. Nothing was attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Validation produced at least one blocking finding.
    #[error("blocked: {}", .findings.join("; "))]
    ValidationBlocked { findings: Vec<String> },

    /// The user declined a confirmation prompt.
    #[error("cancelled by user")]
    Cancelled,

    /// A step failed after validation passed.
    #[error(
        "step '{step}' failed: {source}; repository left at {}",
        .last_known_good.as_deref().unwrap_or("an unknown revision")
    )]
    ExecutionFailure {
        step: String,
        #[source]
        source: VcsError,
        last_known_good: Option<String>,
    },

    /// A push could not reach the remote. Not retried.
    #[error("step '{step}' could not reach the remote: {source}; push manually later")]
    NetworkFailure {
        step: String,
        #[source]
        source: VcsError,
    },
}

impl OperationError {
    /// Process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) | Self::ValidationBlocked { .. } => 1,
            Self::ExecutionFailure { .. } | Self::NetworkFailure { .. } => 2,
            Self::Cancelled => 130,
        }
    }
}

#[cfg(test)]
mod tests;
