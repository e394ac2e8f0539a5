// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository discovery.
//!
//! ```text
//! -C path/inside/repo --> gix::discover --> work tree root --> ShellBackend
//! ```
//!
//! Pure gix, no subprocess. Used before any adapter exists.

use std::path::{Path, PathBuf};

use crate::error::{VcsError, VcsErrorKind, VcsResult};

#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    gix::discover(path).is_ok()
}

/// Work tree root of the repository containing `path`.
///
/// # Errors
///
/// Returns `NotARepository` if no repository is found or it is bare.
pub fn discover_workdir(path: &Path) -> VcsResult<PathBuf> {
    let command = format!("discover {}", path.display());
    let repo = gix::discover(path)
        .map_err(|e| VcsError::new(VcsErrorKind::NotARepository, &command, e.to_string()))?;
    repo.workdir().map(Path::to_path_buf).ok_or_else(|| {
        VcsError::new(
            VcsErrorKind::NotARepository,
            command,
            "bare repository has no working tree",
        )
    })
}

/// Current branch name, `None` if HEAD is detached.
///
/// # Errors
///
/// Returns a `VcsError` if discovery or head resolution fails.
pub fn current_branch(path: &Path) -> VcsResult<Option<String>> {
    let command = format!("head {}", path.display());
    let repo = gix::discover(path)
        .map_err(|e| VcsError::new(VcsErrorKind::NotARepository, &command, e.to_string()))?;
    let head = repo
        .head_name()
        .map_err(|e| VcsError::new(VcsErrorKind::Generic, command, e.to_string()))?;
    Ok(head.map(|name| name.shorten().to_string()))
}
