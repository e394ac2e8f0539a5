// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot of the repository taken at the start of an operation.
//!
//! Captured once per invocation and passed by value to the validator and
//! planner. Nothing here is cached or shared.

use std::path::PathBuf;

use tracing::debug;

use super::backend::{BranchInfo, VcsQuery};
use crate::error::{VcsError, VcsErrorKind, VcsResult};

#[derive(Debug, Clone, Default)]
pub struct RepositoryState {
    pub workdir: PathBuf,
    /// Checked-out branch, `None` when detached or unavailable.
    pub current_branch: Option<String>,
    pub head: Option<String>,
    pub changes: Vec<String>,
    pub local_branches: Vec<BranchInfo>,
    pub remote_branches: Vec<BranchInfo>,
    /// Why the repository could not be read, if it could not.
    pub problem: Option<VcsError>,
}

impl RepositoryState {
    /// Read status and branch lists through `vcs`.
    ///
    /// A missing or unreadable repository is not an error here: it yields a
    /// state with [`problem`](Self::problem) set so the validator can report it.
    ///
    /// # Errors
    ///
    /// Returns any other `VcsError` from the adapter.
    pub fn capture(vcs: &dyn VcsQuery) -> VcsResult<Self> {
        let workdir = vcs.workdir().to_path_buf();
        let status = match vcs.status() {
            Ok(status) => status,
            Err(e)
                if matches!(
                    e.kind,
                    VcsErrorKind::NotARepository | VcsErrorKind::PermissionDenied
                ) =>
            {
                debug!(error = %e, "repository unavailable");
                return Ok(Self {
                    workdir,
                    problem: Some(e),
                    ..Self::default()
                });
            }
            Err(e) => return Err(e),
        };

        let (remote_branches, local_branches) = vcs
            .list_branches()?
            .into_iter()
            .partition(BranchInfo::is_remote);

        let state = Self {
            workdir,
            current_branch: status.branch,
            head: status.head,
            changes: status.changes,
            local_branches,
            remote_branches,
            problem: None,
        };
        debug!(
            branch = state.current_branch.as_deref().unwrap_or("(detached)"),
            dirty = state.is_dirty(),
            local = state.local_branches.len(),
            remote = state.remote_branches.len(),
            "captured repository state"
        );
        Ok(state)
    }

    #[must_use]
    pub const fn is_accessible(&self) -> bool {
        self.problem.is_none()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    #[must_use]
    pub fn local_branch(&self, name: &str) -> Option<&BranchInfo> {
        self.local_branches.iter().find(|b| b.name == name)
    }

    #[must_use]
    pub fn remote_branch(&self, remote: &str, name: &str) -> Option<&BranchInfo> {
        self.remote_branches
            .iter()
            .find(|b| b.name == name && b.remote.as_deref() == Some(remote))
    }

    /// Whether `name` exists locally or on any remote.
    #[must_use]
    pub fn has_branch(&self, name: &str) -> bool {
        self.local_branches
            .iter()
            .chain(&self.remote_branches)
            .any(|b| b.name == name)
    }
}
