// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! VCS adapter contract and the git CLI implementation.
//!
//! ```text
//! VcsQuery (read)                 VcsMutation (write)
//!   status        list_branches     create_branch  checkout
//!   log           resolve           reset_hard     revert_range
//!   is_ancestor   ref_exists        push
//!   fetch         git_dir
//!          \                 /
//!           v               v
//!              ShellBackend
//!        git CLI, LC_ALL=C, no prompts
//! ```
//!
//! No call retries on its own. Failures carry a [`VcsErrorKind`] so callers
//! can decide whether a retry makes sense.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, trace, warn};

use crate::error::{VcsError, VcsErrorKind, VcsResult};

/// Working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    /// Checked-out branch, `None` when HEAD is detached.
    pub branch: Option<String>,
    /// Full id of HEAD, `None` in a repository without commits.
    pub head: Option<String>,
    /// Porcelain lines of modified, staged, or untracked paths.
    pub changes: Vec<String>,
}

impl StatusInfo {
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// A local or remote-tracking branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    /// Name without the remote prefix (`main`, `feature/x`).
    pub name: String,
    /// Remote the branch belongs to, `None` for local branches.
    pub remote: Option<String>,
    /// Full id of the tip commit.
    pub tip: String,
    /// Committer time of the tip commit.
    pub tip_time: DateTime<Utc>,
}

impl BranchInfo {
    /// `origin/main` for remote branches, `main` for local ones.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.remote {
            Some(remote) => format!("{remote}/{}", self.name),
            None => self.name.clone(),
        }
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote.is_some()
    }
}

/// One entry of `log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub time: DateTime<Utc>,
    pub subject: String,
}

/// Shortened revision id used in names and messages.
#[must_use]
pub fn short_id(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}

// --- Query Trait (Read-only operations) ---

/// Read-only VCS operations.
pub trait VcsQuery {
    /// Root of the working tree the adapter operates on.
    fn workdir(&self) -> &Path;

    /// Current branch, head revision, and changed paths.
    ///
    /// # Errors
    ///
    /// Returns `NotARepository` outside a work tree.
    fn status(&self) -> VcsResult<StatusInfo>;

    /// Local and remote-tracking branches, sorted by display name.
    ///
    /// # Errors
    ///
    /// Returns a `VcsError` if the refs cannot be listed.
    fn list_branches(&self) -> VcsResult<Vec<BranchInfo>>;

    /// Up to `depth` commits reachable from `reference`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RefNotFound` if `reference` does not resolve.
    fn log(&self, reference: &str, depth: usize) -> VcsResult<Vec<CommitInfo>>;

    /// Full commit id of `reference`.
    ///
    /// # Errors
    ///
    /// Returns `RefNotFound` if `reference` does not name a commit.
    fn resolve(&self, reference: &str) -> VcsResult<String>;

    /// Whether `ancestor` is reachable from `descendant`.
    ///
    /// # Errors
    ///
    /// Returns a `VcsError` if either revision is unknown.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> VcsResult<bool>;

    /// Whether a fully qualified ref (`refs/heads/x`) exists.
    ///
    /// # Errors
    ///
    /// Returns a `VcsError` if the ref store cannot be read.
    fn ref_exists(&self, full_ref: &str) -> VcsResult<bool>;

    /// Update remote-tracking branches. Does not touch local branches.
    ///
    /// # Errors
    ///
    /// Returns `NetworkUnreachable` if the remote cannot be reached.
    fn fetch(&self, remote: &str) -> VcsResult<()>;

    /// Absolute path of the repository's git directory.
    ///
    /// # Errors
    ///
    /// Returns `NotARepository` outside a repository.
    fn git_dir(&self) -> VcsResult<PathBuf>;
}

// --- Mutation Trait (Write operations) ---

/// VCS operations that modify repository state.
pub trait VcsMutation {
    /// Create `name` at `base` without checking it out.
    ///
    /// # Errors
    ///
    /// Returns a `VcsError` if the branch exists or `base` is unknown.
    fn create_branch(&self, name: &str, base: &str) -> VcsResult<()>;

    /// Check out a branch or revision. Uncommitted changes are carried over.
    ///
    /// # Errors
    ///
    /// Returns a `VcsError` if checkout would overwrite local changes.
    fn checkout(&self, reference: &str) -> VcsResult<()>;

    /// Move the current branch and working tree to `reference`.
    /// Destructive: discards commits after `reference` and local changes.
    ///
    /// # Errors
    ///
    /// Returns a `VcsError` if `reference` is unknown.
    fn reset_hard(&self, reference: &str) -> VcsResult<()>;

    /// Commit reverts of every first-parent commit in `from..to`, newest
    /// first. Merge commits are reverted against their first parent, which
    /// undoes everything the merge brought in. A failed sequence is aborted
    /// so the branch stays where it was.
    ///
    /// # Errors
    ///
    /// Returns a `VcsError` on conflicts or unknown revisions.
    fn revert_range(&self, from: &str, to: &str) -> VcsResult<()>;

    /// Push `branch` to the adapter's remote.
    ///
    /// # Errors
    ///
    /// Returns `NetworkUnreachable` or `PermissionDenied` from the transport.
    fn push(&self, branch: &str, with_upstream: bool) -> VcsResult<()>;
}

/// Full adapter: everything the operation pipeline needs.
pub trait Vcs: VcsQuery + VcsMutation {}

impl<T: VcsQuery + VcsMutation> Vcs for T {}

// --- ShellBackend Implementation (Git CLI) ---

/// Git CLI backend bound to one working tree and one remote.
#[derive(Debug, Clone)]
pub struct ShellBackend {
    workdir: PathBuf,
    remote: String,
}

impl ShellBackend {
    pub fn new(workdir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            remote: remote.into(),
        }
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Run git and return the raw output, whatever the exit status.
    ///
    /// Sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0` so git never
    /// waits on a credential prompt, and `LC_ALL=C` so diagnostics can be
    /// classified.
    fn run(&self, args: &[&str]) -> VcsResult<Output> {
        let command = format!("git {}", args.join(" "));
        trace!(%command, cwd = %self.workdir.display(), "running git");

        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| {
                let kind = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => VcsErrorKind::PermissionDenied,
                    std::io::ErrorKind::NotFound if !self.workdir.exists() => {
                        VcsErrorKind::NotARepository
                    }
                    _ => VcsErrorKind::Generic,
                };
                VcsError::new(kind, &command, format!("failed to execute git: {e}"))
            })
    }

    /// Run git and return trimmed stdout, or a classified error.
    fn git(&self, args: &[&str]) -> VcsResult<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            let command = format!("git {}", args.join(" "));
            let err = VcsError::from_stderr(command, &String::from_utf8_lossy(&output.stderr));
            debug!(error = %err, "git failed");
            return Err(err);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    fn optional(&self, args: &[&str]) -> VcsResult<Option<String>> {
        let output = self.run(args)?;
        if output.status.success() {
            Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ))
        } else if output.status.code() == Some(1) && output.stderr.is_empty() {
            Ok(None)
        } else {
            Err(VcsError::from_stderr(
                format!("git {}", args.join(" ")),
                &String::from_utf8_lossy(&output.stderr),
            ))
        }
    }
}

fn parse_unix_time(raw: &str) -> DateTime<Utc> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Parse `for-each-ref` lines of `refname<TAB>objectname<TAB>committer-unix-time`.
pub(crate) fn parse_branch_refs(output: &str) -> Vec<BranchInfo> {
    let mut branches: Vec<BranchInfo> = output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let refname = fields.next()?;
            let tip = fields.next()?.to_string();
            let tip_time = parse_unix_time(fields.next().unwrap_or_default());

            if let Some(name) = refname.strip_prefix("refs/heads/") {
                return Some(BranchInfo {
                    name: name.to_string(),
                    remote: None,
                    tip,
                    tip_time,
                });
            }
            let (remote, name) = refname.strip_prefix("refs/remotes/")?.split_once('/')?;
            // origin/HEAD is a symbolic pointer, not a branch
            (name != "HEAD").then(|| BranchInfo {
                name: name.to_string(),
                remote: Some(remote.to_string()),
                tip,
                tip_time,
            })
        })
        .collect();
    branches.sort_by_key(BranchInfo::display_name);
    branches
}

impl VcsQuery for ShellBackend {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn status(&self) -> VcsResult<StatusInfo> {
        let changes = self
            .git(&["status", "--porcelain=v1", "--untracked-files=normal"])?
            .lines()
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        let branch = self
            .optional(&["symbolic-ref", "--short", "-q", "HEAD"])?
            .filter(|b| !b.is_empty());
        let head = self.run(&["rev-parse", "--verify", "-q", "HEAD"])?;
        let head = head
            .status
            .success()
            .then(|| String::from_utf8_lossy(&head.stdout).trim().to_string());

        Ok(StatusInfo {
            branch,
            head,
            changes,
        })
    }

    fn list_branches(&self) -> VcsResult<Vec<BranchInfo>> {
        let output = self.git(&[
            "for-each-ref",
            "--format=%(refname)%09%(objectname)%09%(committerdate:unix)",
            "refs/heads",
            "refs/remotes",
        ])?;
        Ok(parse_branch_refs(&output))
    }

    fn log(&self, reference: &str, depth: usize) -> VcsResult<Vec<CommitInfo>> {
        let depth = depth.to_string();
        let output = self.git(&[
            "log",
            "--format=%H%x09%ct%x09%s",
            "-n",
            &depth,
            reference,
            "--",
        ])?;
        Ok(output
            .lines()
            .filter_map(|line| {
                let mut fields = line.splitn(3, '\t');
                Some(CommitInfo {
                    id: fields.next()?.to_string(),
                    time: parse_unix_time(fields.next()?),
                    subject: fields.next().unwrap_or_default().to_string(),
                })
            })
            .collect())
    }

    fn resolve(&self, reference: &str) -> VcsResult<String> {
        let spec = format!("{reference}^{{commit}}");
        self.git(&["rev-parse", "--verify", "--end-of-options", &spec])
            .map_err(|mut e| {
                if e.kind == VcsErrorKind::Generic {
                    e.kind = VcsErrorKind::RefNotFound;
                }
                e
            })
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> VcsResult<bool> {
        let args = ["merge-base", "--is-ancestor", ancestor, descendant];
        let output = self.run(&args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(VcsError::from_stderr(
                format!("git {}", args.join(" ")),
                &String::from_utf8_lossy(&output.stderr),
            )),
        }
    }

    fn ref_exists(&self, full_ref: &str) -> VcsResult<bool> {
        Ok(self
            .optional(&["show-ref", "--verify", "--quiet", full_ref])?
            .is_some())
    }

    fn fetch(&self, remote: &str) -> VcsResult<()> {
        self.git(&["fetch", "--quiet", "--prune", remote])?;
        Ok(())
    }

    fn git_dir(&self) -> VcsResult<PathBuf> {
        self.git(&["rev-parse", "--absolute-git-dir"])
            .map(PathBuf::from)
    }
}

impl VcsMutation for ShellBackend {
    fn create_branch(&self, name: &str, base: &str) -> VcsResult<()> {
        self.git(&["branch", "--no-track", name, base])?;
        Ok(())
    }

    fn checkout(&self, reference: &str) -> VcsResult<()> {
        self.git(&["-c", "advice.detachedHead=false", "checkout", "-q", reference])?;
        Ok(())
    }

    fn reset_hard(&self, reference: &str) -> VcsResult<()> {
        self.git(&["reset", "--hard", "-q", reference])?;
        Ok(())
    }

    fn revert_range(&self, from: &str, to: &str) -> VcsResult<()> {
        let range = format!("{from}..{to}");
        let listing = self.git(&["rev-list", "--first-parent", "--parents", &range])?;
        let commits: Vec<(&str, bool)> = listing
            .lines()
            .filter_map(|line| {
                let mut ids = line.split_whitespace();
                let id = ids.next()?;
                Some((id, ids.count() > 1))
            })
            .collect();
        if commits.is_empty() {
            debug!(%range, "nothing to revert");
            return Ok(());
        }

        // One sequence, so `--abort` restores the pre-revert head.
        let mut args = vec!["revert", "--no-edit"];
        if commits.iter().any(|&(_, merge)| merge) {
            args.extend(["-m", "1"]);
        }
        args.extend(commits.iter().map(|&(id, _)| id));
        let result = self.git(&args);
        if result.is_err()
            && let Err(abort) = self.git(&["revert", "--abort"])
        {
            warn!(error = %abort, "failed to abort revert sequence");
        }
        result.map(|_| ())
    }

    fn push(&self, branch: &str, with_upstream: bool) -> VcsResult<()> {
        let mut args = vec!["push", "--quiet"];
        if with_upstream {
            args.push("--set-upstream");
        }
        args.extend([self.remote.as_str(), branch]);
        self.git(&args)?;
        Ok(())
    }
}
