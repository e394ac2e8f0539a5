// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities: real temporary repositories and an in-memory VCS.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use super::backend::{BranchInfo, CommitInfo, ShellBackend, StatusInfo, VcsMutation, VcsQuery};
use crate::error::{VcsError, VcsErrorKind, VcsResult};

// --- Real repositories ---

/// A temporary git repository on `main` with a committer identity.
pub(crate) struct TestRepo {
    dir: TempDir,
    _origin: Option<TempDir>,
}

impl TestRepo {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let repo = Self { dir, _origin: None };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    /// Repository with a bare `origin` remote.
    pub(crate) fn with_origin() -> Self {
        let mut repo = Self::new();
        let origin = tempfile::tempdir().expect("failed to create origin dir");
        run_git(&["init", "-q", "--bare", "-b", "main"], origin.path());
        let url = origin.path().display().to_string();
        repo.git(&["remote", "add", "origin", &url]);
        repo._origin = Some(origin);
        repo
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn backend(&self) -> ShellBackend {
        ShellBackend::new(self.path(), "origin")
    }

    /// Run git in the repository, panicking on failure.
    pub(crate) fn git(&self, args: &[&str]) -> String {
        run_git(args, self.path())
    }

    /// Write `file` and commit it, returning the new commit id.
    pub(crate) fn commit(&self, file: &str, content: &str, message: &str) -> String {
        std::fs::write(self.path().join(file), content).expect("failed to write file");
        self.git(&["add", file]);
        self.git(&["commit", "-q", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Commit `count` files named `file<N>.txt`, returning their ids oldest first.
    pub(crate) fn commits(&self, count: usize) -> Vec<String> {
        (1..=count)
            .map(|n| self.commit(&format!("file{n}.txt"), &format!("v{n}"), &format!("commit {n}")))
            .collect()
    }

    pub(crate) fn read(&self, file: &str) -> Option<String> {
        std::fs::read_to_string(self.path().join(file)).ok()
    }
}

fn run_git(args: &[&str], cwd: &Path) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("LC_ALL", "C")
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

// --- In-memory VCS ---

/// Generate a distinct 40-character revision id.
pub(crate) fn mock_id(n: u32) -> String {
    let mut id = format!("{n:x}").repeat(40);
    id.truncate(40);
    id
}

#[derive(Debug, Default)]
struct MockState {
    accessible: bool,
    /// Linear history; a commit's ancestors are the ones before it.
    history: Vec<String>,
    next_id: u32,
    current: Option<String>,
    detached: Option<String>,
    local: BTreeMap<String, String>,
    remote: BTreeMap<(String, String), (String, DateTime<Utc>)>,
    changes: Vec<String>,
    failures: BTreeMap<&'static str, VcsErrorKind>,
    transient_fetch_failures: u32,
    calls: Vec<String>,
}

/// In-memory VCS with a linear history `c1..cN` on `main`.
#[derive(Debug)]
pub(crate) struct MockVcs {
    workdir: PathBuf,
    state: RefCell<MockState>,
}

impl MockVcs {
    /// `main` with `commits` commits, checked out and clean.
    pub(crate) fn new(commits: u32) -> Self {
        let history: Vec<String> = (1..=commits).map(mock_id).collect();
        let mut local = BTreeMap::new();
        if let Some(tip) = history.last() {
            local.insert("main".to_string(), tip.clone());
        }
        Self {
            workdir: PathBuf::from("/mock/repo"),
            state: RefCell::new(MockState {
                accessible: true,
                next_id: commits + 1,
                history,
                current: Some("main".to_string()),
                local,
                ..MockState::default()
            }),
        }
    }

    pub(crate) fn not_a_repository() -> Self {
        let vcs = Self::new(0);
        vcs.state.borrow_mut().accessible = false;
        vcs
    }

    pub(crate) fn with_branch(self, name: &str, tip: &str) -> Self {
        self.state
            .borrow_mut()
            .local
            .insert(name.to_string(), tip.to_string());
        self
    }

    pub(crate) fn with_remote_branch(self, name: &str, tip: &str, age: Duration) -> Self {
        self.state.borrow_mut().remote.insert(
            ("origin".to_string(), name.to_string()),
            (tip.to_string(), Utc::now() - age),
        );
        self
    }

    pub(crate) fn with_changes(self, paths: &[&str]) -> Self {
        self.state.borrow_mut().changes = paths.iter().map(|p| format!(" M {p}")).collect();
        self
    }

    pub(crate) fn on_branch(self, name: &str) -> Self {
        self.state.borrow_mut().current = Some(name.to_string());
        self
    }

    /// Make every call to `op` fail with `kind`.
    pub(crate) fn failing(self, op: &'static str, kind: VcsErrorKind) -> Self {
        self.state.borrow_mut().failures.insert(op, kind);
        self
    }

    /// Fail the next `count` fetches as unreachable, then succeed.
    pub(crate) fn with_flaky_fetch(self, count: u32) -> Self {
        self.state.borrow_mut().transient_fetch_failures = count;
        self
    }

    pub(crate) fn tip(&self, branch: &str) -> Option<String> {
        self.state.borrow().local.get(branch).cloned()
    }

    pub(crate) fn current_branch(&self) -> Option<String> {
        self.state.borrow().current.clone()
    }

    pub(crate) fn local_branches(&self) -> Vec<String> {
        self.state.borrow().local.keys().cloned().collect()
    }

    /// Every adapter call made so far, in order, as `op args`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Mutating calls only.
    pub(crate) fn mutations(&self) -> Vec<String> {
        const MUTATING: [&str; 5] = ["create_branch", "checkout", "reset_hard", "revert_range", "push"];
        self.calls()
            .into_iter()
            .filter(|c| MUTATING.iter().any(|m| c.starts_with(m)))
            .collect()
    }

    fn enter(&self, op: &'static str, args: &[&str]) -> VcsResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("{op} {}", args.join(" ")).trim_end().to_string());
        if !state.accessible {
            return Err(VcsError::new(
                VcsErrorKind::NotARepository,
                op,
                "fatal: not a git repository",
            ));
        }
        match state.failures.get(op) {
            Some(kind) => Err(VcsError::new(*kind, op, format!("injected {op} failure"))),
            None => Ok(()),
        }
    }

    fn lookup(state: &MockState, reference: &str) -> Option<String> {
        if reference == "HEAD" {
            return state
                .current
                .as_ref()
                .and_then(|b| state.local.get(b).cloned())
                .or_else(|| state.detached.clone());
        }
        if let Some(tip) = state.local.get(reference) {
            return Some(tip.clone());
        }
        if let Some((remote, name)) = reference.split_once('/')
            && let Some((tip, _)) = state.remote.get(&(remote.to_string(), name.to_string()))
        {
            return Some(tip.clone());
        }
        state
            .history
            .iter()
            .find(|id| id.starts_with(reference) && reference.len() >= 4)
            .cloned()
    }

    fn position(state: &MockState, id: &str) -> Option<usize> {
        state.history.iter().position(|c| c == id)
    }

    fn missing(op: &str, reference: &str) -> VcsError {
        VcsError::new(
            VcsErrorKind::RefNotFound,
            op,
            format!("unknown revision '{reference}'"),
        )
    }

    fn move_current(state: &mut MockState, tip: String) {
        match state.current.clone() {
            Some(branch) => {
                state.local.insert(branch, tip);
            }
            None => state.detached = Some(tip),
        }
    }
}

impl VcsQuery for MockVcs {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn status(&self) -> VcsResult<StatusInfo> {
        self.enter("status", &[])?;
        let state = self.state.borrow();
        Ok(StatusInfo {
            branch: state.current.clone(),
            head: Self::lookup(&state, "HEAD"),
            changes: state.changes.clone(),
        })
    }

    fn list_branches(&self) -> VcsResult<Vec<BranchInfo>> {
        self.enter("list_branches", &[])?;
        let state = self.state.borrow();
        let time_of = |_: &str| Utc::now();
        let mut branches: Vec<BranchInfo> = state
            .local
            .iter()
            .map(|(name, tip)| BranchInfo {
                name: name.clone(),
                remote: None,
                tip: tip.clone(),
                tip_time: time_of(tip),
            })
            .chain(state.remote.iter().map(|((remote, name), (tip, time))| BranchInfo {
                name: name.clone(),
                remote: Some(remote.clone()),
                tip: tip.clone(),
                tip_time: *time,
            }))
            .collect();
        branches.sort_by_key(BranchInfo::display_name);
        Ok(branches)
    }

    fn log(&self, reference: &str, depth: usize) -> VcsResult<Vec<CommitInfo>> {
        self.enter("log", &[reference])?;
        let state = self.state.borrow();
        let tip = Self::lookup(&state, reference).ok_or_else(|| Self::missing("log", reference))?;
        let end = Self::position(&state, &tip).map_or(0, |p| p + 1);
        Ok(state.history[..end]
            .iter()
            .rev()
            .take(depth)
            .map(|id| CommitInfo {
                id: id.clone(),
                time: Utc::now(),
                subject: format!("commit {}", &id[..7]),
            })
            .collect())
    }

    fn resolve(&self, reference: &str) -> VcsResult<String> {
        self.enter("resolve", &[reference])?;
        let state = self.state.borrow();
        Self::lookup(&state, reference).ok_or_else(|| Self::missing("resolve", reference))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> VcsResult<bool> {
        self.enter("is_ancestor", &[ancestor, descendant])?;
        let state = self.state.borrow();
        let a = Self::lookup(&state, ancestor)
            .and_then(|id| Self::position(&state, &id))
            .ok_or_else(|| Self::missing("is_ancestor", ancestor))?;
        let d = Self::lookup(&state, descendant)
            .and_then(|id| Self::position(&state, &id))
            .ok_or_else(|| Self::missing("is_ancestor", descendant))?;
        Ok(a <= d)
    }

    fn ref_exists(&self, full_ref: &str) -> VcsResult<bool> {
        self.enter("ref_exists", &[full_ref])?;
        let state = self.state.borrow();
        Ok(full_ref
            .strip_prefix("refs/heads/")
            .is_some_and(|name| state.local.contains_key(name)))
    }

    fn fetch(&self, remote: &str) -> VcsResult<()> {
        self.enter("fetch", &[remote])?;
        let mut state = self.state.borrow_mut();
        if state.transient_fetch_failures > 0 {
            state.transient_fetch_failures -= 1;
            return Err(VcsError::new(
                VcsErrorKind::NetworkUnreachable,
                "fetch",
                "Could not resolve host",
            ));
        }
        Ok(())
    }

    fn git_dir(&self) -> VcsResult<PathBuf> {
        self.enter("git_dir", &[])?;
        Ok(self.workdir.join(".git"))
    }
}

impl VcsMutation for MockVcs {
    fn create_branch(&self, name: &str, base: &str) -> VcsResult<()> {
        self.enter("create_branch", &[name, base])?;
        let mut state = self.state.borrow_mut();
        if state.local.contains_key(name) {
            return Err(VcsError::new(
                VcsErrorKind::Generic,
                "create_branch",
                format!("a branch named '{name}' already exists"),
            ));
        }
        let tip = Self::lookup(&state, base).ok_or_else(|| Self::missing("create_branch", base))?;
        state.local.insert(name.to_string(), tip);
        Ok(())
    }

    fn checkout(&self, reference: &str) -> VcsResult<()> {
        self.enter("checkout", &[reference])?;
        let mut state = self.state.borrow_mut();
        if state.local.contains_key(reference) {
            state.current = Some(reference.to_string());
            state.detached = None;
            return Ok(());
        }
        let tracked = state
            .remote
            .iter()
            .find(|((_, name), _)| name == reference)
            .map(|(_, (tip, _))| tip.clone());
        if let Some(tip) = tracked {
            state.local.insert(reference.to_string(), tip);
            state.current = Some(reference.to_string());
            return Ok(());
        }
        let id = Self::lookup(&state, reference).ok_or_else(|| Self::missing("checkout", reference))?;
        state.current = None;
        state.detached = Some(id);
        Ok(())
    }

    fn reset_hard(&self, reference: &str) -> VcsResult<()> {
        self.enter("reset_hard", &[reference])?;
        let mut state = self.state.borrow_mut();
        let id = Self::lookup(&state, reference).ok_or_else(|| Self::missing("reset_hard", reference))?;
        Self::move_current(&mut state, id);
        state.changes.clear();
        Ok(())
    }

    fn revert_range(&self, from: &str, to: &str) -> VcsResult<()> {
        self.enter("revert_range", &[from, to])?;
        let mut state = self.state.borrow_mut();
        let start = Self::lookup(&state, from)
            .and_then(|id| Self::position(&state, &id))
            .ok_or_else(|| Self::missing("revert_range", from))?;
        let end = Self::lookup(&state, to)
            .and_then(|id| Self::position(&state, &id))
            .ok_or_else(|| Self::missing("revert_range", to))?;
        for _ in start..end {
            let id = mock_id(state.next_id);
            state.next_id += 1;
            state.history.push(id.clone());
            Self::move_current(&mut state, id);
        }
        Ok(())
    }

    fn push(&self, branch: &str, with_upstream: bool) -> VcsResult<()> {
        let flag = if with_upstream { "--set-upstream" } else { "" };
        self.enter("push", &[branch, flag])?;
        let mut state = self.state.borrow_mut();
        let tip = Self::lookup(&state, branch).ok_or_else(|| Self::missing("push", branch))?;
        state
            .remote
            .insert(("origin".to_string(), branch.to_string()), (tip, Utc::now()));
        Ok(())
    }
}
