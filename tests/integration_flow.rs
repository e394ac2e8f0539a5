// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for complete operations.
//!
//! Drives create and rollback through validation, planning, backup,
//! execution, and audit against real temporary repositories.

use std::path::Path;
use std::process::Command;

use regex::Regex;
use safegit::audit::{AuditFilter, Outcome};
use safegit::cmd::Workspace;
use safegit::cmd::console::ScriptedConsole;
use safegit::cmd::operation::{OperationSummary, run_operation};
use safegit::config::Config;
use safegit::error::OperationError;
use safegit::git::backend::VcsQuery;
use safegit::git::state::RepositoryState;
use safegit::operation::{OperationKind, OperationRequest, RollbackAction, SafetyMode};
use safegit::safety::{Check, Severity, Validator};
use tempfile::TempDir;

fn git(args: &[&str], cwd: &Path) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("LC_ALL", "C")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

struct Fixture {
    temp: TempDir,
    workspace: Workspace,
}

impl Fixture {
    /// Repository on `main` with `commits` commits, one file per commit.
    fn new(commits: usize) -> Self {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let path = temp.path();
        git(&["init", "-b", "main"], path);
        git(&["config", "user.email", "test@example.com"], path);
        git(&["config", "user.name", "Test"], path);
        git(&["config", "commit.gpgsign", "false"], path);
        for n in 1..=commits {
            std::fs::write(path.join(format!("file{n}.txt")), format!("v{n}\n")).unwrap();
            git(&["add", "."], path);
            git(&["commit", "-m", &format!("commit {n}")], path);
        }
        let mut config = Config::default();
        config.retry.base_delay_ms = 0;
        let workspace = Workspace::open(path, config).unwrap();
        Self { temp, workspace }
    }

    fn path(&self) -> &Path {
        self.temp.path()
    }

    fn git(&self, args: &[&str]) -> String {
        git(args, self.path())
    }

    fn run(
        &self,
        console: &mut ScriptedConsole,
        request: OperationRequest,
    ) -> Result<OperationSummary, OperationError> {
        run_operation(self.workspace.context(), console, request)
    }

    /// Everything a dry run must leave untouched.
    fn snapshot(&self) -> (String, String, String) {
        (
            self.git(&["for-each-ref", "--format=%(refname) %(objectname)"]),
            self.git(&["status", "--porcelain"]),
            self.git(&["rev-parse", "HEAD"]),
        )
    }
}

fn create(name: &str) -> OperationRequest {
    OperationRequest::builder()
        .kind(OperationKind::CreateBranch)
        .branch(name)
        .revision("main")
        .build()
}

#[test]
fn scenario_a_create_branch_from_main() {
    let fixture = Fixture::new(5);
    let mut console = ScriptedConsole::new(["y"]);

    fixture.run(&mut console, create("feature/x")).unwrap();

    assert_eq!(
        fixture.git(&["rev-parse", "feature/x"]),
        fixture.git(&["rev-parse", "main"])
    );
    assert_eq!(fixture.git(&["branch", "--show-current"]), "feature/x");
    let backups = fixture.git(&["branch", "--list", "backup/*"]);
    assert!(backups.is_empty());
}

#[test]
fn scenario_b_declined_dirty_tree_leaves_repository_unchanged() {
    let fixture = Fixture::new(3);
    std::fs::write(fixture.path().join("file1.txt"), "local edit\n").unwrap();
    let before = fixture.snapshot();
    let mut console = ScriptedConsole::new(["n"]);

    let err = fixture.run(&mut console, create("feature/x")).unwrap_err();

    assert_eq!(err.exit_code(), 130);
    assert_eq!(fixture.snapshot(), before);
    let records = fixture.workspace.audit.query(&AuditFilter::default()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcome, Outcome::Aborted);
}

#[test]
fn scenario_c_comprehensive_reset_with_backup() {
    let fixture = Fixture::new(5);
    let head = fixture.git(&["rev-parse", "main"]);
    let older = fixture.git(&["rev-parse", "HEAD~3"]);
    let mut console = ScriptedConsole::new(["main", "y"]);
    let request = OperationRequest::builder()
        .kind(OperationKind::Rollback)
        .branch("main")
        .revision(older.as_str())
        .action(RollbackAction::Reset)
        .mode(SafetyMode::Comprehensive)
        .build();

    let summary = fixture.run(&mut console, request).unwrap();

    let backup = summary.backup.expect("backup created");
    let pattern = Regex::new(&format!(r"^backup/main-\d{{8}}T\d{{6}}Z-{}$", &head[..7])).unwrap();
    assert!(pattern.is_match(&backup.name), "{}", backup.name);
    assert_eq!(fixture.git(&["rev-parse", &backup.name]), head);
    assert_eq!(fixture.git(&["rev-parse", "main"]), older);
    assert!(!fixture.path().join("file5.txt").exists());

    let record = &fixture.workspace.audit.query(&AuditFilter::default()).unwrap()[0];
    assert_eq!(record.outcome, Outcome::Success);
    assert_eq!(record.backup_ref.as_deref(), Some(backup.name.as_str()));
    assert_eq!(record.steps.len(), 2);
    assert!(record.steps[1].starts_with("git reset --hard"));
    assert!(!record.detail.is_empty());
}

#[test]
fn scenario_d_non_ascii_name_waits_for_valid_ascii_name() {
    let fixture = Fixture::new(2);
    let before = fixture.snapshot();

    let mut console = ScriptedConsole::default();
    let err = fixture.run(&mut console, create("用户认证")).unwrap_err();
    assert!(matches!(err, OperationError::Cancelled));
    assert_eq!(fixture.snapshot(), before);

    let mut console = ScriptedConsole::new(["user auth", "user-auth", "y"]);
    let summary = fixture.run(&mut console, create("用户认证")).unwrap();
    assert_eq!(summary.request.branch(), "user-auth");
    assert_eq!(console.questions().len(), 3);
    assert_eq!(fixture.git(&["branch", "--show-current"]), "user-auth");
}

#[test]
fn dry_run_never_changes_repository() {
    let fixture = Fixture::new(4);
    let older = fixture.git(&["rev-parse", "HEAD~2"]);
    let before = fixture.snapshot();

    let requests = [
        OperationRequest::builder()
            .kind(OperationKind::CreateBranch)
            .branch("feature/x")
            .dry_run(true)
            .build(),
        OperationRequest::builder()
            .kind(OperationKind::Rollback)
            .branch("main")
            .revision(older.as_str())
            .action(RollbackAction::Reset)
            .dry_run(true)
            .build(),
        OperationRequest::builder()
            .kind(OperationKind::Rollback)
            .branch("main")
            .revision(older.as_str())
            .action(RollbackAction::Revert)
            .mode(SafetyMode::Comprehensive)
            .dry_run(true)
            .build(),
    ];
    for request in requests {
        let mut console = ScriptedConsole::default();
        let summary = fixture.run(&mut console, request).unwrap();
        assert!(summary.is_dry_run());
        assert!(!summary.plan.steps.is_empty());
        assert_eq!(fixture.snapshot(), before);
    }
    assert!(!fixture.workspace.audit.path().exists());
}

#[test]
fn second_create_reports_collision_instead_of_overwriting() {
    let fixture = Fixture::new(3);
    let mut console = ScriptedConsole::new(["y"]);
    fixture.run(&mut console, create("feature/x")).unwrap();
    fixture.git(&["checkout", "main"]);
    fixture.git(&["commit", "--allow-empty", "-m", "later"]);
    let first_tip = fixture.git(&["rev-parse", "feature/x"]);

    let state = RepositoryState::capture(&fixture.workspace.backend).unwrap();
    let report = Validator::new(&fixture.workspace.backend, &fixture.workspace.config.policy)
        .validate(&create("feature/x"), &state);
    let collision = report.find(Check::Collision).expect("collision finding");
    assert_eq!(collision.severity, Severity::Warning);
    assert_eq!(collision.suggestion.as_deref(), Some("feature/x-2"));

    let mut console = ScriptedConsole::new(["1"]);
    fixture.run(&mut console, create("feature/x")).unwrap();
    assert_eq!(fixture.git(&["rev-parse", "feature/x"]), first_tip);
    assert_eq!(fixture.git(&["branch", "--show-current"]), "feature/x");
}

#[test]
fn revert_rollback_preserves_history() {
    let fixture = Fixture::new(4);
    let older = fixture.git(&["rev-parse", "HEAD~2"]);
    let head = fixture.git(&["rev-parse", "HEAD"]);
    let mut console = ScriptedConsole::default();
    let request = OperationRequest::builder()
        .kind(OperationKind::Rollback)
        .branch("main")
        .revision(older.as_str())
        .action(RollbackAction::Revert)
        .assume_yes(true)
        .build();

    let summary = fixture.run(&mut console, request).unwrap();

    assert!(summary.backup.is_some());
    assert_eq!(
        fixture.git(&["rev-list", "--count", "HEAD"]),
        "6",
        "two revert commits on top of four"
    );
    assert!(fixture.workspace.backend.is_ancestor(&head, "HEAD").unwrap());
    assert!(!fixture.path().join("file3.txt").exists());
    assert!(!fixture.path().join("file4.txt").exists());
    assert!(fixture.path().join("file2.txt").exists());
}

#[test]
fn rollback_of_other_branch_checks_it_out_first() {
    let fixture = Fixture::new(2);
    fixture.git(&["checkout", "-b", "feature/y"]);
    let base = fixture.git(&["rev-parse", "HEAD"]);
    fixture.git(&["commit", "--allow-empty", "-m", "wip"]);
    fixture.git(&["checkout", "main"]);

    let mut console = ScriptedConsole::default();
    let request = OperationRequest::builder()
        .kind(OperationKind::Rollback)
        .branch("feature/y")
        .revision(base.as_str())
        .assume_yes(true)
        .build();
    let summary = fixture.run(&mut console, request).unwrap();

    assert_eq!(summary.plan.steps[0].action.name(), "checkout");
    assert_eq!(fixture.git(&["rev-parse", "feature/y"]), base);
    assert_eq!(fixture.git(&["branch", "--show-current"]), "feature/y");
}

#[test]
fn revert_rollback_across_merge_restores_content() {
    let fixture = Fixture::new(2);
    let older = fixture.git(&["rev-parse", "HEAD"]);
    fixture.git(&["checkout", "-q", "-b", "topic"]);
    std::fs::write(fixture.path().join("topic.txt"), "topic\n").unwrap();
    fixture.git(&["add", "."]);
    fixture.git(&["commit", "-q", "-m", "topic work"]);
    fixture.git(&["checkout", "-q", "main"]);
    fixture.git(&["merge", "-q", "--no-ff", "-m", "merge topic", "topic"]);

    let mut console = ScriptedConsole::default();
    let request = OperationRequest::builder()
        .kind(OperationKind::Rollback)
        .branch("main")
        .revision(older.as_str())
        .action(RollbackAction::Revert)
        .assume_yes(true)
        .build();
    fixture.run(&mut console, request).unwrap();

    assert!(!fixture.path().join("topic.txt").exists());
    assert_eq!(fixture.git(&["diff", &older, "HEAD", "--stat"]), "");
    let record = &fixture.workspace.audit.query(&AuditFilter::default()).unwrap()[0];
    assert_eq!(record.outcome, Outcome::Success);
}
