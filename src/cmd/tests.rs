// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::{Duration, TimeZone, Utc};

use super::Workspace;
use super::audit::{cutoff, format_record, run_audit_command};
use super::branch::format_branch_list;
use super::console::{Console, ScriptedConsole};
use super::doctor::{diagnose, is_healthy};
use crate::audit::{AuditLog, AuditRecord, Outcome};
use crate::cli::audit::AuditArgs;
use crate::config::Config;
use crate::config::types::PolicyConfig;
use crate::git::backend::BranchInfo;
use crate::git::state::RepositoryState;
use crate::git::test_utils::TestRepo;
use crate::operation::{OperationKind, OperationRequest, RollbackAction, SafetyMode};

fn branch(name: &str, remote: Option<&str>, tip: char) -> BranchInfo {
    BranchInfo {
        name: name.to_string(),
        remote: remote.map(String::from),
        tip: tip.to_string().repeat(40),
        tip_time: Utc.with_ymd_and_hms(2026, 3, 1, 10, 15, 0).unwrap(),
    }
}

fn listed_state() -> RepositoryState {
    RepositoryState {
        current_branch: Some("feature/x".to_string()),
        local_branches: vec![
            branch("backup/main-20260301T101500Z-aaaaaaa", None, 'a'),
            branch("feature/x", None, 'b'),
            branch("main", None, 'a'),
        ],
        remote_branches: vec![branch("main", Some("origin"), 'a')],
        ..RepositoryState::default()
    }
}

// --- console ---

#[test]
fn test_scripted_choose() {
    let options = vec!["switch".to_string(), "suffix".to_string()];
    let mut console = ScriptedConsole::new(["2", "0", "x"]);
    assert_eq!(console.choose("Pick", &options).unwrap(), Some(1));
    assert_eq!(console.choose("Pick", &options).unwrap(), None);
    assert_eq!(console.choose("Pick", &options).unwrap(), None);
    assert_eq!(console.choose("Pick", &options).unwrap(), None);
    assert_eq!(console.questions(), vec!["Choice"; 4]);
}

#[test]
fn test_scripted_confirm() {
    let mut console = ScriptedConsole::new(["Y", "yes", "no"]);
    assert!(console.confirm("a").unwrap());
    assert!(console.confirm("b").unwrap());
    assert!(!console.confirm("c").unwrap());
    assert!(!console.confirm("closed input").unwrap());
}

// --- branch list ---

#[test]
fn test_branch_list_hides_backups_and_remotes() {
    let lines = format_branch_list(&listed_state(), &PolicyConfig::default(), false);
    insta::assert_snapshot!(lines.join("\n"), @r"
    * feature/x  bbbbbbb  2026-03-01
      main       aaaaaaa  2026-03-01  [protected]
    ");
}

#[test]
fn test_branch_list_all() {
    let lines = format_branch_list(&listed_state(), &PolicyConfig::default(), true);
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("  backup/main-20260301T101500Z-aaaaaaa"));
    assert!(lines[3].starts_with("  origin/main"));
    assert!(!lines[3].contains("[protected]"));
}

// --- audit ---

#[test]
fn test_audit_cutoff() {
    let now = Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap();
    assert_eq!(
        cutoff(now, 7),
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(cutoff(now, 0), Some(now));
    assert_eq!(cutoff(now, u32::MAX), None);
}

#[test]
fn test_audit_command_with_huge_day_window_keeps_everything() {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    let log = AuditLog::new(temp.path().join("audit.jsonl"));
    let request = OperationRequest::builder()
        .kind(OperationKind::CreateBranch)
        .branch("feature/x")
        .build();
    let mut record = AuditRecord::new(&request);
    record.timestamp = Utc::now() - Duration::days(400);
    log.record(&record).unwrap();

    let args = AuditArgs {
        operation: None,
        outcome: None,
        days: Some(u32::MAX),
        limit: None,
        json: true,
    };
    assert!(run_audit_command(&args, &log).is_ok());
}

#[test]
fn test_format_record() {
    let request = OperationRequest::builder()
        .kind(OperationKind::Rollback)
        .branch("main")
        .revision("2222222")
        .mode(SafetyMode::Comprehensive)
        .build();
    let mut record = AuditRecord::new(&request);
    record.timestamp = Utc.with_ymd_and_hms(2026, 3, 1, 10, 15, 0).unwrap();
    record.outcome = Outcome::Success;
    record.strategy = Some(RollbackAction::Reset);
    record.backup_ref = Some("backup/main-20260301T101500Z-5555555".to_string());
    record.steps = vec![
        "git branch --no-track backup/main-20260301T101500Z-5555555 5555555".to_string(),
        "git reset --hard 2222222".to_string(),
    ];

    insta::assert_snapshot!(format_record(&record).join("\n"), @r"
    2026-03-01 10:15:00  success  rollback      comprehensive main
        strategy: reset
        backup:   backup/main-20260301T101500Z-5555555
        $ git branch --no-track backup/main-20260301T101500Z-5555555 5555555
        $ git reset --hard 2222222
    ");
}

// --- doctor ---

#[test]
fn test_doctor_in_repository() {
    let repo = TestRepo::new();
    repo.commits(1);

    let checks = diagnose(repo.path(), &Config::default());

    assert!(is_healthy(&checks), "{checks:#?}");
    let names: Vec<_> = checks.iter().map(|c| c.name).collect();
    assert_eq!(
        names,
        vec!["git", "git version", "repository", "current branch", "audit log"]
    );
    assert!(checks[1].detail.starts_with("git version"));
    assert_eq!(checks[3].detail, "main");
    assert!(checks[4].detail.contains("audit.jsonl (not created yet)"));
}

#[test]
fn test_doctor_outside_repository() {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    let checks = diagnose(temp.path(), &Config::default());

    assert!(!is_healthy(&checks));
    let repository = checks.iter().find(|c| c.name == "repository").unwrap();
    assert!(repository.line().starts_with("[FAIL] repository"));
    assert!(repository.detail.contains("not inside a git work tree"));
}

#[test]
fn test_doctor_in_bare_repository() {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    let status = std::process::Command::new("git")
        .args(["init", "-q", "--bare"])
        .current_dir(temp.path())
        .status()
        .expect("failed to run git");
    assert!(status.success());

    let checks = diagnose(temp.path(), &Config::default());

    assert!(!is_healthy(&checks));
    let repository = checks.iter().find(|c| c.name == "repository").unwrap();
    assert!(repository.detail.ends_with("is a bare repository; run inside a work tree"));
}

// --- workspace ---

#[test]
fn test_workspace_audit_path() {
    let repo = TestRepo::new();
    repo.commits(1);

    let workspace = Workspace::open(repo.path(), Config::default()).unwrap();
    assert!(workspace.audit.path().ends_with(".git/safegit/audit.jsonl"));

    let mut config = Config::default();
    config.audit.path = Some(repo.path().join("custom.jsonl"));
    let workspace = Workspace::open(repo.path(), config).unwrap();
    assert_eq!(workspace.audit.path(), repo.path().join("custom.jsonl"));
}

#[test]
fn test_workspace_outside_repository() {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    assert!(Workspace::open(temp.path(), Config::default()).is_err());
}
