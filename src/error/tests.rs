// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{
    ConfigError, OperationError, SafeGitError, SafeGitResult, VcsError, VcsErrorKind,
};

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidValue {
        section: "global".to_string(),
        key: "default_mode".to_string(),
        message: "unknown mode 'fast'".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'default_mode' in section '[global]': unknown mode 'fast'"
    );
}

#[test]
fn test_safegit_error_size() {
    let size = std::mem::size_of::<SafeGitError>();
    assert!(size <= 24, "SafeGitError is {size} bytes, expected <= 24");
}

#[test]
fn test_safegit_result_size() {
    let size = std::mem::size_of::<SafeGitResult<()>>();
    assert!(size <= 24, "SafeGitResult<()> is {size} bytes, expected <= 24");
}

#[test]
fn test_classify_vcs_diagnostics() {
    let cases = [
        (
            "fatal: not a git repository (or any of the parent directories): .git",
            VcsErrorKind::NotARepository,
        ),
        (
            "fatal: unable to access 'https://example.invalid/r.git/': Could not resolve host",
            VcsErrorKind::NetworkUnreachable,
        ),
        (
            "error: could not lock config file .git/config: Permission denied",
            VcsErrorKind::PermissionDenied,
        ),
        (
            "fatal: ambiguous argument 'nope': unknown revision or path not in the working tree.",
            VcsErrorKind::RefNotFound,
        ),
        ("fatal: Needed a single revision", VcsErrorKind::RefNotFound),
        ("error: something else entirely", VcsErrorKind::Generic),
    ];

    for (stderr, expected) in cases {
        assert_eq!(VcsErrorKind::classify(stderr), expected, "{stderr}");
    }
}

#[test]
fn test_only_network_errors_are_transient() {
    assert!(VcsErrorKind::NetworkUnreachable.is_transient());
    assert!(!VcsErrorKind::RefNotFound.is_transient());
    assert!(!VcsErrorKind::Generic.is_transient());
}

#[test]
fn test_operation_exit_codes() {
    let vcs = VcsError::new(VcsErrorKind::Generic, "git reset --hard abc", "boom");
    let codes = [
        OperationError::Configuration("bad flag".into()).exit_code(),
        OperationError::ValidationBlocked { findings: vec![] }.exit_code(),
        OperationError::ExecutionFailure {
            step: "reset".into(),
            source: vcs.clone(),
            last_known_good: None,
        }
        .exit_code(),
        OperationError::NetworkFailure {
            step: "push".into(),
            source: vcs,
        }
        .exit_code(),
        OperationError::Cancelled.exit_code(),
    ];
    assert_eq!(codes, [1, 1, 2, 2, 130]);
}

#[test]
fn test_execution_failure_names_last_known_good() {
    let err = OperationError::ExecutionFailure {
        step: "revert".into(),
        source: VcsError::new(VcsErrorKind::Generic, "git revert", "conflict"),
        last_known_good: Some("1a2b3c4".into()),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"step 'revert' failed: command failed: `git revert`: conflict; repository left at 1a2b3c4"
    );
}
