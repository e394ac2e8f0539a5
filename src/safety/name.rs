// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Branch name grammar and normalization.
//!
//! ```text
//! allowed    A-Z a-z 0-9 . _ / -     length 1..=255
//! rejected   leading/trailing / - .  "//"  ".."
//!            component starting "."  component ending ".lock"
//!            "HEAD"
//!
//! normalize  "User Auth!"  --> "user-auth"
//!            "用户 auth"    --> "auth"
//!            "用户认证"      --> None (ask the suggester)
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MAX_BRANCH_NAME_LEN: usize = 255;

static NAME_GRAMMAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._/-]+$").expect("branch name regex is valid"));

static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-|\.|/){2,}").expect("separator run regex is valid"));

/// Why a branch name is not acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameIssue {
    #[error("branch name is empty")]
    Empty,

    #[error("branch name is {0} characters long; the limit is {MAX_BRANCH_NAME_LEN}")]
    TooLong(usize),

    #[error("branch name contains invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("branch name must not start or end with '{0}'")]
    EdgeSeparator(char),

    #[error("branch name must not contain '{0}'")]
    Sequence(&'static str),

    #[error("branch name component '{0}' must not start with '.' or end with '.lock'")]
    Component(String),

    #[error("'HEAD' is reserved")]
    Reserved,
}

/// Check `name` against the branch name grammar.
///
/// # Errors
///
/// Returns the first [`NameIssue`] found.
pub fn check_branch_name(name: &str) -> Result<(), NameIssue> {
    if name.is_empty() {
        return Err(NameIssue::Empty);
    }
    if !NAME_GRAMMAR.is_match(name) {
        let bad = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')))
            .unwrap_or('?');
        return Err(NameIssue::InvalidCharacter(bad));
    }
    let len = name.chars().count();
    if len > MAX_BRANCH_NAME_LEN {
        return Err(NameIssue::TooLong(len));
    }
    for edge in ['/', '-', '.'] {
        if name.starts_with(edge) || name.ends_with(edge) {
            return Err(NameIssue::EdgeSeparator(edge));
        }
    }
    for sequence in ["//", ".."] {
        if name.contains(sequence) {
            return Err(NameIssue::Sequence(sequence));
        }
    }
    if let Some(component) = name
        .split('/')
        .find(|c| c.starts_with('.') || c.ends_with(".lock"))
    {
        return Err(NameIssue::Component(component.to_string()));
    }
    if name == "HEAD" {
        return Err(NameIssue::Reserved);
    }
    Ok(())
}

/// Turn arbitrary input into a valid branch name, if any ASCII survives.
///
/// Lowercases, maps whitespace and punctuation to `-`, drops non-ASCII
/// characters, then cleans up separators.
#[must_use]
pub fn normalize_branch_name(raw: &str) -> Option<String> {
    let mapped: String = raw
        .chars()
        .filter_map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-') {
                Some(c)
            } else if c.is_whitespace() || c.is_ascii() {
                Some('-')
            } else {
                None
            }
        })
        .collect();
    let mapped = SEPARATOR_RUNS.replace_all(&mapped, "$1");

    let mut name = mapped
        .split('/')
        .map(|component| {
            let mut component = component.trim_matches(|c| matches!(c, '-' | '.'));
            while let Some(stripped) = component.strip_suffix(".lock") {
                component = stripped.trim_end_matches(|c| matches!(c, '-' | '.'));
            }
            component.to_string()
        })
        .filter(|component| !component.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if name.len() > MAX_BRANCH_NAME_LEN {
        name.truncate(MAX_BRANCH_NAME_LEN);
        name = name
            .trim_end_matches(|c| matches!(c, '-' | '.' | '/'))
            .to_string();
    }

    check_branch_name(&name).is_ok().then_some(name)
}

/// First of `<name>-2`, `<name>-3`, ... for which `taken` is false.
#[must_use]
pub fn suffixed_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    (2_u32..)
        .map(|n| format!("{name}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| format!("{name}-{}", u32::MAX))
}
