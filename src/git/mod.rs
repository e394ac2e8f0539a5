// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! VCS adapter module.
//!
//! ```text
//!   discovery.rs          state.rs            retry.rs
//!  (gix, -C path)    RepositoryState     backoff for reads
//!        |                  |                   |
//!        v                  v                   v
//!      ,-------------------------------------------,
//!      |     backend: VcsQuery + VcsMutation       |
//!      '---------------------+---------------------'
//!                            |
//!                            v
//!                      ShellBackend
//!            status  list_branches  log  resolve
//!            branch  checkout  reset  revert  push
//! ```
//!
//! **discovery** finds the work tree with gix, no subprocess.
//! **`ShellBackend`** runs the git CLI for everything else.

pub mod backend;
pub mod discovery;
pub mod retry;
pub mod state;

#[cfg(test)]
pub(crate) mod test_utils;
