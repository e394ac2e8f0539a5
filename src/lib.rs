// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |          branch / rollback / audit
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |   operation pipeline      |
//!              |  safety -> plan -> backup |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!               git         audit    config
//!           gix / CLI     JSON lines  TOML layers
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, operation |
//!   +-----------------------------------------+
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod operation;
pub mod plan;
pub mod safety;
