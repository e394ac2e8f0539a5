// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> discover repo --> Config layers --> Logging --> Command Dispatch
//!   Branch | Rollback | Audit | Doctor | Options | Configs | Version
//!
//! exit: 0 ok, 1 config/blocked, 2 execution, 130 cancelled
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use safegit::cli::global::GlobalOptions;
use safegit::cli::{self, Command};
use safegit::cmd::Workspace;
use safegit::cmd::audit::run_audit_command;
use safegit::cmd::branch::run_branch_command;
use safegit::cmd::config::{run_configs_command, run_options_command};
use safegit::cmd::console::TerminalConsole;
use safegit::cmd::doctor::run_doctor_command;
use safegit::cmd::rollback::run_rollback_command;
use safegit::config::loader::ConfigLoader;
use safegit::config::{Config, REPO_CONFIG_FILE};
use safegit::error::{OperationError, Result};
use safegit::git::discovery::discover_workdir;
use safegit::logging::init_logging;
use safegit::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();
    let start_dir = cli.global.start_dir();
    let workdir = discover_workdir(&start_dir).ok();

    let (config, config_files) = match build_config_loader(&cli.global, workdir.as_deref()) {
        Ok(loader) => {
            let files = loader.format_loaded_files();
            (loader.build(), files)
        }
        Err(e) => (Err(e), Vec::new()),
    };

    let log_config = build_log_config(&cli.global, config.as_ref().ok());
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch_command(&cli, config, workdir, &start_dir, &config_files) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<OperationError>()
                .map_or(1, OperationError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn build_log_config(global: &GlobalOptions, config: Option<&Config>) -> LogConfig {
    let Some(config) = config else {
        let console_level = global
            .log_level
            .and_then(LogLevel::from_u8)
            .unwrap_or(LogLevel::WARN);
        return LogConfig::builder()
            .with_console_level(console_level)
            .build();
    };

    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .build()
}

fn dispatch_command(
    cli: &cli::Cli,
    config: Config,
    workdir: Option<PathBuf>,
    start_dir: &Path,
    config_files: &[String],
) -> Result<ExitCode> {
    match &cli.command {
        Some(Command::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Some(Command::Options) => run_options_command(&config),
        Some(Command::Configs) => run_configs_command(config_files),
        Some(Command::Doctor) => {
            let healthy = run_doctor_command(start_dir, &config);
            return Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Some(Command::Branch(args)) => {
            let workspace = open_workspace(workdir, start_dir, config)?;
            run_branch_command(args, &workspace, &mut TerminalConsole)?;
        }
        Some(Command::Rollback(args)) => {
            let workspace = open_workspace(workdir, start_dir, config)?;
            run_rollback_command(args, &workspace, &mut TerminalConsole)?;
        }
        Some(Command::Audit(args)) => {
            let workspace = open_workspace(workdir, start_dir, config)?;
            run_audit_command(args, &workspace.audit)?;
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            return Err(anyhow::anyhow!("No command specified"));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn open_workspace(workdir: Option<PathBuf>, start_dir: &Path, config: Config) -> Result<Workspace> {
    let Some(workdir) = workdir else {
        return Err(OperationError::Configuration(format!(
            "{} is not inside a git work tree; run inside a repository or pass -C <dir>",
            start_dir.display()
        ))
        .into());
    };
    Workspace::open(workdir, config)
        .map_err(|e| OperationError::Configuration(format!("{e:#}")).into())
}

fn build_config_loader(global: &GlobalOptions, workdir: Option<&Path>) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if let Some(workdir) = workdir {
        loader = loader.add_toml_file_optional(workdir.join(REPO_CONFIG_FILE));
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix("SAFEGIT");
    for assignment in global.to_config_overrides() {
        loader = loader.set_assignment(&assignment)?;
    }
    Ok(loader)
}
