// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for safegit.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. safegit.toml (repository root, optional)
//! 3. --config FILE (repeatable, required)
//! 4. SAFEGIT_* env vars
//! 5. --set section.key=value
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! SAFEGIT_GLOBAL__REMOTE=upstream          → global.remote = "upstream"
//! SAFEGIT_POLICY__RECENT_ACTIVITY_DAYS=3   → policy.recent_activity_days = 3
//! ```

pub mod loader;
pub mod types;


use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{AuditConfig, GlobalConfig, NamingConfig, PolicyConfig, RetryConfig};

/// File name looked up at the repository root.
pub const REPO_CONFIG_FILE: &str = "safegit.toml";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub policy: PolicyConfig,
    pub retry: RetryConfig,
    pub audit: AuditConfig,
    pub naming: NamingConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use safegit::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("safegit.toml")
    ///     .with_env_prefix("SAFEGIT")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Check values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` for an unparsable protected
    /// pattern or an empty remote name.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for pattern in &self.policy.protected {
            wax::Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
                section: "policy".to_string(),
                key: "protected".to_string(),
                message: format!("invalid pattern '{pattern}': {e}"),
            })?;
        }
        if self.global.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "global".to_string(),
                key: "remote".to_string(),
                message: "remote name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Format configuration options for display, sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let fmt_path = |p: Option<&Path>| p.map_or_else(String::new, |p| p.display().to_string());

        let mut options = BTreeMap::new();
        options.insert("global.default_mode", self.global.default_mode.to_string());
        options.insert("global.remote", self.global.remote.clone());
        options.insert(
            "global.output_log_level",
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level",
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert("global.log_file", fmt_path(self.global.log_file.as_deref()));
        options.insert("policy.protected", self.policy.protected.join(", "));
        options.insert(
            "policy.recent_activity_days",
            self.policy.recent_activity_days.to_string(),
        );
        options.insert(
            "policy.fetch_before_validate",
            self.policy.fetch_before_validate.to_string(),
        );
        options.insert("retry.attempts", self.retry.attempts.to_string());
        options.insert("retry.base_delay_ms", self.retry.base_delay_ms.to_string());
        options.insert("audit.path", fmt_path(self.audit.path.as_deref()));
        options.insert(
            "naming.suggest_command",
            self.naming.suggest_command.clone().unwrap_or_default(),
        );

        let max_key_len = options.keys().map(|k| k.len()).max().unwrap_or(0);
        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}
