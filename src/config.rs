//! Configuration loading for command-sandbox
//!
//! Supports TOML configuration with embedded defaults. The policy itself is a
//! separate JSON document; this file only says where to find it and how to
//! run.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::policy::Platform;
use crate::rules::DEFAULT_REGEX_SIZE_LIMIT;

/// Environment variable overriding the policy file location
pub const POLICY_ENV: &str = "COMMAND_SANDBOX_POLICY";

/// General configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Path to the policy document
    pub policy_file: Option<String>,

    /// Enable audit logging
    pub audit_log: bool,

    /// Path to audit log file
    pub audit_path: Option<String>,

    /// Platform whose rules apply (defaults to the host)
    pub platform: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            policy_file: Some("~/.config/command-sandbox/policy.json".to_string()),
            audit_log: true,
            audit_path: Some("~/.config/command-sandbox/audit.jsonl".to_string()),
            platform: None,
        }
    }
}

/// Pattern matching limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Maximum compiled size of one pattern, in bytes
    pub regex_size_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub matching: MatchingConfig,
}

impl Config {
    /// Load configuration from the standard locations or use defaults
    pub fn load() -> Self {
        let config_paths = [
            // User-specific config
            dirs::home_dir().map(|p| p.join(".config/command-sandbox/config.toml")),
            // System-wide config
            Some(PathBuf::from("/etc/command-sandbox/config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(error = %e, "using default configuration"),
                }
            }
        }

        Config::default()
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// The policy file path: environment override, then configuration
    pub fn policy_path(&self) -> Option<PathBuf> {
        if let Ok(path) = std::env::var(POLICY_ENV) {
            if !path.is_empty() {
                return Some(Self::expand_path(&path));
            }
        }
        self.general.policy_file.as_ref().map(|p| Self::expand_path(p))
    }

    /// Get the audit log path (expanded)
    pub fn audit_path(&self) -> Option<PathBuf> {
        self.general.audit_path.as_ref().map(|p| Self::expand_path(p))
    }

    /// The platform whose rules apply. An unrecognised override selects no
    /// platform rules at all.
    pub fn platform(&self) -> Option<Platform> {
        match self.general.platform.as_deref() {
            Some(id) => {
                let platform = Platform::from_id(id);
                if platform.is_none() {
                    tracing::warn!(platform = id, "unknown platform; only common rules apply");
                }
                platform
            }
            None => Platform::current(),
        }
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
policy_file = "~/.config/command-sandbox/policy.json"
audit_log = true
audit_path = "~/.config/command-sandbox/audit.jsonl"
# platform = "linux"

[matching]
regex_size_limit = 1048576
"#;
