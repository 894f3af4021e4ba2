//! Error types for command-sandbox
//!
//! Evaluation itself never fails. These errors surface only from the explicit
//! loading, editing and configuration APIs.

use std::path::PathBuf;

/// Error while reading a policy document
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("policy is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("policy document must be a JSON object")]
    NotAnObject,

    #[error("policy is missing a numeric \"version\" field")]
    MissingVersion,
}

/// Error while applying an id-addressed edit to a policy document
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("malformed rule id '{0}' (expected <platform>-<block|risk>-<index>)")]
    MalformedId(String),

    #[error("rule '{0}' no longer exists; re-read the policy and retry")]
    StaleId(String),
}

/// Error while loading configuration or policy files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl EditError {
    /// Whether re-parsing the policy and retrying could fix this error
    pub fn is_stale(&self) -> bool {
        matches!(self, EditError::StaleId(_))
    }
}

/// Error while applying an edit through a policy store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("failed to write policy: {0}")]
    Io(#[from] std::io::Error),
}
