//! Check requests sent by the terminal session manager
//!
//! The CLI reads one JSON request from stdin:
//! `{"command": "rm -rf build", "session_id": "abc"}`.

use serde::Deserialize;

/// A request to classify one command
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    /// The shell command about to be executed
    pub command: String,

    /// Optional terminal session identifier, recorded in the audit log
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,

    /// Optional working directory of the terminal, recorded in the audit log
    #[serde(default)]
    pub cwd: Option<String>,
}

impl CheckRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            session_id: None,
            cwd: None,
        }
    }

    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Truncate on a character boundary, marking the cut with "..."
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
