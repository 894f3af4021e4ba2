//! JSONL audit logging for command-sandbox
//!
//! Records every decision to a JSONL file. Commands are truncated and values
//! that look like credentials are redacted before they are written.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::input::{truncate, CheckRequest};
use crate::output::{Decision, EvaluationResult};
use crate::policy::Platform;

/// Secret-looking values masked in logged commands
static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(api[_-]?key|secret[_-]?key|access[_-]?token)\s*[=:]\s*['\x22]?[a-zA-Z0-9_\-]{16,}",
        r"AKIA[0-9A-Z]{16}",
        r"gh[pousr]_[A-Za-z0-9_]{36,}",
        r"github_pat_[A-Za-z0-9_]{22,}",
        r"(?i)(password|passwd|pwd)\s*[=:]\s*('[^']*'|\x22[^\x22]*\x22|\S+)",
        r"(?i)bearer\s+[a-z0-9._\-]{16,}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Mask credential-looking substrings
pub fn redact_secrets(text: &str) -> String {
    let mut redacted = text.to_string();
    for pattern in SECRET_PATTERNS.iter() {
        redacted = pattern.replace_all(&redacted, "[REDACTED]").into_owned();
    }
    redacted
}

/// An audit log entry
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub decision: Decision,

    /// Id of the deciding rule, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Redacted, truncated command
    pub command: String,

    pub reasons: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

impl AuditEntry {
    /// Create a new audit entry from a request and its result
    pub fn new(
        request: &CheckRequest,
        result: &EvaluationResult,
        platform: Option<Platform>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            decision: result.decision,
            rule_id: result.rule_id.clone(),
            // Redact before cutting so a secret on the boundary is still recognised
            command: truncate(&redact_secrets(&request.command), 200),
            reasons: result.reasons.clone(),
            platform: platform.map(|p| p.id()),
            session_id: request.session_id.clone(),
            cwd: request.cwd.clone(),
        }
    }
}

/// Audit logger
#[derive(Default)]
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
}

impl AuditLogger {
    /// Create a logger appending to `path`; `None` or an unopenable path
    /// yields a disabled logger
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            match OpenOptions::new().create(true).append(true).open(p) {
                Ok(file) => Some(BufWriter::new(file)),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "audit log disabled");
                    None
                }
            }
        });

        Self { writer }
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Log a decision
    pub fn log_decision(
        &mut self,
        request: &CheckRequest,
        result: &EvaluationResult,
        platform: Option<Platform>,
    ) -> Result<(), std::io::Error> {
        let entry = AuditEntry::new(request, result, platform);
        self.log(&entry)
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}
