//! Evaluation results
//!
//! Serialized as `{"decision":"block","reasons":["..."]}` for the terminal
//! session manager and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision category, ordered from least to most restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Run the command
    Allow,

    /// Run the command, but show the reasons to the user
    Warn,

    /// Refuse to run the command
    Block,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Warn => "warn",
            Decision::Block => "block",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one command against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub decision: Decision,

    /// Human-readable justifications, never empty
    pub reasons: Vec<String>,

    /// Editor id of the block pattern or risk keyword that decided the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl EvaluationResult {
    /// Create an allow result
    pub fn allow(reason: impl Into<String>) -> Self {
        Self::new(Decision::Allow, reason, None)
    }

    /// Create a warn result
    pub fn warn(reason: impl Into<String>, rule_id: Option<String>) -> Self {
        Self::new(Decision::Warn, reason, rule_id)
    }

    /// Create a block result
    pub fn block(reason: impl Into<String>, rule_id: Option<String>) -> Self {
        Self::new(Decision::Block, reason, rule_id)
    }

    fn new(decision: Decision, reason: impl Into<String>, rule_id: Option<String>) -> Self {
        Self {
            decision,
            reasons: vec![reason.into()],
            rule_id,
        }
    }

    pub fn is_allow(&self) -> bool {
        self.decision == Decision::Allow
    }

    pub fn is_warn(&self) -> bool {
        self.decision == Decision::Warn
    }

    pub fn is_block(&self) -> bool {
        self.decision == Decision::Block
    }

    /// The primary reason
    pub fn reason(&self) -> &str {
        self.reasons.first().map(String::as_str).unwrap_or_default()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
