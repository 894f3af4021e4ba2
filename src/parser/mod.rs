//! Policy parser for rule-editing surfaces
//!
//! Flattens the `block` and `riskKeywords` arrays of a policy document into a
//! list of [`ParsedCommand`] records, each addressed by a positional id of the
//! form `<platform>-<block|risk>-<index>`. Ids are only valid for the document
//! they were parsed from; callers re-parse after every edit (see [`edit`]).

pub mod edit;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::EditError;
use crate::policy::RuleScope;

/// The two rule kinds exposed to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Block,
    Risk,
}

impl RuleType {
    /// Name used inside rule ids
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Block => "block",
            RuleType::Risk => "risk",
        }
    }

    /// Name of the array holding this kind of rule in a policy document
    pub fn policy_key(&self) -> &'static str {
        match self {
            RuleType::Block => "block",
            RuleType::Risk => "riskKeywords",
        }
    }
}

/// Positional address of one rule in a policy document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleId {
    pub scope: RuleScope,
    pub kind: RuleType,
    pub index: usize,
}

impl RuleId {
    pub fn new(scope: RuleScope, kind: RuleType, index: usize) -> Self {
        Self { scope, kind, index }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.scope, self.kind.as_str(), self.index)
    }
}

impl FromStr for RuleId {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EditError::MalformedId(s.to_string());

        // Split from the right so platform keys may themselves contain '-'.
        let mut parts = s.rsplitn(3, '-');
        let index = parts.next().ok_or_else(malformed)?;
        let kind = parts.next().ok_or_else(malformed)?;
        let scope = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;

        let kind = match kind {
            "block" => RuleType::Block,
            "risk" => RuleType::Risk,
            _ => return Err(malformed()),
        };
        let index = index.parse::<usize>().map_err(|_| malformed())?;

        Ok(Self::new(RuleScope::from_key(scope), kind, index))
    }
}

/// One rule as shown in the settings UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCommand {
    pub id: String,
    pub command: String,
    pub platform: RuleScope,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
}

/// All editable rules of a policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPolicy {
    pub block_commands: Vec<ParsedCommand>,
    pub risk_commands: Vec<ParsedCommand>,
}

impl ParsedPolicy {
    /// Find a rule by id
    pub fn get(&self, id: &str) -> Option<&ParsedCommand> {
        self.block_commands
            .iter()
            .chain(&self.risk_commands)
            .find(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.block_commands.is_empty() && self.risk_commands.is_empty()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Flatten a policy document into editable rule lists.
///
/// Order: `common` first, then every platform section in document order.
/// Malformed JSON yields two empty lists.
pub fn parse_policy(policy_json: &str) -> ParsedPolicy {
    match serde_json::from_str::<Value>(policy_json) {
        Ok(value) => parse_value(&value),
        Err(e) => {
            if !policy_json.trim().is_empty() {
                tracing::warn!(error = %e, "cannot list rules of malformed policy");
            }
            ParsedPolicy::default()
        }
    }
}

/// Flatten an already-parsed policy document
pub fn parse_value(value: &Value) -> ParsedPolicy {
    ParsedPolicy {
        block_commands: collect(value, RuleType::Block),
        risk_commands: collect(value, RuleType::Risk),
    }
}

fn collect(doc: &Value, kind: RuleType) -> Vec<ParsedCommand> {
    let mut out = Vec::new();

    push_section(&mut out, RuleScope::Common, doc.get("common"), kind);

    if let Some(platforms) = doc.get("platforms").and_then(Value::as_object) {
        for (key, section) in platforms {
            // Its ids would collide with the top-level section's.
            if key == RuleScope::Common.key() {
                tracing::warn!("ignoring \"platforms.common\" section");
                continue;
            }
            push_section(&mut out, RuleScope::Platform(key.clone()), Some(section), kind);
        }
    }

    out
}

fn push_section(
    out: &mut Vec<ParsedCommand>,
    scope: RuleScope,
    section: Option<&Value>,
    kind: RuleType,
) {
    let Some(items) = section
        .and_then(|s| s.get(kind.policy_key()))
        .and_then(Value::as_array)
    else {
        return;
    };

    for (index, item) in items.iter().enumerate() {
        let command = match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push(ParsedCommand {
            id: RuleId::new(scope.clone(), kind, index).to_string(),
            command,
            platform: scope.clone(),
            rule_type: kind,
        });
    }
}
