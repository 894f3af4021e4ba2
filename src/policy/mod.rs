//! Security policy model
//!
//! A policy is a JSON document with a numeric `version`, an optional `common`
//! rule set and optional per-platform rule sets:
//!
//! ```json
//! {
//!   "version": 1,
//!   "common": { "block": ["rm\\s+-rf\\s+/"], "riskKeywords": ["password"] },
//!   "platforms": { "win32": { "block": ["format\\s+[a-z]:"] } }
//! }
//! ```
//!
//! Reading is lenient: sections of the wrong JSON type are treated as absent,
//! and scalar entries inside rule arrays keep their position (so rule indices
//! stay aligned with the raw document). Only a missing or non-numeric
//! `version` invalidates the whole document.

mod platform;

pub use platform::Platform;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::PolicyError;

/// Rules for one scope (global or a single platform)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Advisory allow patterns (regular expressions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,

    /// Deny patterns (regular expressions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<Vec<String>>,

    /// Literal substrings that produce a warning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_keywords: Option<Vec<String>>,

    /// Free text, never evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The root policy document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityPolicy {
    pub version: Number,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub common: Option<RuleSet>,

    /// Platform overrides in document order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<IndexMap<String, RuleSet>>,
}

/// Where a rule lives: the shared `common` section or one platform section
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleScope {
    Common,
    Platform(String),
}

impl RuleScope {
    pub fn from_key(key: &str) -> Self {
        if key == "common" {
            RuleScope::Common
        } else {
            RuleScope::Platform(key.to_string())
        }
    }

    pub fn key(&self) -> &str {
        match self {
            RuleScope::Common => "common",
            RuleScope::Platform(id) => id,
        }
    }
}

impl std::fmt::Display for RuleScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for RuleScope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.key())
    }
}

impl RuleSet {
    /// Read a rule set from a JSON value. Non-objects yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            allow: obj.get("allow").and_then(string_list),
            block: obj.get("block").and_then(string_list),
            risk_keywords: obj.get("riskKeywords").and_then(string_list),
            notes: obj.get("notes").and_then(|v| v.as_str()).map(String::from),
        })
    }

    pub fn allow(&self) -> &[String] {
        self.allow.as_deref().unwrap_or_default()
    }

    pub fn block(&self) -> &[String] {
        self.block.as_deref().unwrap_or_default()
    }

    pub fn risk_keywords(&self) -> &[String] {
        self.risk_keywords.as_deref().unwrap_or_default()
    }
}

/// Read a rule array. Strings are kept as-is; other scalars and nested values
/// are kept as their JSON text so indices never shift.
fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

impl SecurityPolicy {
    /// An empty policy: valid, but with no rules at all
    pub fn empty() -> Self {
        Self {
            version: Number::from(1),
            common: None,
            platforms: None,
        }
    }

    /// The policy shipped with the crate
    pub fn default_policy() -> Self {
        match Self::from_json(crate::rules::defaults::DEFAULT_POLICY_JSON) {
            Ok(policy) => policy,
            Err(e) => {
                tracing::error!(error = %e, "embedded default policy is invalid");
                Self::empty()
            }
        }
    }

    /// Parse a policy document, reporting why it was rejected
    pub fn from_json(text: &str) -> Result<Self, PolicyError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Read a policy from an already-parsed JSON document
    pub fn from_value(value: &Value) -> Result<Self, PolicyError> {
        let obj = value.as_object().ok_or(PolicyError::NotAnObject)?;
        Self::from_object(obj)
    }

    fn from_object(obj: &Map<String, Value>) -> Result<Self, PolicyError> {
        let version = match obj.get("version") {
            Some(Value::Number(n)) => n.clone(),
            _ => return Err(PolicyError::MissingVersion),
        };

        let common = obj.get("common").and_then(RuleSet::from_value);

        let platforms = obj.get("platforms").and_then(|v| v.as_object()).map(|map| {
            map.iter()
                .filter_map(|(key, value)| RuleSet::from_value(value).map(|rs| (key.clone(), rs)))
                .collect::<IndexMap<_, _>>()
        });

        Ok(Self {
            version,
            common,
            platforms,
        })
    }

    /// Parse stored policy text, treating anything invalid as "no policy".
    ///
    /// This is the fail-open path: a corrupted document disables protection
    /// rather than blocking every command.
    pub fn load(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        match Self::from_json(text) {
            Ok(policy) => Some(policy),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "ignoring invalid security policy; all commands will be allowed"
                );
                None
            }
        }
    }

    /// The rule set for one platform, if the policy has one
    pub fn platform_rules(&self, platform: Platform) -> Option<&RuleSet> {
        self.platforms.as_ref()?.get(platform.id())
    }

    /// Serialize as the pretty-printed document format used on disk
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de> Deserialize<'de> for SecurityPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value).unwrap_or_default())
    }
}
