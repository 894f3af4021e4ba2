//! Id-addressed editing of policy documents
//!
//! Parses the source, mutates one array slot, serializes back as pretty JSON.
//! Unknown fields and key order survive the round trip. Ids are positional,
//! so removing a rule shifts the ids of every later rule in the same array;
//! re-parse with [`super::parse_policy`] after each edit.

use serde_json::{Map, Value};

use super::{RuleId, RuleType};
use crate::error::{EditError, PolicyError};
use crate::policy::RuleScope;

/// Replace the text of the rule at `id`. Returns the modified source.
pub fn update_rule(source: &str, id: &str, text: &str) -> Result<String, EditError> {
    let rule_id: RuleId = id.parse()?;
    let mut doc = parse_document(source)?;

    let slot = rule_array_mut(&mut doc, &rule_id)
        .and_then(|items| items.get_mut(rule_id.index))
        .ok_or_else(|| EditError::StaleId(id.to_string()))?;
    *slot = Value::String(text.to_string());

    Ok(serialize(doc))
}

/// Remove the rule at `id`. Unblocking and deleting are the same operation.
pub fn remove_rule(source: &str, id: &str) -> Result<String, EditError> {
    let rule_id: RuleId = id.parse()?;
    let mut doc = parse_document(source)?;

    let items = rule_array_mut(&mut doc, &rule_id)
        .filter(|items| rule_id.index < items.len())
        .ok_or_else(|| EditError::StaleId(id.to_string()))?;
    items.remove(rule_id.index);

    Ok(serialize(doc))
}

/// Append a rule to `common.block` or `common.riskKeywords`, creating the
/// section and array when absent. Returns the modified source.
pub fn add_rule(source: &str, kind: RuleType, text: &str) -> Result<String, EditError> {
    let mut doc = parse_document(source)?;

    let slot = doc.entry("common").or_insert(Value::Null);
    let mut common = match std::mem::take(slot) {
        Value::Object(section) => section,
        Value::Null => Map::new(),
        _ => {
            tracing::warn!("replacing non-object \"common\" section");
            Map::new()
        }
    };

    let items_slot = common.entry(kind.policy_key()).or_insert(Value::Null);
    let mut items = match std::mem::take(items_slot) {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        _ => {
            tracing::warn!(key = kind.policy_key(), "replacing non-array rule list");
            Vec::new()
        }
    };
    items.push(Value::String(text.to_string()));
    *items_slot = Value::Array(items);
    *slot = Value::Object(common);

    Ok(serialize(doc))
}

/// Parse source text into a document object. Empty text starts a new policy.
fn parse_document(source: &str) -> Result<Map<String, Value>, EditError> {
    if source.trim().is_empty() {
        let mut doc = Map::new();
        doc.insert("version".to_string(), Value::from(1));
        return Ok(doc);
    }

    let value: Value = serde_json::from_str(source).map_err(PolicyError::from)?;
    match value {
        Value::Object(doc) => Ok(doc),
        _ => Err(PolicyError::NotAnObject.into()),
    }
}

fn rule_array_mut<'a>(doc: &'a mut Map<String, Value>, id: &RuleId) -> Option<&'a mut Vec<Value>> {
    let section = match &id.scope {
        RuleScope::Common => doc.get_mut("common")?,
        RuleScope::Platform(key) => doc.get_mut("platforms")?.get_mut(key.as_str())?,
    };
    section.get_mut(id.kind.policy_key())?.as_array_mut()
}

fn serialize(doc: Map<String, Value>) -> String {
    serde_json::to_string_pretty(&Value::Object(doc)).unwrap_or_else(|_| "{}".to_string())
}
