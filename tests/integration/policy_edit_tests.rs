//! Integration tests for policy listing and id-addressed edits

use command_sandbox::parser::edit::{add_rule, remove_rule, update_rule};
use command_sandbox::{
    parse_policy, Decision, EditError, Platform, RuleScope, RuleType, SandboxEngine,
    SecurityPolicy,
};

const POLICY: &str = r#"{
  "version": 1,
  "common": {
    "block": ["rm\\s+-rf", "shutdown"],
    "riskKeywords": ["password"],
    "notes": "keep me"
  },
  "platforms": {
    "win32": { "block": ["format\\s+c:"] },
    "linux": { "block": ["mkfs"], "riskKeywords": ["systemctl"] }
  },
  "owner": "ops"
}"#;

fn linux_engine(source: &str) -> SandboxEngine {
    let policy = SecurityPolicy::from_json(source).unwrap();
    SandboxEngine::new(Some(&policy), Some(Platform::Linux))
}

#[test]
fn test_listing_order_and_ids() {
    let parsed = parse_policy(POLICY);

    let block_ids: Vec<&str> = parsed.block_commands.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        block_ids,
        ["common-block-0", "common-block-1", "win32-block-0", "linux-block-0"]
    );

    let risk_ids: Vec<&str> = parsed.risk_commands.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(risk_ids, ["common-risk-0", "linux-risk-0"]);

    let format = parsed.get("win32-block-0").unwrap();
    assert_eq!(format.command, "format\\s+c:");
    assert_eq!(format.platform, RuleScope::Platform("win32".to_string()));
    assert_eq!(format.rule_type, RuleType::Block);
}

#[test]
fn test_listing_serializes_for_ui() {
    let json = parse_policy(r#"{"version":1,"common":{"riskKeywords":["token"]}}"#).to_json();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["blockCommands"], serde_json::json!([]));
    assert_eq!(
        value["riskCommands"][0],
        serde_json::json!({
            "id": "common-risk-0",
            "command": "token",
            "platform": "common",
            "type": "risk"
        })
    );
}

#[test]
fn test_listing_ids_match_evaluator() {
    let parsed = parse_policy(POLICY);
    let engine = linux_engine(POLICY);

    let result = engine.evaluate("mkfs.ext4 /dev/sda");
    assert_eq!(result.decision, Decision::Block);
    let rule = parsed.get(result.rule_id.as_deref().unwrap()).unwrap();
    assert_eq!(rule.command, "mkfs");

    let result = engine.evaluate("systemctl stop nginx");
    assert_eq!(result.decision, Decision::Warn);
    let rule = parsed.get(result.rule_id.as_deref().unwrap()).unwrap();
    assert_eq!(rule.command, "systemctl");
}

#[test]
fn test_malformed_policy_lists_nothing() {
    assert!(parse_policy("{not json").is_empty());
    assert!(parse_policy("").is_empty());
}

#[test]
fn test_update_then_reparse() {
    let updated = update_rule(POLICY, "linux-block-0", "mkfs\\.").unwrap();
    let parsed = parse_policy(&updated);

    assert_eq!(parsed.get("linux-block-0").unwrap().command, "mkfs\\.");
    assert_eq!(parsed.block_commands.len(), 4);
    assert_eq!(linux_engine(&updated).evaluate("mkfs.ext4 x").decision, Decision::Block);
}

#[test]
fn test_remove_shifts_later_ids() {
    let updated = remove_rule(POLICY, "common-block-0").unwrap();
    let parsed = parse_policy(&updated);

    assert_eq!(parsed.get("common-block-0").unwrap().command, "shutdown");
    assert!(parsed.get("common-block-1").is_none());
    assert_eq!(linux_engine(&updated).evaluate("rm -rf /tmp/x").decision, Decision::Allow);
}

#[test]
fn test_unblock_then_command_allowed() {
    let source = r#"{"version":1,"common":{"block":["rm\\s+-rf"]}}"#;
    assert_eq!(linux_engine(source).evaluate("rm -rf /data").decision, Decision::Block);

    let id = parse_policy(source).block_commands[0].id.clone();
    let updated = remove_rule(source, &id).unwrap();
    assert_eq!(linux_engine(&updated).evaluate("rm -rf /data").decision, Decision::Allow);
}

#[test]
fn test_add_creates_common_section() {
    let updated = add_rule(r#"{"version":1}"#, RuleType::Risk, "token").unwrap();
    let parsed = parse_policy(&updated);

    assert_eq!(parsed.risk_commands.len(), 1);
    assert_eq!(parsed.risk_commands[0].id, "common-risk-0");
    assert_eq!(linux_engine(&updated).evaluate("export token=1").decision, Decision::Warn);
}

#[test]
fn test_add_to_empty_source() {
    let updated = add_rule("", RuleType::Block, "mkfs").unwrap();
    let policy = SecurityPolicy::from_json(&updated).unwrap();
    assert_eq!(policy.common.unwrap().block(), ["mkfs"]);
}

#[test]
fn test_edits_preserve_unknown_fields_and_order() {
    let updated = add_rule(POLICY, RuleType::Block, "reboot").unwrap();
    let value: serde_json::Value = serde_json::from_str(&updated).unwrap();

    assert_eq!(value["owner"], "ops");
    assert_eq!(value["common"]["notes"], "keep me");
    assert_eq!(value["common"]["block"][2], "reboot");

    let platforms: Vec<&String> = value["platforms"].as_object().unwrap().keys().collect();
    assert_eq!(platforms, ["win32", "linux"]);

    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["version", "common", "platforms", "owner"]);
}

#[test]
fn test_stale_id_is_an_error() {
    let err = update_rule(POLICY, "darwin-block-0", "x").unwrap_err();
    assert!(err.is_stale());

    let err = remove_rule(POLICY, "common-risk-9").unwrap_err();
    assert!(err.is_stale());
}

#[test]
fn test_malformed_id_is_an_error() {
    for id in ["", "common", "common-allow-0", "common-block-x", "-block-0"] {
        let err = remove_rule(POLICY, id).unwrap_err();
        assert!(matches!(err, EditError::MalformedId(_)), "{}", id);
    }
}

#[test]
fn test_edit_of_invalid_document_fails() {
    assert!(matches!(
        update_rule("{oops", "common-block-0", "x"),
        Err(EditError::Policy(_))
    ));
}

#[test]
fn test_platforms_common_section_ids_stay_unique() {
    let source = r#"{"version":1,"common":{"block":["a"]},"platforms":{"common":{"block":["b"]}}}"#;
    let parsed = parse_policy(source);
    assert_eq!(parsed.block_commands.len(), 1);

    let updated = remove_rule(source, &parsed.block_commands[0].id).unwrap();
    let value: serde_json::Value = serde_json::from_str(&updated).unwrap();
    assert_eq!(value["common"]["block"], serde_json::json!([]));
    assert_eq!(value["platforms"]["common"]["block"], serde_json::json!(["b"]));
}
