//! Integration tests for the command gate backed by a policy file

use command_sandbox::{
    CommandGate, Decision, FilePolicyStore, GateAction, Platform, PolicyEditor, PolicyStore,
    RuleType, SecurityPolicy,
};
use tempfile::TempDir;

fn setup(policy: Option<&str>) -> (TempDir, FilePolicyStore) {
    let dir = TempDir::new().unwrap();
    let store = FilePolicyStore::new(dir.path().join("policy.json"));
    if let Some(text) = policy {
        store.save(text).unwrap();
    }
    (dir, store)
}

#[test]
fn test_missing_policy_file_allows_everything() {
    let (_dir, store) = setup(None);
    let gate = CommandGate::new(store).with_platform(Some(Platform::Linux));
    assert_eq!(gate.gate("rm -rf /"), GateAction::Run);
}

#[test]
fn test_default_policy_file() {
    let (_dir, store) = setup(Some(SecurityPolicy::default_policy().to_json_pretty().as_str()));
    let gate = CommandGate::new(store).with_platform(Some(Platform::Linux));

    assert!(!gate.gate("rm -rf /").may_run());
    assert!(matches!(gate.gate("sudo apt update"), GateAction::RunWithNotice(_)));
    assert_eq!(gate.gate("cargo build"), GateAction::Run);
}

#[test]
fn test_edits_apply_to_next_check() {
    let (_dir, store) = setup(Some(r#"{"version":1}"#));
    let gate = CommandGate::new(&store).with_platform(Some(Platform::Linux));
    let editor = PolicyEditor::new(&store);

    assert_eq!(gate.check("terraform destroy").decision, Decision::Allow);

    let rules = editor.add(RuleType::Block, "terraform\\s+destroy").unwrap();
    let result = gate.check("terraform destroy");
    assert_eq!(result.decision, Decision::Block);
    assert_eq!(result.rule_id.as_deref(), Some(rules.block_commands[0].id.as_str()));

    editor.unblock(&rules.block_commands[0].id).unwrap();
    assert_eq!(gate.check("terraform destroy").decision, Decision::Allow);
}

#[test]
fn test_corrupt_policy_file_is_permissive() {
    let (_dir, store) = setup(Some("{\"version\": 1, \"common\": "));
    let gate = CommandGate::new(store).with_platform(Some(Platform::Linux));
    assert_eq!(gate.gate("rm -rf /"), GateAction::Run);
}

#[test]
fn test_refuse_carries_reasons() {
    let (_dir, store) = setup(Some(r#"{"version":1,"platforms":{"linux":{"block":["mkfs"]}}}"#));
    let gate = CommandGate::new(store).with_platform(Some(Platform::Linux));

    match gate.gate("mkfs.ext4 /dev/sdb") {
        GateAction::Refuse(reasons) => {
            assert_eq!(reasons, ["Command blocked by pattern: mkfs"]);
        }
        other => panic!("expected refuse, got {:?}", other),
    }
}

#[test]
fn test_platform_selection() {
    let policy = r#"{"version":1,"platforms":{"win32":{"block":["(?i)format\\s+c:"]}}}"#;
    let (_dir, store) = setup(Some(policy));

    let windows = CommandGate::new(&store).with_platform(Some(Platform::Win32));
    let linux = CommandGate::new(&store).with_platform(Some(Platform::Linux));
    let unknown = CommandGate::new(&store).with_platform(None);

    assert!(!windows.gate("FORMAT C:").may_run());
    assert!(linux.gate("FORMAT C:").may_run());
    assert!(unknown.gate("FORMAT C:").may_run());
}
