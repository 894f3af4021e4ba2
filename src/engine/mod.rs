//! Sandbox evaluator
//!
//! Classifies a command string against a policy. Checks run in priority
//! order and the first match wins:
//!
//! 1. block patterns, matched against the original command
//! 2. risk keywords, matched as substrings of the quote-stripped command
//! 3. allow patterns (advisory only: a populated allow list that nothing
//!    matches still allows the command)
//! 4. default allow
//!
//! Evaluation never fails. Patterns that do not compile are inert, and a
//! missing or invalid policy allows everything (fail-open).

pub mod quotes;

use crate::config::Config;
use crate::output::EvaluationResult;
use crate::parser::{RuleId, RuleType};
use crate::policy::{Platform, SecurityPolicy};
use crate::rules::{CompiledRules, SkippedPattern, DEFAULT_REGEX_SIZE_LIMIT};

/// A policy compiled for one platform
pub struct SandboxEngine {
    rules: CompiledRules,
    platform: Option<Platform>,
}

impl SandboxEngine {
    /// Compile a policy for the given platform
    pub fn new(policy: Option<&SecurityPolicy>, platform: Option<Platform>) -> Self {
        Self::with_size_limit(policy, platform, DEFAULT_REGEX_SIZE_LIMIT)
    }

    /// Compile with an explicit bound on each pattern's compiled size
    pub fn with_size_limit(
        policy: Option<&SecurityPolicy>,
        platform: Option<Platform>,
        size_limit: usize,
    ) -> Self {
        Self {
            rules: CompiledRules::assemble(policy, platform, size_limit),
            platform,
        }
    }

    /// Compile using the platform and limits from configuration
    pub fn from_config(policy: Option<&SecurityPolicy>, config: &Config) -> Self {
        Self::with_size_limit(policy, config.platform(), config.matching.regex_size_limit)
    }

    /// Classify a single command
    pub fn evaluate(&self, command: &str) -> EvaluationResult {
        let result = self.classify(command);
        tracing::debug!(
            decision = %result.decision,
            rule_id = result.rule_id.as_deref().unwrap_or("-"),
            platform = self.platform.map(|p| p.id()).unwrap_or("none"),
            command_len = command.len(),
            "evaluated command"
        );
        result
    }

    fn classify(&self, command: &str) -> EvaluationResult {
        if let Some(pattern) = self.rules.first_block(command) {
            let id = RuleId::new(pattern.scope.clone(), RuleType::Block, pattern.index);
            return EvaluationResult::block(
                format!("Command blocked by pattern: {}", pattern.source),
                Some(id.to_string()),
            );
        }

        let stripped = quotes::strip_quoted(command);
        if let Some(risk) = self.rules.first_risk(&stripped) {
            let id = RuleId::new(risk.scope.clone(), RuleType::Risk, risk.index);
            return EvaluationResult::warn(
                format!("Command contains risk keyword: {}", risk.keyword),
                Some(id.to_string()),
            );
        }

        if self.rules.has_allow_list() {
            return match self.rules.first_allow(command) {
                Some(pattern) => EvaluationResult::allow(format!(
                    "Command matches allow pattern: {}",
                    pattern.source
                )),
                None => EvaluationResult::allow(
                    "Command allowed: no allow rule matched (allow rules are advisory)",
                ),
            };
        }

        EvaluationResult::allow("Command allowed: no rules matched")
    }

    /// Patterns that were dropped because they failed to compile
    pub fn skipped_patterns(&self) -> &[SkippedPattern] {
        &self.rules.skipped
    }

    /// The platform whose rules were merged in
    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    /// The merged rules
    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }
}

/// Evaluate a command against a policy using the host platform's rules
pub fn evaluate(policy: &SecurityPolicy, command: &str) -> EvaluationResult {
    SandboxEngine::new(Some(policy), Platform::current()).evaluate(command)
}

/// Evaluate a command against stored policy text.
///
/// Text that is not a valid policy is treated as no policy at all.
pub fn evaluate_text(policy_text: &str, command: &str) -> EvaluationResult {
    let policy = SecurityPolicy::load(policy_text);
    SandboxEngine::new(policy.as_ref(), Platform::current()).evaluate(command)
}
