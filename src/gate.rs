//! Gate consulted by a terminal session manager before running a command
//!
//! The gate owns its policy store (injected by the caller) and re-reads the
//! policy on every check, so edits made through the settings surface apply
//! to the very next command.

use crate::config::Config;
use crate::engine::SandboxEngine;
use crate::output::{Decision, EvaluationResult};
use crate::policy::{Platform, SecurityPolicy};
use crate::rules::DEFAULT_REGEX_SIZE_LIMIT;
use crate::store::PolicyStore;

/// What the session manager should do with a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    /// Forward to the shell silently
    Run,

    /// Forward to the shell and show these reasons as a notice
    RunWithNotice(Vec<String>),

    /// Do not execute; show these reasons to the user
    Refuse(Vec<String>),
}

impl GateAction {
    pub fn may_run(&self) -> bool {
        !matches!(self, GateAction::Refuse(_))
    }
}

impl From<EvaluationResult> for GateAction {
    fn from(result: EvaluationResult) -> Self {
        match result.decision {
            Decision::Allow => GateAction::Run,
            Decision::Warn => GateAction::RunWithNotice(result.reasons),
            Decision::Block => GateAction::Refuse(result.reasons),
        }
    }
}

/// Evaluates commands against the policy held in a store
pub struct CommandGate<S> {
    store: S,
    platform: Option<Platform>,
    size_limit: usize,
}

impl<S: PolicyStore> CommandGate<S> {
    /// Gate using the host platform's rules
    pub fn new(store: S) -> Self {
        Self {
            store,
            platform: Platform::current(),
            size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }

    /// Gate using the platform and limits from configuration
    pub fn from_config(store: S, config: &Config) -> Self {
        Self {
            store,
            platform: config.platform(),
            size_limit: config.matching.regex_size_limit,
        }
    }

    /// Override the platform whose rules apply
    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// Classify a command against the currently stored policy
    pub fn check(&self, command: &str) -> EvaluationResult {
        let policy = self
            .store
            .load()
            .and_then(|text| SecurityPolicy::load(&text));
        SandboxEngine::with_size_limit(policy.as_ref(), self.platform, self.size_limit)
            .evaluate(command)
    }

    /// Decide what the session manager should do with a command
    pub fn gate(&self, command: &str) -> GateAction {
        let action = GateAction::from(self.check(command));
        if let GateAction::Refuse(reasons) = &action {
            let reason = reasons.first().map(String::as_str).unwrap_or("");
            tracing::info!(reason, "refusing command");
        }
        action
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }
}
