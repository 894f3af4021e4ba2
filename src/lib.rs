//! command-sandbox - policy-driven gate for shell commands run by coding agents
//!
//! Classifies a command as `allow`, `warn` or `block` before a terminal
//! session forwards it to a real shell. This is advisory text classification,
//! not process isolation.
//!
//! # Features
//!
//! - **Policy model**: global rules plus per-OS overrides (`win32`, `darwin`, `linux`)
//! - **Evaluation**: block patterns, then quote-aware risk keywords, then advisory allow patterns
//! - **Editor support**: flattened rule lists with positional ids, and id-addressed edits
//! - **Gate**: maps decisions to run / run-with-notice / refuse for a session manager
//! - **Audit logging**: JSONL log of decisions with secrets redacted
//!
//! # Failure behaviour
//!
//! Every failure degrades toward `allow`. A policy that is not valid JSON or
//! lacks a numeric `version` is treated as absent, which disables protection
//! instead of blocking every command. Individual patterns that fail to compile
//! are skipped and reported through [`SandboxEngine::skipped_patterns`].
//!
//! # Example
//!
//! ```
//! use command_sandbox::{evaluate, Decision, SecurityPolicy};
//!
//! let policy = SecurityPolicy::from_json(
//!     r#"{"version":1,"common":{"block":["rm\\s+-rf"],"riskKeywords":["password"]}}"#,
//! ).unwrap();
//!
//! assert_eq!(evaluate(&policy, "rm -rf /data").decision, Decision::Block);
//! assert_eq!(evaluate(&policy, "echo \"Enter your password\"").decision, Decision::Allow);
//! assert_eq!(evaluate(&policy, "export PASSWORD_VAR=password").decision, Decision::Warn);
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod input;
pub mod output;
pub mod parser;
pub mod policy;
pub mod rules;
pub mod store;

// Re-exports for convenience
pub use config::Config;
pub use engine::{evaluate, evaluate_text, SandboxEngine};
pub use error::{ConfigError, EditError, PolicyError, StoreError};
pub use gate::{CommandGate, GateAction};
pub use input::CheckRequest;
pub use output::{Decision, EvaluationResult};
pub use parser::{parse_policy, ParsedCommand, ParsedPolicy, RuleId, RuleType};
pub use policy::{Platform, RuleScope, RuleSet, SecurityPolicy};
pub use store::{FilePolicyStore, MemoryPolicyStore, PolicyEditor, PolicyStore};
