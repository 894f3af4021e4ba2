//! Rule assembly and compilation
//!
//! Merges a policy's `common` rules with the rules of one platform and
//! compiles the regex patterns. Patterns that fail to compile are recorded as
//! [`SkippedPattern`] diagnostics and take no further part in evaluation.

pub mod defaults;

use regex::{Regex, RegexBuilder};

use crate::policy::{Platform, RuleScope, RuleSet, SecurityPolicy};

/// Default upper bound on the compiled size of a single pattern
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Which list a pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Block,
    Allow,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Block => "block",
            PatternKind::Allow => "allow",
        }
    }
}

/// A compiled block or allow pattern
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Pattern text as written in the policy
    pub source: String,
    pub scope: RuleScope,
    /// Position within the source array
    pub index: usize,
    regex: Regex,
}

impl CompiledPattern {
    pub fn is_match(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }
}

/// A pattern that could not be compiled and is inert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPattern {
    pub kind: PatternKind,
    pub scope: RuleScope,
    pub index: usize,
    pub pattern: String,
    pub error: String,
}

/// A risk keyword with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskKeyword {
    pub keyword: String,
    pub scope: RuleScope,
    pub index: usize,
}

/// Combined, compiled rules for a single platform
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    pub block: Vec<CompiledPattern>,
    pub allow: Vec<CompiledPattern>,
    pub risk_keywords: Vec<RiskKeyword>,
    /// Patterns dropped because they failed to compile
    pub skipped: Vec<SkippedPattern>,
    /// Number of allow patterns in the policy, including skipped ones
    pub allow_declared: usize,
}

impl CompiledRules {
    /// Assemble `common` followed by the platform's rules.
    ///
    /// `None` for the policy yields an empty rule set; `None` for the platform
    /// uses only the common rules.
    pub fn assemble(
        policy: Option<&SecurityPolicy>,
        platform: Option<Platform>,
        size_limit: usize,
    ) -> Self {
        let mut rules = Self::default();
        let Some(policy) = policy else {
            return rules;
        };

        if let Some(common) = &policy.common {
            rules.extend(RuleScope::Common, common, size_limit);
        }

        if let Some(platform) = platform {
            if let Some(platform_rules) = policy.platform_rules(platform) {
                rules.extend(
                    RuleScope::Platform(platform.id().to_string()),
                    platform_rules,
                    size_limit,
                );
            }
        }

        for skipped in &rules.skipped {
            tracing::warn!(
                kind = skipped.kind.as_str(),
                scope = %skipped.scope,
                index = skipped.index,
                pattern = %skipped.pattern,
                error = %skipped.error,
                "skipping invalid pattern"
            );
        }

        rules
    }

    fn extend(&mut self, scope: RuleScope, set: &RuleSet, size_limit: usize) {
        for (index, pattern) in set.block().iter().enumerate() {
            self.push_pattern(PatternKind::Block, &scope, index, pattern, size_limit);
        }

        self.allow_declared += set.allow().len();
        for (index, pattern) in set.allow().iter().enumerate() {
            self.push_pattern(PatternKind::Allow, &scope, index, pattern, size_limit);
        }

        for (index, keyword) in set.risk_keywords().iter().enumerate() {
            self.risk_keywords.push(RiskKeyword {
                keyword: keyword.clone(),
                scope: scope.clone(),
                index,
            });
        }
    }

    fn push_pattern(
        &mut self,
        kind: PatternKind,
        scope: &RuleScope,
        index: usize,
        pattern: &str,
        size_limit: usize,
    ) {
        match compile_pattern(pattern, size_limit) {
            Ok(regex) => {
                let compiled = CompiledPattern {
                    source: pattern.to_string(),
                    scope: scope.clone(),
                    index,
                    regex,
                };
                match kind {
                    PatternKind::Block => self.block.push(compiled),
                    PatternKind::Allow => self.allow.push(compiled),
                }
            }
            Err(e) => self.skipped.push(SkippedPattern {
                kind,
                scope: scope.clone(),
                index,
                pattern: pattern.to_string(),
                error: e.to_string(),
            }),
        }
    }

    /// Whether the policy declared any allow patterns (valid or not)
    pub fn has_allow_list(&self) -> bool {
        self.allow_declared > 0
    }

    /// First block pattern matching the command
    pub fn first_block(&self, command: &str) -> Option<&CompiledPattern> {
        self.block.iter().find(|p| p.is_match(command))
    }

    /// First allow pattern matching the command
    pub fn first_allow(&self, command: &str) -> Option<&CompiledPattern> {
        self.allow.iter().find(|p| p.is_match(command))
    }

    /// First risk keyword contained in the text
    pub fn first_risk(&self, text: &str) -> Option<&RiskKeyword> {
        self.risk_keywords
            .iter()
            .find(|k| text.contains(k.keyword.as_str()))
    }
}

/// Compile a single case-sensitive pattern with a bounded program size
pub fn compile_pattern(pattern: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .size_limit(size_limit)
        .dfa_size_limit(size_limit)
        .build()
}
