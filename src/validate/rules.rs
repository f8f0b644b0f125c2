//! Pluggable lint rules over a node's parameters.
//!
//! Rules only report findings. Whether a finding fails the technical phase,
//! shows up as a warning, or is dropped is decided by [`LintPolicy`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::expressions::ExpressionScan;
use crate::parse::types::Node;

/// Everything a rule may look at for one node.
pub struct RuleContext<'a> {
    pub node: &'a Node,
    /// Parameters serialized as JSON text.
    pub payload: &'a str,
    pub expressions: &'a ExpressionScan,
}

pub trait LintRule: Send + Sync {
    /// Stable diagnostic code, e.g. `X001`.
    fn code(&self) -> &'static str;
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<String>;
}

// =============================================================================
// POLICY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    Warning,
    Off,
}

/// A legacy code idiom and the replacement to suggest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecatedIdiom {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LintPolicy {
    /// Severity per rule code; codes not listed use `default_severity`.
    pub severities: BTreeMap<String, RuleSeverity>,
    pub default_severity: RuleSeverity,
    pub deprecated_idioms: Vec<DeprecatedIdiom>,
}

impl Default for LintPolicy {
    fn default() -> Self {
        LintPolicy {
            severities: BTreeMap::new(),
            default_severity: RuleSeverity::Error,
            deprecated_idioms: vec![DeprecatedIdiom {
                pattern: "items[0].json".into(),
                replacement: "$input.all()[0].json".into(),
            }],
        }
    }
}

impl LintPolicy {
    pub fn severity(&self, code: &str) -> RuleSeverity {
        self.severities
            .get(code)
            .copied()
            .unwrap_or(self.default_severity)
    }

    pub fn set(mut self, code: &str, severity: RuleSeverity) -> Self {
        self.severities.insert(code.to_string(), severity);
        self
    }
}

/// The built-in rule set, parameterised by the policy's idiom list.
pub fn builtin_rules(policy: &LintPolicy) -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(DeprecatedDataAccess {
            idioms: policy.deprecated_idioms.clone(),
        }),
        Box::new(MissingOutput),
        Box::new(UnterminatedExpression),
        Box::new(EmptyExpression),
    ]
}

// =============================================================================
// RULES
// =============================================================================

/// X001: code node uses a legacy data-access idiom.
pub struct DeprecatedDataAccess {
    pub idioms: Vec<DeprecatedIdiom>,
}

impl LintRule for DeprecatedDataAccess {
    fn code(&self) -> &'static str {
        "X001"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<String> {
        let Some(code) = ctx.node.js_code().filter(|_| ctx.node.is_code()) else {
            return vec![];
        };
        self.idioms
            .iter()
            .filter(|idiom| code.contains(idiom.pattern.as_str()))
            .map(|idiom| {
                format!(
                    "Code node \"{}\" uses deprecated '{}' - use '{}' instead",
                    ctx.node.label(),
                    idiom.pattern,
                    idiom.replacement
                )
            })
            .collect()
    }
}

/// X002: code node neither reads `$input` nor has a `return`.
pub struct MissingOutput;

impl LintRule for MissingOutput {
    fn code(&self) -> &'static str {
        "X002"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<String> {
        let Some(code) = ctx.node.js_code().filter(|_| ctx.node.is_code()) else {
            return vec![];
        };
        if code.contains("$input") || code.contains("return") {
            return vec![];
        }
        vec![format!(
            "Code node \"{}\" may not return data properly - ensure 'return' statement exists",
            ctx.node.label()
        )]
    }
}

/// X003: `{{` without a closing `}}`.
pub struct UnterminatedExpression;

impl LintRule for UnterminatedExpression {
    fn code(&self) -> &'static str {
        "X003"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<String> {
        ctx.expressions
            .unterminated
            .iter()
            .map(|fragment| {
                format!(
                    "Node \"{}\" has an unterminated expression near '{}'",
                    ctx.node.label(),
                    fragment
                )
            })
            .collect()
    }
}

/// X004: `{{ }}` with nothing inside.
pub struct EmptyExpression;

impl LintRule for EmptyExpression {
    fn code(&self) -> &'static str {
        "X004"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<String> {
        ctx.expressions
            .empty
            .iter()
            .map(|_| format!("Node \"{}\" has an empty expression", ctx.node.label()))
            .collect()
    }
}
