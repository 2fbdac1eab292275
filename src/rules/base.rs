//! Base rule trait and types
//!
//! - `Rule` trait that every check implements
//! - `RuleContext` carrying the edited path and its content
//! - `RuleResult` capturing one rule's execution

use crate::models::{Finding, Severity};
use crate::patterns::SourceText;
use anyhow::Result;
use std::collections::HashMap;

/// Input handed to every rule: the edited path and its content
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    path: &'a str,
    path_lower: String,
    pub text: SourceText<'a>,
}

impl<'a> RuleContext<'a> {
    pub fn new(path: &'a str, content: &'a str) -> Self {
        Self {
            path,
            path_lower: path.to_lowercase(),
            text: SourceText::new(content),
        }
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Lowercase form of the path, used for keyword routing and hints
    pub fn path_lower(&self) -> &str {
        &self.path_lower
    }

    /// Case-insensitive suffix test on the path (".tsx", "tsconfig.json")
    pub fn path_ends_with(&self, suffix: &str) -> bool {
        self.path_lower.ends_with(&suffix.to_lowercase())
    }
}

/// Result from running a single rule
#[derive(Debug, Clone)]
pub struct RuleResult {
    /// Name of the rule that produced these results
    pub rule_name: String,
    /// Findings produced by the rule
    pub findings: Vec<Finding>,
    /// Execution time in microseconds
    pub duration_us: u64,
    /// Whether the rule completed successfully
    pub success: bool,
    /// Error message if the rule failed or panicked
    pub error: Option<String>,
}

impl RuleResult {
    pub fn success(rule_name: String, findings: Vec<Finding>, duration_us: u64) -> Self {
        Self {
            rule_name,
            findings,
            duration_us,
            success: true,
            error: None,
        }
    }

    /// A failed rule contributes no findings
    pub fn failure(rule_name: String, error: String, duration_us: u64) -> Self {
        Self {
            rule_name,
            findings: Vec::new(),
            duration_us,
            success: false,
            error: Some(error),
        }
    }
}

/// A single named check over (path, content)
///
/// Rules are stateless and deterministic. Returning `Err` or panicking only
/// drops this rule's findings; the engine keeps running the others.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct NoConsoleRule;
///
/// impl Rule for NoConsoleRule {
///     fn name(&self) -> &'static str {
///         "no-console"
///     }
///
///     fn description(&self) -> &'static str {
///         "Flags console output"
///     }
///
///     fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
///         if ctx.text.contains("console.") {
///             return Ok(vec![Finding::warning(self.name(), "console output left in code")]);
///         }
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Unique kebab-case identifier, also the config key under `[rules.<name>]`
    fn name(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Inspect the content and return findings in a stable order
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>>;
}

/// Summary statistics from running a rule set
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub rules_run: usize,
    pub rules_failed: usize,
    pub total_findings: usize,
    pub by_severity: HashMap<Severity, usize>,
    pub total_duration_us: u64,
}

impl RunSummary {
    /// Update summary with a rule result
    pub fn add_result(&mut self, result: &RuleResult) {
        self.rules_run += 1;
        self.total_duration_us += result.duration_us;

        if !result.success {
            self.rules_failed += 1;
        }

        self.total_findings += result.findings.len();
        for finding in &result.findings {
            *self.by_severity.entry(finding.severity).or_insert(0) += 1;
        }
    }
}
