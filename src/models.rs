//! Core data models for checkout-gate
//!
//! A run produces `Finding`s, which are folded into a single `Verdict`.
//! Nothing here outlives one invocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exit code for an allowed edit (PASS, WARN, or not applicable)
pub const EXIT_ALLOW: i32 = 0;
/// Exit code for a tooling fault (unreadable file, malformed event)
pub const EXIT_FATAL: i32 = 1;
/// Exit code for a blocked edit
pub const EXIT_BLOCK: i32 = 2;

/// Severity levels for findings
///
/// Only `Critical` is gating. `Warning` is advisory and never halts the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One detected issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the rule that produced this finding
    pub rule: String,
    pub severity: Severity,
    /// Human-readable message, including the compliance or business rationale
    pub message: String,
    /// 1-based line of the offending text, when the rule can pin it down
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Finding {
    pub fn critical(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: Severity::Critical,
            message: message.into(),
            line: None,
        }
    }

    pub fn warning(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            severity: Severity::Warning,
            message: message.into(),
            line: None,
        }
    }

    /// Attach a source line
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Outcome of a gate run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Pass,
    Warn,
    Block,
}

impl Outcome {
    /// Process exit status for this outcome. WARN is advisory and exits 0.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Pass | Outcome::Warn => EXIT_ALLOW,
            Outcome::Block => EXIT_BLOCK,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Warn => write!(f, "WARN"),
            Outcome::Block => write!(f, "BLOCK"),
        }
    }
}

/// Findings partitioned by severity, plus the derived outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub critical: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl Verdict {
    /// Derive a verdict from findings in evaluation order.
    ///
    /// BLOCK if any finding is critical, else WARN if any finding exists,
    /// else PASS. Ordering within each partition is preserved.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let (critical, warnings): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(Finding::is_critical);

        let outcome = if !critical.is_empty() {
            Outcome::Block
        } else if !warnings.is_empty() {
            Outcome::Warn
        } else {
            Outcome::Pass
        };

        Self {
            outcome,
            critical,
            warnings,
        }
    }

    /// Verdict for a path no rule set claims
    pub fn not_applicable() -> Self {
        Self::from_findings(Vec::new())
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_findings_pass() {
        let verdict = Verdict::from_findings(vec![]);
        assert_eq!(verdict.outcome, Outcome::Pass);
        assert_eq!(verdict.exit_code(), 0);
        assert_eq!(verdict.total(), 0);
    }

    #[test]
    fn test_warnings_only_warn_and_exit_zero() {
        let verdict = Verdict::from_findings(vec![
            Finding::warning("a", "first"),
            Finding::warning("b", "second"),
        ]);
        assert_eq!(verdict.outcome, Outcome::Warn);
        assert_eq!(verdict.exit_code(), EXIT_ALLOW);
        assert_eq!(verdict.warnings.len(), 2);
    }

    #[test]
    fn test_any_critical_blocks() {
        let verdict = Verdict::from_findings(vec![
            Finding::warning("a", "advisory"),
            Finding::critical("b", "gating"),
            Finding::warning("c", "advisory again"),
        ]);
        assert_eq!(verdict.outcome, Outcome::Block);
        assert_eq!(verdict.exit_code(), EXIT_BLOCK);
        assert_eq!(verdict.critical.len(), 1);
        // Partition keeps declaration order
        assert_eq!(verdict.warnings[0].rule, "a");
        assert_eq!(verdict.warnings[1].rule, "c");
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Finding::critical("r", "m").at_line(3)).unwrap();
        assert!(json.contains("\"critical\""));
        assert!(json.contains("\"line\":3"));

        let outcome = serde_json::to_string(&Outcome::Block).unwrap();
        assert_eq!(outcome, "\"BLOCK\"");
    }

    #[test]
    fn test_line_omitted_when_unknown() {
        let json = serde_json::to_string(&Finding::warning("r", "m")).unwrap();
        assert!(!json.contains("line"));
    }
}
