//! Project type-check rule
//!
//! Runs the project's own type-check command for substantial edits and folds
//! a failing run into a single CRITICAL finding. Anything that stops the tool
//! from reporting (not installed, timeout) yields no findings.

use crate::config::TypeCheckConfig;
use crate::models::Finding;
use crate::rules::base::{Rule, RuleContext};
use crate::rules::external_tool::run_external_tool;
use anyhow::Result;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Compiled regex for tsc diagnostics, `file(line,col): error TS1234: message`
static TSC_ERROR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tsc_pattern() -> &'static Regex {
    TSC_ERROR_PATTERN.get_or_init(|| {
        Regex::new(r"^(.+?)\((\d+),(\d+)\):\s+error\s+(TS\d+):\s+(.+)$").expect("valid regex")
    })
}

/// Compiler diagnostics shown in the finding message
const MAX_LISTED_ERRORS: usize = 3;

pub struct TypeCheckRule {
    config: TypeCheckConfig,
    project_dir: PathBuf,
}

impl TypeCheckRule {
    pub fn new(config: TypeCheckConfig, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            project_dir: project_dir.into(),
        }
    }

    /// `TS2304 Cannot find name 'foo'. (src/a.ts:10)` for each parsable line
    fn summarize_errors(output: &str) -> (usize, Vec<String>) {
        let errors: Vec<String> = output
            .lines()
            .filter_map(|line| {
                let caps = tsc_pattern().captures(line.trim())?;
                Some(format!(
                    "{} {} ({}:{})",
                    caps.get(4)?.as_str(),
                    caps.get(5)?.as_str(),
                    caps.get(1)?.as_str().replace('\\', "/"),
                    caps.get(2)?.as_str()
                ))
            })
            .collect();
        let total = errors.len();
        (total, errors.into_iter().take(MAX_LISTED_ERRORS).collect())
    }
}

impl Rule for TypeCheckRule {
    fn name(&self) -> &'static str {
        "type-check"
    }

    fn description(&self) -> &'static str {
        "Runs the project type check for large edits"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !self.config.enabled {
            return Ok(vec![]);
        }

        let lines = ctx.text.line_count();
        if lines <= self.config.min_lines {
            debug!(
                "Skipping type check: {} lines <= {}",
                lines, self.config.min_lines
            );
            return Ok(vec![]);
        }

        info!("Running type check for {} ({} lines)", ctx.path(), lines);
        let result = run_external_tool(
            &self.config.command,
            "type-check",
            self.config.timeout(),
            Some(&self.project_dir),
        );

        if !result.success {
            warn!(
                "Type check unavailable, continuing without it: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
            return Ok(vec![]);
        }

        if !result.failed_check() {
            return Ok(vec![]);
        }

        let (total, listed) = Self::summarize_errors(&result.combined_output());
        let mut message = "TypeScript compilation failed - fix the type errors before continuing \
                           (broken types reach production as runtime crashes)"
            .to_string();
        if total > 0 {
            message.push_str(&format!(": {} error(s); {}", total, listed.join("; ")));
        }

        Ok(vec![Finding::critical(self.name(), message)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_content(lines: usize) -> String {
        (0..lines).map(|i| format!("const v{i}: number = {i};\n")).collect()
    }

    fn rule_with(command: &[&str], min_lines: usize) -> TypeCheckRule {
        TypeCheckRule::new(
            TypeCheckConfig {
                enabled: true,
                command: command.iter().map(|s| s.to_string()).collect(),
                min_lines,
                timeout_secs: 10,
            },
            std::env::temp_dir(),
        )
    }

    #[test]
    fn test_regex_parsing() {
        let (total, listed) = TypeCheckRule::summarize_errors(
            "src/index.ts(10,5): error TS2304: Cannot find name 'foo'.\nnoise\n",
        );
        assert_eq!(total, 1);
        assert_eq!(listed[0], "TS2304 Cannot find name 'foo'. (src/index.ts:10)");
    }

    #[test]
    fn test_short_content_skips_tool() {
        let rule = rule_with(&["checkout-gate-missing-tsc"], 50);
        let content = long_content(10);
        let ctx = RuleContext::new("src/a.ts", &content);
        assert!(rule.evaluate(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_missing_tool_yields_nothing() {
        let rule = rule_with(&["checkout-gate-missing-tsc"], 5);
        let content = long_content(10);
        let ctx = RuleContext::new("src/a.ts", &content);
        assert!(rule.evaluate(&ctx).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_check_is_critical() {
        let rule = rule_with(
            &[
                "sh",
                "-c",
                "echo \"src/a.ts(3,1): error TS2322: Type 'string' is not assignable.\"; exit 2",
            ],
            5,
        );
        let content = long_content(10);
        let ctx = RuleContext::new("src/a.ts", &content);
        let findings = rule.evaluate(&ctx).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_critical());
        assert!(findings[0].message.contains("TS2322"));
    }

    #[cfg(unix)]
    #[test]
    fn test_passing_check_is_clean() {
        let rule = rule_with(&["sh", "-c", "exit 0"], 5);
        let content = long_content(10);
        let ctx = RuleContext::new("src/a.ts", &content);
        assert!(rule.evaluate(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_disabled() {
        let mut rule = rule_with(&["sh", "-c", "exit 1"], 0);
        rule.config.enabled = false;
        let content = long_content(3);
        let ctx = RuleContext::new("src/a.ts", &content);
        assert!(rule.evaluate(&ctx).unwrap().is_empty());
    }
}
