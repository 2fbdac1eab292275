//! JSON reporter
//!
//! One object per evaluation: outcome, exit code, findings by severity and the
//! domains that were evaluated.

use crate::models::{Finding, Outcome};
use crate::rules::Evaluation;
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    path: &'a str,
    outcome: Outcome,
    exit_code: i32,
    critical: &'a [Finding],
    warnings: &'a [Finding],
    domains: Vec<&'static str>,
    rules_run: usize,
    rules_failed: usize,
}

/// Render an evaluation as pretty-printed JSON
pub fn render(evaluation: &Evaluation) -> Result<String> {
    let report = JsonReport {
        path: &evaluation.path,
        outcome: evaluation.verdict.outcome,
        exit_code: evaluation.exit_code(),
        critical: &evaluation.verdict.critical,
        warnings: &evaluation.verdict.warnings,
        domains: evaluation.domains.iter().map(|d| d.domain.as_str()).collect(),
        rules_run: evaluation.summary.rules_run,
        rules_failed: evaluation.summary.rules_failed,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
