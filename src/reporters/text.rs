//! Text (terminal) reporter
//!
//! Headers, warnings, passes and hints go to stdout. Critical findings and
//! the "correction required" lines go to stderr so a host that only surfaces
//! stderr on failure still shows why the edit was blocked.

use crate::models::{Finding, Outcome};
use crate::reporters::{Rendered, TextOptions};
use crate::rules::{DomainEvaluation, Evaluation};
use console::style;
use std::fmt::Write;

struct Marks {
    ok: &'static str,
    critical: &'static str,
    warning: &'static str,
    hint: &'static str,
}

const EMOJI_MARKS: Marks = Marks {
    ok: "✅",
    critical: "❌",
    warning: "⚠️ ",
    hint: "💡",
};

const PLAIN_MARKS: Marks = Marks {
    ok: "[ok]",
    critical: "[critical]",
    warning: "[warning]",
    hint: "[hint]",
};

fn finding_line(finding: &Finding) -> String {
    match finding.line {
        Some(line) => format!("  • {} (line {}) [{}]", finding.message, line, finding.rule),
        None => format!("  • {} [{}]", finding.message, finding.rule),
    }
}

/// Render an evaluation as terminal text
pub fn render(evaluation: &Evaluation, options: TextOptions) -> Rendered {
    let mut rendered = Rendered::default();
    if !evaluation.is_applicable() {
        return rendered;
    }

    let marks = if options.emoji { &EMOJI_MARKS } else { &PLAIN_MARKS };
    let out = &mut rendered.stdout;
    let err = &mut rendered.stderr;

    for domain in &evaluation.domains {
        render_domain(domain, &evaluation.path, options, marks, out, err);
    }

    if evaluation.verdict.outcome != Outcome::Block && options.hints {
        for hint in evaluation.domains.iter().filter_map(|d| d.hint) {
            let _ = writeln!(out, "{} {}", marks.hint, style(hint).dim());
        }
    }

    rendered
}

fn render_domain(
    domain: &DomainEvaluation,
    path: &str,
    options: TextOptions,
    marks: &Marks,
    out: &mut String,
    err: &mut String,
) {
    let banner = &domain.banner;
    if options.emoji && !banner.icon.is_empty() {
        let _ = writeln!(out, "{} Validating {}: {}", banner.icon, banner.label, path);
    } else {
        let _ = writeln!(out, "Validating {}: {}", banner.label, path);
    }

    let verdict = &domain.verdict;

    if !verdict.critical.is_empty() {
        let _ = writeln!(
            err,
            "{} {}",
            marks.critical,
            style(format!("CRITICAL ISSUES ({}):", banner.label))
                .red()
                .bold()
                .for_stderr()
        );
        for finding in &verdict.critical {
            let _ = writeln!(err, "{}", finding_line(finding));
        }
    }

    if !verdict.warnings.is_empty() {
        let _ = writeln!(
            out,
            "{} {}",
            marks.warning,
            style(format!("Warnings ({}):", banner.label)).yellow()
        );
        for finding in &verdict.warnings {
            let _ = writeln!(out, "{}", finding_line(finding));
        }
    }

    match verdict.outcome {
        Outcome::Block => {
            let _ = writeln!(err, "{}", style(banner.on_block).red().for_stderr());
        }
        Outcome::Warn => {
            let _ = writeln!(out, "{}", banner.on_warn);
        }
        Outcome::Pass => {
            let _ = writeln!(
                out,
                "{} {}",
                marks.ok,
                style(format!("{} checks passed", banner.label)).green()
            );
        }
    }
}
