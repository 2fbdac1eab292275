//! Gate engine: routes a path to rule sets, runs each rule in isolation and
//! folds the findings into a verdict.
//!
//! Rules run sequentially on the calling thread. A rule that returns `Err` or
//! panics is recorded as a failed `RuleResult` with no findings; it never
//! aborts the run or changes other rules' findings.

use crate::config::{ExcludeConfig, GateConfig};
use crate::models::{Finding, Verdict};
use crate::rules::base::{Rule, RuleContext, RuleResult, RunSummary};
use crate::rules::registry::RuleRegistry;
use crate::rules::set::{Banner, Domain, RuleSet};
use std::any::Any;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Results of one rule set for one path
#[derive(Debug, Clone)]
pub struct DomainEvaluation {
    pub domain: Domain,
    pub banner: Banner,
    /// Reminder matching the path, if the set has one
    pub hint: Option<&'static str>,
    pub results: Vec<RuleResult>,
    /// Verdict over this set's findings only
    pub verdict: Verdict,
}

/// Everything produced by evaluating one (path, content) pair
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub path: String,
    /// Rule sets that claimed the path, in registration order
    pub domains: Vec<DomainEvaluation>,
    /// Verdict over the findings of every evaluated set
    pub verdict: Verdict,
    pub summary: RunSummary,
}

impl Evaluation {
    fn not_applicable(path: &str) -> Self {
        Self {
            path: path.to_string(),
            domains: Vec::new(),
            verdict: Verdict::not_applicable(),
            summary: RunSummary::default(),
        }
    }

    /// False when no rule set claimed the path; such runs print nothing
    pub fn is_applicable(&self) -> bool {
        !self.domains.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code()
    }

    /// All findings in evaluation order
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.domains
            .iter()
            .flat_map(|d| d.results.iter().flat_map(|r| r.findings.iter()))
    }
}

pub struct GateEngine {
    registry: RuleRegistry,
    exclude: ExcludeConfig,
    /// Project directory as given and canonicalized; exclusions match paths
    /// relative to it
    project_roots: Vec<PathBuf>,
    domain_filter: Option<Domain>,
}

impl GateEngine {
    /// Engine without exclusions; nothing is skipped, not even the defaults
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry,
            exclude: ExcludeConfig {
                paths: Vec::new(),
                skip_defaults: true,
            },
            project_roots: Vec::new(),
            domain_filter: None,
        }
    }

    /// Engine over the standard registry with the project's exclusions
    pub fn from_config(config: &GateConfig, project_dir: &Path) -> anyhow::Result<Self> {
        let registry = RuleRegistry::standard(config, project_dir)?;
        Ok(Self::new(registry)
            .with_exclude(config.exclude.clone())
            .with_project_dir(project_dir))
    }

    /// Paths that are never evaluated
    pub fn with_exclude(mut self, exclude: ExcludeConfig) -> Self {
        self.exclude = exclude;
        self
    }

    /// Absolute event paths under this directory are made relative to it
    /// before exclusions are matched
    pub fn with_project_dir(mut self, project_dir: &Path) -> Self {
        self.project_roots = vec![project_dir.to_path_buf()];
        if let Ok(canonical) = project_dir.canonicalize() {
            if !self.project_roots.contains(&canonical) {
                self.project_roots.push(canonical);
            }
        }
        self
    }

    /// Only evaluate the given domain's rule set
    pub fn with_domain(mut self, domain: Option<Domain>) -> Self {
        self.domain_filter = domain;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// `path` relative to the project directory when it lies under it
    fn project_relative<'p>(&self, path: &'p str) -> Cow<'p, str> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            for root in &self.project_roots {
                if let Ok(relative) = candidate.strip_prefix(root) {
                    return Cow::Owned(relative.to_string_lossy().into_owned());
                }
            }
        }
        Cow::Borrowed(path)
    }

    fn is_excluded(&self, path: &str) -> bool {
        let relative = self.project_relative(path);
        let excluded = self.exclude.is_excluded(&relative);
        if excluded {
            debug!("{} is excluded by config", relative);
        }
        excluded
    }

    /// Rule sets that will run for `path`
    pub fn route(&self, path: &str) -> Vec<&RuleSet> {
        if path.is_empty() || self.is_excluded(path) {
            return Vec::new();
        }
        self.registry
            .route(path)
            .into_iter()
            .filter(|set| self.domain_filter.map_or(true, |d| set.domain() == d))
            .collect()
    }

    /// Evaluate `content` as the new content of `path`
    pub fn evaluate(&self, path: &str, content: &str) -> Evaluation {
        let sets = self.route(path);
        if sets.is_empty() {
            debug!("No rule set claims {}", path);
            return Evaluation::not_applicable(path);
        }

        let ctx = RuleContext::new(path, content);
        let mut summary = RunSummary::default();
        let mut all_findings = Vec::new();
        let mut domains = Vec::with_capacity(sets.len());

        for set in sets {
            debug!("Evaluating {} with {} rule set", path, set.domain());
            let results: Vec<RuleResult> = set
                .rules()
                .iter()
                .map(|rule| Self::run_single_rule(rule, &ctx))
                .collect();

            let findings: Vec<Finding> = results.iter().flat_map(|r| r.findings.clone()).collect();
            for result in &results {
                summary.add_result(result);
            }
            all_findings.extend(findings.iter().cloned());

            domains.push(DomainEvaluation {
                domain: set.domain(),
                banner: set.banner().clone(),
                hint: set.hint_for(path),
                results,
                verdict: Verdict::from_findings(findings),
            });
        }

        let verdict = Verdict::from_findings(all_findings);
        info!(
            "{}: {} ({} critical, {} warnings, {} rules in {}us)",
            path,
            verdict.outcome,
            verdict.critical.len(),
            verdict.warnings.len(),
            summary.rules_run,
            summary.total_duration_us
        );

        Evaluation {
            path: path.to_string(),
            domains,
            verdict,
            summary,
        }
    }

    /// Run a single rule with error handling and timing
    fn run_single_rule(rule: &Arc<dyn Rule>, ctx: &RuleContext<'_>) -> RuleResult {
        let name = rule.name().to_string();
        let start = Instant::now();

        // Wrap in catch_unwind so one broken rule cannot take the run down
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rule.evaluate(ctx)));
        let duration = start.elapsed().as_micros() as u64;

        match outcome {
            Ok(Ok(findings)) => {
                debug!("Rule {} produced {} findings in {}us", name, findings.len(), duration);
                RuleResult::success(name, findings, duration)
            }
            Ok(Err(e)) => {
                error!("Rule {} failed: {:#}", name, e);
                RuleResult::failure(name, e.to_string(), duration)
            }
            Err(panic_info) => {
                let panic_msg = panic_message(panic_info.as_ref());
                error!("Rule {} panicked: {}", name, panic_msg);
                RuleResult::failure(name, format!("Panic: {}", panic_msg), duration)
            }
        }
    }
}

/// Text of a panic payload caught by `catch_unwind`
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Replace the default panic hook, which prints `thread 'main' panicked`
/// to stderr even when the panic is caught. Panics are recorded at debug
/// level instead; a rule's panic surfaces as its `error!` failure log.
pub fn install_quiet_panic_hook() {
    std::panic::set_hook(Box::new(|info| debug!("{}", info)));
}
