//! Compliance rules
//!
//! A [`Rule`] inspects one file's path and raw text and returns findings.
//! Rules are grouped into domain [`RuleSet`]s (medical data, payment,
//! type safety) that claim paths by keyword or suffix. The [`RuleRegistry`]
//! holds the sets and the [`GateEngine`] runs every claiming set, isolating
//! failures per rule.
//!
//! # Adding a rule
//!
//! 1. Implement [`Rule`] in the domain module
//! 2. Add it to that module's `rules()` list; list order is report order
//! 3. Thresholds come from `GateConfig::threshold_usize_or`

pub mod base;
pub mod engine;
pub mod external_tool;
pub mod medical;
pub mod payment;
pub mod registry;
pub mod set;
pub mod type_check;
pub mod typescript;

pub use base::{Rule, RuleContext, RuleResult, RunSummary};
pub use engine::{install_quiet_panic_hook, panic_message, DomainEvaluation, Evaluation, GateEngine};
pub use external_tool::{run_external_tool, ExternalToolResult};
pub use registry::{enabled_rules, RuleRegistry, RuleRegistryBuilder};
pub use set::{Banner, Domain, Route, RuleSet, RuleSetBuilder};
pub use type_check::TypeCheckRule;
