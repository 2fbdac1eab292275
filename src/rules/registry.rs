//! Immutable registry of rule sets, built once per process
//!
//! Registration order is evaluation order: findings from several matching
//! sets are concatenated medical, then payment, then type-safety.

use crate::config::GateConfig;
use crate::error::GateError;
use crate::rules::base::Rule;
use crate::rules::set::{Domain, RuleSet};
use crate::rules::{medical, payment, typescript};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Drop rules switched off with `[rules.<name>] enabled = false`
pub fn enabled_rules(config: &GateConfig, rules: Vec<Arc<dyn Rule>>) -> Vec<Arc<dyn Rule>> {
    rules
        .into_iter()
        .filter(|rule| {
            let enabled = config.is_rule_enabled(rule.name());
            if !enabled {
                debug!("Rule {} disabled by config", rule.name());
            }
            enabled
        })
        .collect()
}

#[derive(Debug)]
pub struct RuleRegistry {
    sets: Vec<RuleSet>,
}

impl RuleRegistry {
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::new()
    }

    /// The three built-in rule sets with project config applied
    pub fn standard(config: &GateConfig, project_dir: &Path) -> Result<Self> {
        Self::builder()
            .set(medical::rule_set(config)?)
            .set(payment::rule_set(config)?)
            .set(typescript::rule_set(config, project_dir)?)
            .build()
    }

    pub fn sets(&self) -> &[RuleSet] {
        &self.sets
    }

    pub fn get(&self, domain: Domain) -> Option<&RuleSet> {
        self.sets.iter().find(|s| s.domain() == domain)
    }

    /// Every set claiming `path`, in registration order
    pub fn route(&self, path: &str) -> Vec<&RuleSet> {
        self.sets.iter().filter(|s| s.claims(path)).collect()
    }

    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(|s| s.rules().len()).sum()
    }
}

/// Builder for [`RuleRegistry`]
#[derive(Default)]
pub struct RuleRegistryBuilder {
    sets: Vec<RuleSet>,
}

impl RuleRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, set: RuleSet) -> Self {
        self.sets.push(set);
        self
    }

    /// Fails if two sets share a domain or two rules share a name
    pub fn build(self) -> Result<RuleRegistry> {
        let mut domains: Vec<Domain> = Vec::new();
        let mut names: Vec<&'static str> = Vec::new();

        for set in &self.sets {
            if domains.contains(&set.domain()) {
                return Err(GateError::Registry(format!(
                    "rule set '{}' registered twice",
                    set.domain()
                ))
                .into());
            }
            domains.push(set.domain());

            for rule in set.rules() {
                if names.contains(&rule.name()) {
                    return Err(GateError::Registry(format!(
                        "rule '{}' registered twice",
                        rule.name()
                    ))
                    .into());
                }
                names.push(rule.name());
            }
        }

        Ok(RuleRegistry { sets: self.sets })
    }
}
