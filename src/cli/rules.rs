//! Rules command - list rule sets and their rules

use crate::config::GateConfig;
use crate::reporters::OutputFormat;
use crate::rules::{Route, RuleRegistry};
use anyhow::Result;
use console::style;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Serialize)]
struct RuleEntry {
    name: &'static str,
    description: &'static str,
    enabled: bool,
}

#[derive(Serialize)]
struct RuleSetEntry {
    domain: &'static str,
    route: Route,
    rules: Vec<RuleEntry>,
}

/// Every rule set with all of its rules, disabled ones included
fn catalogue(project_dir: &Path, config: &GateConfig) -> Result<Vec<RuleSetEntry>> {
    let unfiltered = GateConfig {
        rules: HashMap::new(),
        ..config.clone()
    };
    let registry = RuleRegistry::standard(&unfiltered, project_dir)?;

    Ok(registry
        .sets()
        .iter()
        .map(|set| RuleSetEntry {
            domain: set.domain().as_str(),
            route: set.route().clone(),
            rules: set
                .rules()
                .iter()
                .map(|rule| RuleEntry {
                    name: rule.name(),
                    description: rule.description(),
                    enabled: config.is_rule_enabled(rule.name()),
                })
                .collect(),
        })
        .collect())
}

fn render_text(entries: &[RuleSetEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let route = match &entry.route {
            Route::Keywords(words) => format!("paths containing {}", words.join(", ")),
            Route::Suffixes(suffixes) => format!("paths ending in {}", suffixes.join(", ")),
        };
        out.push_str(&format!(
            "\n{} ({})\n",
            style(entry.domain).bold(),
            style(route).dim()
        ));
        for rule in &entry.rules {
            let status = if rule.enabled {
                String::new()
            } else {
                format!(" {}", style("[disabled]").yellow())
            };
            out.push_str(&format!(
                "  {:<28} {}{}\n",
                rule.name, rule.description, status
            ));
        }
    }
    out
}

pub fn run(project_dir: &Path, config: &GateConfig, format: &str) -> Result<()> {
    let entries = catalogue(project_dir, config)?;
    match format.parse::<OutputFormat>()? {
        OutputFormat::Text => print!("{}", render_text(&entries)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(())
}
