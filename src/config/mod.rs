//! Configuration module for checkout-gate
//!
//! This module handles:
//! - Project-level configuration (checkout-gate.toml)
//! - Per-rule enable flags and threshold overrides
//! - External type-check settings
//! - Path exclusions

mod gate_config;

pub use gate_config::{
    glob_match, load_gate_config, normalize_rule_name, ExcludeConfig, GateConfig, OutputConfig,
    RuleConfigOverride, ThresholdValue, TypeCheckConfig, CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE,
    JSON_CONFIG_FILE_NAME,
};
