//! Project-level configuration support
//!
//! Loads per-project configuration from `checkout-gate.toml` or
//! `.checkout-gate.json` in the project directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # checkout-gate.toml
//!
//! [rules.type-assertions]
//! thresholds = { max_non_null_assertions = 5 }
//!
//! [rules.offline-support]
//! enabled = false
//!
//! [type_check]
//! command = ["npm", "run", "type-check"]
//! min_lines = 50
//! timeout_secs = 30
//!
//! [exclude]
//! paths = ["src/generated/**"]
//!
//! [output]
//! hints = true
//! ```
//!
//! Severity is deliberately not configurable: which findings gate an edit
//! is fixed by the rules themselves.

use crate::error::{GateError, GateResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Preferred config file name
pub const CONFIG_FILE_NAME: &str = "checkout-gate.toml";
/// JSON alternative
pub const JSON_CONFIG_FILE_NAME: &str = ".checkout-gate.json";

/// Built-in exclusions for build output and vendored code.
/// Applied unless `skip_defaults = true`.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/.next/**",
    "**/*.min.js",
];

/// Written by `checkout-gate init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# checkout-gate configuration
#
# Only CRITICAL findings block an edit; WARNINGs are advisory.
# Rule names are listed by `checkout-gate rules`.

# [rules.type-assertions]
# thresholds = { max_non_null_assertions = 3 }

# [rules.explicit-return-types]
# thresholds = { max_untyped_functions = 5 }

# [rules.pix-flow]
# thresholds = { polling_interval_ms = 5000 }

# [rules.offline-support]
# enabled = false

[type_check]
# External type check, run only for edits longer than `min_lines` lines.
# A missing tool or a timeout never blocks the edit.
enabled = true
command = ["npm", "run", "type-check"]
min_lines = 50
timeout_secs = 30

[exclude]
# Extra glob patterns to skip (defaults: node_modules, dist, .next, *.min.js)
paths = []

[output]
# Print contextual reminders after a passing run
hints = true
no_emoji = false
"#;

/// Project-level configuration loaded from checkout-gate.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GateConfig {
    /// Per-rule configuration overrides
    #[serde(default)]
    pub rules: HashMap<String, RuleConfigOverride>,

    /// External type-check subprocess settings
    #[serde(default)]
    pub type_check: TypeCheckConfig,

    /// Path exclusion patterns
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration override for a specific rule
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleConfigOverride {
    /// Whether the rule is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Rule-specific threshold overrides
    #[serde(default)]
    pub thresholds: HashMap<String, ThresholdValue>,
}

/// A threshold value can be an integer, float, boolean or string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl ThresholdValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v),
            ThresholdValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThresholdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdValue::Integer(v) => write!(f, "{}", v),
            ThresholdValue::Float(v) => write!(f, "{}", v),
            ThresholdValue::Boolean(v) => write!(f, "{}", v),
            ThresholdValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// External type-check settings
#[derive(Debug, Clone, Deserialize)]
pub struct TypeCheckConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Program and arguments
    #[serde(default = "default_type_check_command")]
    pub command: Vec<String>,

    /// Only run when the edited content has more lines than this
    #[serde(default = "default_min_lines")]
    pub min_lines: usize,

    /// Seconds before the subprocess is killed; 0 falls back to the default
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TypeCheckConfig {
    /// Effective timeout. A zero value would mean an unbounded run, so it is
    /// replaced by the default.
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            warn!(
                "type_check.timeout_secs = 0 is not allowed, using {}s",
                default_timeout_secs()
            );
            return Duration::from_secs(default_timeout_secs());
        }
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TypeCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_type_check_command(),
            min_lines: default_min_lines(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_type_check_command() -> Vec<String> {
    vec!["npm".to_string(), "run".to_string(), "type-check".to_string()]
}

fn default_min_lines() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    30
}

/// Path exclusion configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExcludeConfig {
    #[serde(default)]
    pub paths: Vec<String>,

    /// If true, disable built-in default exclusion patterns
    #[serde(default)]
    pub skip_defaults: bool,
}

impl ExcludeConfig {
    /// Effective exclusion patterns (defaults + user patterns)
    pub fn effective_patterns(&self) -> Vec<String> {
        let mut patterns = Vec::new();

        if !self.skip_defaults {
            patterns.extend(DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()));
        }

        for p in &self.paths {
            if !patterns.contains(p) {
                patterns.push(p.clone());
            }
        }

        patterns
    }

    /// Whether a project-relative path is covered by any exclusion pattern
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.effective_patterns()
            .iter()
            .any(|pattern| glob_match(pattern, relative_path))
    }
}

/// Output preferences
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub hints: bool,

    #[serde(default)]
    pub no_emoji: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            hints: true,
            no_emoji: false,
        }
    }
}

/// Load project configuration from the project directory.
///
/// Tries `checkout-gate.toml`, then `.checkout-gate.json`. A missing or
/// broken file yields defaults: configuration problems never block an edit.
pub fn load_gate_config(project_dir: &Path) -> GateConfig {
    let toml_path = project_dir.join(CONFIG_FILE_NAME);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded gate config from {}", toml_path.display());
                return config;
            }
            Err(e) => warn!("{}", e),
        }
    }

    let json_path = project_dir.join(JSON_CONFIG_FILE_NAME);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded gate config from {}", json_path.display());
                return config;
            }
            Err(e) => warn!("{}", e),
        }
    }

    debug!("No gate config found, using defaults");
    GateConfig::default()
}

fn load_toml_config(path: &Path) -> GateResult<GateConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GateError::config(path, e))?;
    toml::from_str(&content).map_err(|e| GateError::config(path, e))
}

fn load_json_config(path: &Path) -> GateResult<GateConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GateError::config(path, e))?;
    serde_json::from_str(&content).map_err(|e| GateError::config(path, e))
}

impl GateConfig {
    /// Parse a TOML document directly
    pub fn from_toml_str(content: &str) -> GateResult<Self> {
        toml::from_str(content).map_err(|e| GateError::config(Path::new("<inline>"), e))
    }

    fn rule_override(&self, name: &str) -> Option<&RuleConfigOverride> {
        let normalized = normalize_rule_name(name);
        self.rules.get(&normalized).or_else(|| {
            self.rules
                .iter()
                .find(|(key, _)| normalize_rule_name(key) == normalized)
                .map(|(_, c)| c)
        })
    }

    /// Check if a rule is enabled (defaults to true if not specified)
    pub fn is_rule_enabled(&self, name: &str) -> bool {
        self.rule_override(name)
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    pub fn threshold(&self, rule_name: &str, threshold_name: &str) -> Option<&ThresholdValue> {
        self.rule_override(rule_name)
            .and_then(|c| c.thresholds.get(threshold_name))
    }

    /// Non-negative integer threshold, falling back to `default`
    pub fn threshold_usize_or(&self, rule_name: &str, threshold_name: &str, default: usize) -> usize {
        let Some(value) = self.threshold(rule_name, threshold_name) else {
            return default;
        };
        match value.as_i64() {
            Some(v) if v >= 0 => v as usize,
            _ => {
                warn!(
                    "Ignoring threshold {}.{} = {}: expected a non-negative number",
                    rule_name, threshold_name, value
                );
                default
            }
        }
    }
}

/// Normalize a rule name for config lookup
///
/// `NoExplicitAny`, `no_explicit_any` and `no-explicit-any` all map to
/// `no-explicit-any`.
pub fn normalize_rule_name(name: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_is_lower = i > 0 && chars[i - 1].is_lowercase();
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else if *c == '_' {
            result.push('-');
        } else {
            result.push(*c);
        }
    }

    result
}

/// Match a project-relative path against an exclusion glob
///
/// Patterns are matched segment by segment on `/`-separated paths:
/// - `**` spans any number of segments, including none
/// - `*` and `?` match within one segment
/// - a trailing `/`, or a pattern with no wildcard, also matches everything
///   below that directory
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let path = normalize_separators(path);
    let path: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let trimmed = pattern.trim_start_matches("./");
    let directory = trimmed.ends_with('/') || !trimmed.contains(['*', '?']);
    let pattern: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    if pattern.is_empty() {
        return false;
    }

    if match_segments(&pattern, &path) {
        return true;
    }
    directory && path.len() > pattern.len() && match_segments(&pattern, &path[..pattern.len()])
}

fn normalize_separators(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.strip_prefix("./").map(str::to_string).unwrap_or(path)
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Some((first, rest)) => match path.split_first() {
            Some((segment, remaining)) => {
                match_segment(first.as_bytes(), segment.as_bytes()) && match_segments(rest, remaining)
            }
            None => false,
        },
    }
}

fn match_segment(pattern: &[u8], segment: &[u8]) -> bool {
    match pattern.split_first() {
        None => segment.is_empty(),
        Some((b'*', rest)) => (0..=segment.len()).any(|skip| match_segment(rest, &segment[skip..])),
        Some((b'?', rest)) => !segment.is_empty() && match_segment(rest, &segment[1..]),
        Some((c, rest)) => segment.first() == Some(c) && match_segment(rest, &segment[1..]),
    }
}
