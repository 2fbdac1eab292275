//! Type-safety rules for TypeScript sources and `tsconfig.json`
//!
//! Escape hatches (`any`, suppression comments, double casts) are CRITICAL.
//! Style and completeness checks are WARNINGs. The heuristic counts
//! (non-null assertions, untyped functions) read their limits from config.

use crate::config::{GateConfig, TypeCheckConfig};
use crate::models::Finding;
use crate::patterns::{capture_all, capture_all_with_offset, count_matches, dynamic_regex};
use crate::rules::base::{Rule, RuleContext};
use crate::rules::set::{Banner, Domain, RuleSet};
use crate::rules::type_check::TypeCheckRule;
use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};

pub const SUFFIXES: &[&str] = &[".ts", ".tsx", "tsconfig.json"];

pub const DEFAULT_MAX_NON_NULL_ASSERTIONS: usize = 3;
pub const DEFAULT_MAX_UNTYPED_FUNCTIONS: usize = 5;

/// Compiler flags that should never be switched off
const STRICT_FLAGS: &[&str] = &[
    "strictNullChecks",
    "strictFunctionTypes",
    "strictBindCallApply",
    "noImplicitAny",
    "noImplicitThis",
];

/// Libraries whose named imports should come with their type packages
const TYPED_MODULES: &[&str] = &["react", "react-dom", "axios", "zod"];

static ANY_TYPE: OnceLock<Regex> = OnceLock::new();
static DOUBLE_CAST: OnceLock<Regex> = OnceLock::new();
static NON_NULL: OnceLock<Regex> = OnceLock::new();
static INTERFACE_DECL: OnceLock<Regex> = OnceLock::new();
static TYPE_ALIAS_DECL: OnceLock<Regex> = OnceLock::new();
static STRICT_OFF: OnceLock<Regex> = OnceLock::new();
static STRICT_FLAG_OFF: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
static UNTYPED_FUNCTION: OnceLock<Regex> = OnceLock::new();
static UNTYPED_ARROW: OnceLock<Regex> = OnceLock::new();
static CATCH_VAR: OnceLock<Regex> = OnceLock::new();
static NAMED_IMPORT: OnceLock<Regex> = OnceLock::new();

fn any_type() -> &'static Regex {
    ANY_TYPE.get_or_init(|| {
        Regex::new(r":\s*any\b|<any>|\bas\s+any\b|Array<any>|Promise<any>|\bany\[\]")
            .expect("valid regex")
    })
}

fn double_cast() -> &'static Regex {
    DOUBLE_CAST.get_or_init(|| Regex::new(r"\bas\s+unknown\s+as\b").expect("valid regex"))
}

fn non_null() -> &'static Regex {
    NON_NULL.get_or_init(|| Regex::new(r"\w+!\.").expect("valid regex"))
}

fn interface_decl() -> &'static Regex {
    INTERFACE_DECL.get_or_init(|| Regex::new(r"\binterface\s+(\w+)").expect("valid regex"))
}

fn type_alias_decl() -> &'static Regex {
    TYPE_ALIAS_DECL
        .get_or_init(|| Regex::new(r"\btype\s+(\w+)\s*(?:<[^>=]*>)?\s*=").expect("valid regex"))
}

fn strict_off() -> &'static Regex {
    STRICT_OFF.get_or_init(|| Regex::new(r#""strict"\s*:\s*false"#).expect("valid regex"))
}

fn strict_flags_off() -> &'static [(&'static str, Regex)] {
    STRICT_FLAG_OFF.get_or_init(|| {
        STRICT_FLAGS
            .iter()
            .map(|flag| {
                let re = Regex::new(&format!(r#""{}"\s*:\s*false"#, flag)).expect("valid regex");
                (*flag, re)
            })
            .collect()
    })
}

fn untyped_function() -> &'static Regex {
    UNTYPED_FUNCTION.get_or_init(|| {
        Regex::new(r"(?:async\s+)?function\s+\w+\([^)]*\)\s*\{").expect("valid regex")
    })
}

fn untyped_arrow() -> &'static Regex {
    UNTYPED_ARROW.get_or_init(|| {
        Regex::new(r"const\s+\w+\s*=\s*(?:async\s+)?\([^)]*\)\s*=>").expect("valid regex")
    })
}

/// `catch (e)` clauses only; `.catch(handler)` calls are promise chains
fn catch_var() -> &'static Regex {
    CATCH_VAR.get_or_init(|| {
        Regex::new(r"(?:^|[^.\w$])catch\s*\(\s*(\w+)\s*\)").expect("valid regex")
    })
}

fn named_import() -> &'static Regex {
    NAMED_IMPORT.get_or_init(|| {
        Regex::new(r#"import\s+\{[^}]+\}\s+from\s+["']([^"']+)["']"#).expect("valid regex")
    })
}

pub struct NoExplicitAnyRule;

impl Rule for NoExplicitAnyRule {
    fn name(&self) -> &'static str {
        "no-explicit-any"
    }

    fn description(&self) -> &'static str {
        "Forbids the `any` type in all its spellings"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        Ok(ctx
            .text
            .first_match_line(any_type())
            .map(|line| {
                Finding::critical(
                    self.name(),
                    "`any` type found - it switches off type checking and lets payment and \
                     medical data bugs through; use a concrete type or `unknown`",
                )
                .at_line(line)
            })
            .into_iter()
            .collect())
    }
}

pub struct TypeAssertionsRule {
    max_non_null_assertions: usize,
}

impl TypeAssertionsRule {
    pub fn new(max_non_null_assertions: usize) -> Self {
        Self {
            max_non_null_assertions,
        }
    }
}

impl Default for TypeAssertionsRule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NON_NULL_ASSERTIONS)
    }
}

impl Rule for TypeAssertionsRule {
    fn name(&self) -> &'static str {
        "type-assertions"
    }

    fn description(&self) -> &'static str {
        "Double casts, compiler suppressions and non-null assertion overuse"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        let raw = ctx.text.raw();

        if let Some(line) = ctx.text.first_match_line(double_cast()) {
            findings.push(
                Finding::critical(
                    self.name(),
                    "`as unknown as` double cast defeats the type checker - validate the value \
                     instead",
                )
                .at_line(line),
            );
        }

        for directive in ["@ts-ignore", "@ts-nocheck"] {
            if let Some(offset) = raw.find(directive) {
                findings.push(
                    Finding::critical(
                        self.name(),
                        format!("{} hides real type errors - fix the underlying error", directive),
                    )
                    .at_line(ctx.text.line_of(offset)),
                );
            }
        }

        let count = count_matches(non_null(), raw);
        if count > self.max_non_null_assertions {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "{} non-null assertions (`!.`), more than {} - handle the null case explicitly",
                    count, self.max_non_null_assertions
                ),
            ));
        }

        Ok(findings)
    }
}

pub struct NamingConventionsRule;

impl Rule for NamingConventionsRule {
    fn name(&self) -> &'static str {
        "naming-conventions"
    }

    fn description(&self) -> &'static str {
        "Interfaces are prefixed with I and type aliases with T"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let raw = ctx.text.raw();
        let mut findings = Vec::new();

        for (name, offset) in capture_all_with_offset(interface_decl(), raw, 1) {
            if !name.starts_with('I') {
                findings.push(
                    Finding::warning(
                        self.name(),
                        format!("Interface `{}` should be named `I{}`", name, name),
                    )
                    .at_line(ctx.text.line_of(offset)),
                );
            }
        }

        for (name, offset) in capture_all_with_offset(type_alias_decl(), raw, 1) {
            if !name.starts_with('T') {
                findings.push(
                    Finding::warning(
                        self.name(),
                        format!("Type alias `{}` should be named `T{}`", name, name),
                    )
                    .at_line(ctx.text.line_of(offset)),
                );
            }
        }

        Ok(findings)
    }
}

pub struct StrictModeRule;

impl Rule for StrictModeRule {
    fn name(&self) -> &'static str {
        "strict-mode"
    }

    fn description(&self) -> &'static str {
        "tsconfig keeps strict mode and its component flags enabled"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !ctx.path_ends_with("tsconfig.json") && !ctx.text.contains_ci("tsconfig") {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();

        if let Some(line) = ctx.text.first_match_line(strict_off()) {
            findings.push(
                Finding::critical(
                    self.name(),
                    "\"strict\": false disables the null and implicit-any checks the checkout \
                     relies on",
                )
                .at_line(line),
            );
        }

        for (flag, re) in strict_flags_off() {
            if let Some(line) = ctx.text.first_match_line(re) {
                findings.push(
                    Finding::warning(self.name(), format!("Compiler flag {} is disabled", flag))
                        .at_line(line),
                );
            }
        }

        Ok(findings)
    }
}

pub struct ExplicitReturnTypesRule {
    max_untyped_functions: usize,
}

impl ExplicitReturnTypesRule {
    pub fn new(max_untyped_functions: usize) -> Self {
        Self {
            max_untyped_functions,
        }
    }
}

impl Default for ExplicitReturnTypesRule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNTYPED_FUNCTIONS)
    }
}

impl Rule for ExplicitReturnTypesRule {
    fn name(&self) -> &'static str {
        "explicit-return-types"
    }

    fn description(&self) -> &'static str {
        "Functions declare their return types"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let raw = ctx.text.raw();
        let untyped = count_matches(untyped_function(), raw) + count_matches(untyped_arrow(), raw);

        if untyped > self.max_untyped_functions {
            return Ok(vec![Finding::warning(
                self.name(),
                format!(
                    "{} functions without an explicit return type (more than {})",
                    untyped, self.max_untyped_functions
                ),
            )]);
        }
        Ok(vec![])
    }
}

pub struct TypedErrorHandlingRule;

impl Rule for TypedErrorHandlingRule {
    fn name(&self) -> &'static str {
        "typed-error-handling"
    }

    fn description(&self) -> &'static str {
        "Caught errors are typed and promises have a rejection handler"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let raw = ctx.text.raw();
        let mut findings = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for (var, offset) in capture_all_with_offset(catch_var(), raw, 1) {
            if seen.contains(&var) {
                continue;
            }
            seen.push(var);

            let annotated = dynamic_regex(&format!(r"\b{}\s*:\s*\w+", regex::escape(var)))
                .map(|re| re.is_match(raw))
                .unwrap_or(false);
            if !annotated {
                findings.push(
                    Finding::warning(
                        self.name(),
                        format!(
                            "catch ({}) is untyped - narrow it (`{}: unknown` plus an instanceof \
                             check) before use",
                            var, var
                        ),
                    )
                    .at_line(ctx.text.line_of(offset)),
                );
            }
        }

        if ctx.text.contains("Promise") && !ctx.text.contains(".catch") && !ctx.text.contains("try")
        {
            findings.push(Finding::warning(
                self.name(),
                "Promise without .catch() or try/catch - rejections go unhandled",
            ));
        }

        Ok(findings)
    }
}

pub struct ModuleImportsRule;

impl Rule for ModuleImportsRule {
    fn name(&self) -> &'static str {
        "module-imports"
    }

    fn description(&self) -> &'static str {
        "ES module imports and type packages for common libraries"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        if ctx.path_ends_with(".tsx") && ctx.text.contains("require(") {
            findings.push(Finding::warning(
                self.name(),
                "require() in a .tsx file - use typed ES module imports",
            ));
        }

        if !ctx.text.contains("@types/") {
            let mut reported: Vec<&str> = Vec::new();
            for module in capture_all(named_import(), ctx.text.raw(), 1) {
                if TYPED_MODULES.contains(&module) && !reported.contains(&module) {
                    reported.push(module);
                    findings.push(Finding::warning(
                        self.name(),
                        format!("Make sure type definitions for '{}' are installed", module),
                    ));
                }
            }
        }

        Ok(findings)
    }
}

pub struct ComponentTypesRule;

impl Rule for ComponentTypesRule {
    fn name(&self) -> &'static str {
        "component-types"
    }

    fn description(&self) -> &'static str {
        "React components type their props and state and clean up effects"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !ctx.path_ends_with(".tsx") && !ctx.text.contains("React") {
            return Ok(vec![]);
        }

        let text = &ctx.text;
        let mut findings = Vec::new();

        if text.contains("props)") && !text.contains("props:") {
            findings.push(Finding::warning(
                self.name(),
                "Component props are untyped - declare a props interface",
            ));
        }

        if text.contains("useState(") && !text.contains("useState<") {
            findings.push(Finding::warning(
                self.name(),
                "useState without a type parameter - use useState<T>()",
            ));
        }

        if text.contains_any(&["setInterval", "addEventListener"]) && !text.contains("return () =>")
        {
            findings.push(Finding::warning(
                self.name(),
                "Timer or listener registered without a cleanup (`return () => ...`) - it leaks \
                 after unmount",
            ));
        }

        Ok(findings)
    }
}

/// All type-safety rules in evaluation order; the external type check runs last
pub fn rules(config: &GateConfig, project_dir: &Path) -> Vec<Arc<dyn Rule>> {
    let max_non_null = config.threshold_usize_or(
        "type-assertions",
        "max_non_null_assertions",
        DEFAULT_MAX_NON_NULL_ASSERTIONS,
    );
    let max_untyped = config.threshold_usize_or(
        "explicit-return-types",
        "max_untyped_functions",
        DEFAULT_MAX_UNTYPED_FUNCTIONS,
    );
    let type_check: TypeCheckConfig = config.type_check.clone();

    vec![
        Arc::new(NoExplicitAnyRule),
        Arc::new(TypeAssertionsRule::new(max_non_null)),
        Arc::new(NamingConventionsRule),
        Arc::new(StrictModeRule),
        Arc::new(ExplicitReturnTypesRule::new(max_untyped)),
        Arc::new(TypedErrorHandlingRule),
        Arc::new(ModuleImportsRule),
        Arc::new(ComponentTypesRule),
        Arc::new(TypeCheckRule::new(type_check, project_dir)),
    ]
}

pub fn rule_set(config: &GateConfig, project_dir: &Path) -> Result<RuleSet> {
    RuleSet::builder(Domain::TypeSafety)
        .suffixes(SUFFIXES)
        .rules(super::registry::enabled_rules(config, rules(config, project_dir)))
        .banner(Banner {
            icon: "📘",
            label: "TypeScript",
            on_block: "Correction required - type safety at risk!",
            on_warn: "Consider fixing these for better type safety",
        })
        .hint(".tsx", "Remember: components need typed props")
        .hint("schema", "Remember: use Zod for runtime validation")
        .hint("api", "Remember: type every request and response")
        .build()
}
