//! Medical-data rules
//!
//! Emergency medical profiles carry health data, which LGPD treats as
//! sensitive personal data. These rules look for the structural fields of the
//! profile form and for the handling that law and UX demand around them.

use crate::config::GateConfig;
use crate::models::Finding;
use crate::patterns::{any_match, Pattern, SourceText};
use crate::rules::base::{Rule, RuleContext};
use crate::rules::set::{Banner, Domain, RuleSet};
use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const KEYWORDS: &[&str] = &["medical", "form", "profile", "emergency", "qrcode"];

const REQUIRED_FIELDS: &[&str] = &[
    "fullName",
    "cpf",
    "dateOfBirth",
    "bloodType",
    "emergencyContact",
    "phone",
    "relationship",
];

const BLOOD_TYPES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// (lowercase token, display name) pairs that must never reach a log line
const SENSITIVE_LOG_FIELDS: &[(&str, &str)] = &[
    ("cpf", "CPF"),
    ("bloodtype", "blood type"),
    ("blood_type", "blood type"),
    ("medical", "medical data"),
    ("allerg", "allergies"),
];

static CONSOLE_CALL: OnceLock<Regex> = OnceLock::new();
static CPF_LITERAL: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

fn console_call() -> &'static Regex {
    CONSOLE_CALL.get_or_init(|| {
        Regex::new(r"(?i)\bconsole\.(?:log|info|debug|warn|error|trace|table)\s*\(")
            .expect("valid regex")
    })
}

fn cpf_literal() -> &'static Regex {
    CPF_LITERAL.get_or_init(|| Regex::new(r"\b\d{3}\.\d{3}\.\d{3}-\d{2}\b").expect("valid regex"))
}

fn phone_regex() -> &'static Regex {
    PHONE_REGEX
        .get_or_init(|| Regex::new(r"(?i)regex.*phone|phone.*regex").expect("valid regex"))
}

/// Brazilian CPF check-digit validation
///
/// Accepts any formatting; only the digits are considered. Sequences of a
/// single repeated digit are structurally valid but reserved, and rejected.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    (9..11).all(|i| {
        let sum: u32 = (0..i).map(|j| digits[j] * ((i as u32 + 1) - j as u32)).sum();
        (sum * 10) % 11 % 10 == digits[i]
    })
}

/// Case-insensitive "content mentions any of these words" gate
fn mentions_any(text: &SourceText<'_>, words: &[&str]) -> bool {
    text.contains_any_ci(words)
}

pub struct MedicalFormStructureRule;

impl Rule for MedicalFormStructureRule {
    fn name(&self) -> &'static str {
        "medical-form-structure"
    }

    fn description(&self) -> &'static str {
        "Required emergency-profile fields and blood type validation"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        let missing = ctx.text.missing(REQUIRED_FIELDS);
        if !missing.is_empty() {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "Required emergency-profile fields missing: {} - responders rely on them",
                    missing.join(", ")
                ),
            ));
        }

        if ctx.text.contains("bloodType") && !ctx.text.contains_any(BLOOD_TYPES) {
            findings.push(Finding::warning(
                self.name(),
                "bloodType is not restricted to valid ABO/Rh values (A+, A-, B+, B-, AB+, AB-, O+, O-)",
            ));
        }

        Ok(findings)
    }
}

pub struct SanitizationRule;

impl Rule for SanitizationRule {
    fn name(&self) -> &'static str {
        "medical-data-sanitization"
    }

    fn description(&self) -> &'static str {
        "Medical form input must pass through a sanitizer"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !mentions_any(&ctx.text, &["medical", "form"]) {
            return Ok(vec![]);
        }

        let sanitizers = [Pattern::Literal("DOMPurify"), Pattern::Literal("sanitize")];
        if any_match(&sanitizers, &ctx.text) {
            return Ok(vec![]);
        }

        Ok(vec![Finding::critical(
            self.name(),
            "Medical data must be sanitized (DOMPurify) - unsanitized health data is an XSS \
             vector and an LGPD risk",
        )])
    }
}

pub struct SensitiveLoggingRule;

impl Rule for SensitiveLoggingRule {
    fn name(&self) -> &'static str {
        "sensitive-data-logging"
    }

    fn description(&self) -> &'static str {
        "Console output must not include CPF, blood type, allergies or other medical data"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let mut findings: Vec<Finding> = Vec::new();
        let mut reported: Vec<&str> = Vec::new();

        for (idx, line) in ctx.text.raw().lines().enumerate() {
            let Some(call) = console_call().find(line) else {
                continue;
            };
            let args = line[call.end()..].to_lowercase();

            for (token, display) in SENSITIVE_LOG_FIELDS {
                if args.contains(token) && !reported.contains(display) {
                    reported.push(*display);
                    findings.push(
                        Finding::critical(
                            self.name(),
                            format!(
                                "Do not log sensitive medical data ({}) - logs leak health data \
                                 outside LGPD controls",
                                display
                            ),
                        )
                        .at_line(idx as u32 + 1),
                    );
                }
            }
        }

        Ok(findings)
    }
}

pub struct HardcodedCpfRule;

impl Rule for HardcodedCpfRule {
    fn name(&self) -> &'static str {
        "hardcoded-cpf"
    }

    fn description(&self) -> &'static str {
        "Real (check-digit valid) CPF numbers committed to source"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        Ok(cpf_literal()
            .find_iter(ctx.text.raw())
            .filter(|m| is_valid_cpf(m.as_str()))
            .map(|m| {
                Finding::critical(
                    self.name(),
                    format!(
                        "Valid CPF {} hard-coded in source - real personal data in the \
                         repository is an LGPD violation; use 000.000.000-00 placeholders",
                        m.as_str()
                    ),
                )
                .at_line(ctx.text.line_of(m.start()))
            })
            .collect())
    }
}

pub struct LgpdComplianceRule;

impl Rule for LgpdComplianceRule {
    fn name(&self) -> &'static str {
        "lgpd-compliance"
    }

    fn description(&self) -> &'static str {
        "Consent, encrypted storage and right-to-erasure for health data"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !mentions_any(&ctx.text, &["medical", "profile"]) {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();

        if !ctx.text.contains_any_ci(&["consent", "termo"]) {
            findings.push(Finding::warning(
                self.name(),
                "LGPD: no consent term - health data requires explicit, specific consent",
            ));
        }

        if ctx.text.contains_any(&["localStorage", "sessionStorage"])
            && !ctx.text.contains_any_ci(&["encrypt", "crypto"])
        {
            findings.push(Finding::warning(
                self.name(),
                "LGPD: sensitive data in browser storage must be encrypted",
            ));
        }

        if !ctx.text.contains_any_ci(&["delete", "remove"]) {
            findings.push(Finding::warning(
                self.name(),
                "LGPD: no data deletion path - data subjects have a right to erasure",
            ));
        }

        Ok(findings)
    }
}

pub struct ValidationSchemaRule;

impl Rule for ValidationSchemaRule {
    fn name(&self) -> &'static str {
        "validation-schema"
    }

    fn description(&self) -> &'static str {
        "Zod schemas, CPF check digits and phone format validation"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !mentions_any(&ctx.text, &["form", "medical"]) {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();

        if !ctx.text.contains("z.object") && !ctx.text.contains_ci("zod") {
            findings.push(Finding::warning(
                self.name(),
                "Medical form has no Zod validation schema",
            ));
        }

        if ctx.text.contains_ci("cpf") && !ctx.text.contains_any(&["validateCPF", "validarCPF"]) {
            findings.push(Finding::warning(
                self.name(),
                "CPF must be validated with the full check-digit algorithm (validateCPF)",
            ));
        }

        if ctx.text.contains_any_ci(&["phone", "telefone"])
            && !Pattern::Regex(phone_regex()).is_match(&ctx.text)
        {
            findings.push(Finding::warning(
                self.name(),
                "Phone numbers must be validated against the (11) 98765-4321 format",
            ));
        }

        Ok(findings)
    }
}

pub struct EmergencyUxRule;

impl Rule for EmergencyUxRule {
    fn name(&self) -> &'static str {
        "emergency-ux"
    }

    fn description(&self) -> &'static str {
        "Legibility and feedback on emergency screens"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !mentions_any(&ctx.text, &["emergency", "emergência"]) {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();

        if ctx.text.contains_any(&["fontSize", "text-"])
            && ctx.text.contains_any(&["text-xs", "text-sm"])
        {
            findings.push(Finding::warning(
                self.name(),
                "Font too small for emergency use (minimum 16px)",
            ));
        }

        if ctx.text.contains_any(&["text-gray-400", "text-gray-500"]) {
            findings.push(Finding::warning(
                self.name(),
                "Low contrast text on an emergency screen (use WCAG AAA contrast)",
            ));
        }

        if !ctx.text.contains_any_ci(&["loading", "spinner"]) {
            findings.push(Finding::warning(
                self.name(),
                "No loading indicator - responders need clear feedback while data loads",
            ));
        }

        Ok(findings)
    }
}

pub struct OfflineSupportRule;

impl Rule for OfflineSupportRule {
    fn name(&self) -> &'static str {
        "offline-support"
    }

    fn description(&self) -> &'static str {
        "Offline availability of medical data behind the QR code"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !mentions_any(&ctx.text, &["medical", "qrcode"]) {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();

        if !ctx.text.contains_any_ci(&["offline", "cache"]) {
            findings.push(Finding::warning(
                self.name(),
                "No offline cache for medical data - emergencies happen without signal",
            ));
        }

        if !ctx.text.contains_any(&["serviceWorker", "service-worker"]) {
            findings.push(Finding::warning(
                self.name(),
                "Consider a Service Worker so the medical profile works offline",
            ));
        }

        Ok(findings)
    }
}

/// All medical rules in evaluation order
pub fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(MedicalFormStructureRule),
        Arc::new(SanitizationRule),
        Arc::new(SensitiveLoggingRule),
        Arc::new(HardcodedCpfRule),
        Arc::new(LgpdComplianceRule),
        Arc::new(ValidationSchemaRule),
        Arc::new(EmergencyUxRule),
        Arc::new(OfflineSupportRule),
    ]
}

pub fn rule_set(config: &GateConfig) -> Result<RuleSet> {
    RuleSet::builder(Domain::Medical)
        .keywords(KEYWORDS)
        .rules(super::registry::enabled_rules(config, rules()))
        .banner(Banner {
            icon: "🏥",
            label: "medical data",
            on_block: "Correction required - LGPD compliance at risk!",
            on_warn: "Consider fixing these for better compliance and UX",
        })
        .hint("form", "Remember: validate CPF with the full check-digit algorithm")
        .hint("profile", "Remember: sanitize every input field")
        .hint("emergency", "Remember: emergency screens must be clear and legible")
        .build()
}
