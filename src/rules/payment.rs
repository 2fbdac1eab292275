//! Payment rules
//!
//! Checks for the Mercado Pago integration: fraud-prevention device tokens,
//! webhook authenticity, idempotent payment creation and the PIX QR-code flow.
//! Most findings here are about approval rate and chargebacks rather than
//! crashes, so only the checks that let fraud or forged notifications through
//! are CRITICAL.

use crate::config::GateConfig;
use crate::models::Finding;
use crate::rules::base::{Rule, RuleContext};
use crate::rules::set::{Banner, Domain, RuleSet};
use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, OnceLock};

pub const KEYWORDS: &[&str] = &["payment", "checkout", "mercadopago", "pix", "webhook"];

/// Components every PIX checkout screen needs
const PIX_COMPONENTS: &[&str] = &["qrCode", "qrCodeBase64", "expirationTime", "polling"];

pub const DEFAULT_POLLING_INTERVAL_MS: usize = 5000;

static DEVICE_ID_GUARD: OnceLock<Regex> = OnceLock::new();
static RES_STATUS: OnceLock<Regex> = OnceLock::new();

fn device_id_guard() -> &'static Regex {
    DEVICE_ID_GUARD.get_or_init(|| {
        Regex::new(r"if\s*\(\s*!\s*(?:deviceId|device_id)\s*\)").expect("valid regex")
    })
}

fn res_status() -> &'static Regex {
    RES_STATUS.get_or_init(|| Regex::new(r"res\.status").expect("valid regex"))
}

pub struct DeviceFingerprintRule;

impl Rule for DeviceFingerprintRule {
    fn name(&self) -> &'static str {
        "device-fingerprint"
    }

    fn description(&self) -> &'static str {
        "Mercado Pago device ID present and guarded in checkout code"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        let text = &ctx.text;

        if text.contains_any_ci(&["payment", "checkout"])
            && !text.contains_any(&["MP_DEVICE_SESSION_ID", "deviceId"])
        {
            findings.push(Finding::critical(
                self.name(),
                "Device ID (MP_DEVICE_SESSION_ID) missing from checkout - without it Mercado Pago \
                 fraud scoring reduces the approval rate by up to 40%",
            ));
        }

        if text.contains_any(&["deviceId", "device_id"]) && !device_id_guard().is_match(text.raw())
        {
            findings.push(Finding::warning(
                self.name(),
                "Device ID is used without an `if (!deviceId)` guard - block submission until the \
                 fingerprint script has loaded",
            ));
        }

        Ok(findings)
    }
}

pub struct PlanPricingRule;

impl Rule for PlanPricingRule {
    fn name(&self) -> &'static str {
        "plan-pricing"
    }

    fn description(&self) -> &'static str {
        "Plan prices match the published Basic (R$ 5.00) and Premium (R$ 10.00) values"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        let text = &ctx.text;

        if text.contains_any_ci(&["basic", "básico"]) && !text.contains_any(&["5.00", "5,00", "500"]) {
            findings.push(Finding::warning(
                self.name(),
                "Basic plan referenced without its R$ 5.00 price",
            ));
        }

        if text.contains_ci("premium") && !text.contains_any(&["10.00", "10,00", "1000"]) {
            findings.push(Finding::warning(
                self.name(),
                "Premium plan referenced without its R$ 10.00 price",
            ));
        }

        Ok(findings)
    }
}

pub struct WebhookSignatureRule;

impl Rule for WebhookSignatureRule {
    fn name(&self) -> &'static str {
        "webhook-signature"
    }

    fn description(&self) -> &'static str {
        "Webhook handlers validate the notification signature"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !ctx.text.contains_ci("webhook") {
            return Ok(vec![]);
        }
        if ctx.text.contains_any_ci(&["validateHMAC", "x-signature"]) {
            return Ok(vec![]);
        }

        Ok(vec![Finding::critical(
            self.name(),
            "Webhook without HMAC signature validation (x-signature) - anyone can forge a \
             payment notification",
        )])
    }
}

pub struct WebhookResponseRule;

impl Rule for WebhookResponseRule {
    fn name(&self) -> &'static str {
        "webhook-response"
    }

    fn description(&self) -> &'static str {
        "Webhook handlers always acknowledge with HTTP 200"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !ctx.text.contains_ci("webhook") || ctx.text.contains("status(200)") {
            return Ok(vec![]);
        }

        Ok(ctx
            .text
            .first_match_line(res_status())
            .map(|line| {
                Finding::warning(
                    self.name(),
                    "Webhook must always return 200 - any other status makes Mercado Pago retry \
                     the notification",
                )
                .at_line(line)
            })
            .into_iter()
            .collect())
    }
}

pub struct IdempotencyKeyRule;

impl Rule for IdempotencyKeyRule {
    fn name(&self) -> &'static str {
        "idempotency-key"
    }

    fn description(&self) -> &'static str {
        "Payment creation sends an X-Idempotency-Key"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let text = &ctx.text;
        if text.contains("payment")
            && text.contains_ci("mercadopago")
            && !text.contains_ci("idempotency")
        {
            return Ok(vec![Finding::warning(
                self.name(),
                "Payment request without X-Idempotency-Key - a retried request can charge the \
                 customer twice",
            )]);
        }
        Ok(vec![])
    }
}

pub struct PixFlowRule {
    polling_interval_ms: usize,
}

impl PixFlowRule {
    pub fn new(polling_interval_ms: usize) -> Self {
        Self {
            polling_interval_ms,
        }
    }
}

impl Default for PixFlowRule {
    fn default() -> Self {
        Self::new(DEFAULT_POLLING_INTERVAL_MS)
    }
}

impl Rule for PixFlowRule {
    fn name(&self) -> &'static str {
        "pix-flow"
    }

    fn description(&self) -> &'static str {
        "PIX screens show a QR code, its expiration and poll the payment status"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        if !ctx.text.contains_ci("pix") {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();

        let missing = ctx.text.missing(PIX_COMPONENTS);
        if !missing.is_empty() {
            findings.push(Finding::warning(
                self.name(),
                format!("Incomplete PIX flow, missing: {}", missing.join(", ")),
            ));
        }

        let interval = self.polling_interval_ms.to_string();
        if ctx.text.contains_ci("polling") && !ctx.text.contains(&interval) {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "PIX status polling should run every {}ms",
                    self.polling_interval_ms
                ),
            ));
        }

        Ok(findings)
    }
}

pub struct PaymentErrorHandlingRule;

impl Rule for PaymentErrorHandlingRule {
    fn name(&self) -> &'static str {
        "payment-error-handling"
    }

    fn description(&self) -> &'static str {
        "Async payment calls are wrapped in try/catch and expose a loading state"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Finding>> {
        let text = &ctx.text;
        if !text.contains_any_ci(&["payment", "checkout"]) {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();

        if text.contains("async") && !(text.contains("try") && text.contains("catch")) {
            findings.push(Finding::warning(
                self.name(),
                "Async payment operation without try/catch - a failed charge must be reported \
                 to the customer",
            ));
        }

        if text.contains("useState") && !text.contains_ci("loading") {
            findings.push(Finding::warning(
                self.name(),
                "Payment component without a loading state - customers resubmit while waiting",
            ));
        }

        Ok(findings)
    }
}

/// All payment rules in evaluation order
pub fn rules(config: &GateConfig) -> Vec<Arc<dyn Rule>> {
    let interval =
        config.threshold_usize_or("pix-flow", "polling_interval_ms", DEFAULT_POLLING_INTERVAL_MS);

    vec![
        Arc::new(DeviceFingerprintRule),
        Arc::new(PlanPricingRule),
        Arc::new(WebhookSignatureRule),
        Arc::new(WebhookResponseRule),
        Arc::new(IdempotencyKeyRule),
        Arc::new(PixFlowRule::new(interval)),
        Arc::new(PaymentErrorHandlingRule),
    ]
}

pub fn rule_set(config: &GateConfig) -> Result<RuleSet> {
    RuleSet::builder(Domain::Payment)
        .keywords(KEYWORDS)
        .rules(super::registry::enabled_rules(config, rules(config)))
        .banner(Banner {
            icon: "💳",
            label: "payment flow",
            on_block: "Correction required - the approval rate will be impacted!",
            on_warn: "Consider fixing these to protect the approval rate",
        })
        .hint("checkout", "Remember: Device ID is mandatory for approval")
        .hint("webhook", "Remember: webhooks must always return 200")
        .hint("pix", "Remember: poll PIX status every 5 seconds")
        .build()
}
