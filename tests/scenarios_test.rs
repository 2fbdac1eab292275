//! End-to-end verdict scenarios through the public library API

use checkout_gate::config::GateConfig;
use checkout_gate::rules::{Domain, Evaluation, GateEngine};
use checkout_gate::{Outcome, Severity};
use std::path::Path;

fn engine() -> GateEngine {
    let mut config = GateConfig::default();
    config.type_check.enabled = false;
    GateEngine::from_config(&config, Path::new(".")).expect("standard registry")
}

fn evaluate(path: &str, content: &str) -> Evaluation {
    engine().evaluate(path, content)
}

fn rules_with(evaluation: &Evaluation, severity: Severity) -> Vec<String> {
    evaluation
        .findings()
        .filter(|f| f.severity == severity)
        .map(|f| f.rule.clone())
        .collect()
}

#[test]
fn medical_form_missing_fields_blocks_on_sanitization() {
    let evaluation = evaluate(
        "src/components/MedicalForm.jsx",
        "const MedicalForm = { fullName, dateOfBirth, emergencyContact, phone, relationship };",
    );

    assert_eq!(evaluation.verdict.outcome, Outcome::Block);
    assert_eq!(evaluation.exit_code(), 2);
    assert_eq!(
        rules_with(&evaluation, Severity::Critical),
        vec!["medical-data-sanitization"]
    );

    let structure: Vec<_> = evaluation
        .findings()
        .filter(|f| f.rule == "medical-form-structure")
        .collect();
    assert_eq!(structure.len(), 1);
    assert!(structure[0].message.contains("cpf, bloodType"));
}

#[test]
fn checkout_with_unguarded_device_id_warns() {
    let evaluation = evaluate("src/pages/checkout.js", "checkout deviceId");
    assert_eq!(evaluation.verdict.outcome, Outcome::Warn);
    assert_eq!(evaluation.exit_code(), 0);
    assert_eq!(rules_with(&evaluation, Severity::Warning), vec!["device-fingerprint"]);
}

#[test]
fn webhook_without_signature_blocks_regardless_of_content() {
    for content in [
        "webhook",
        "// webhook\nres.status(200).send(); const paid = true;",
        "export const webhookHandler = async () => { try { await process(); } catch (e) {} };",
    ] {
        let evaluation = evaluate("api/webhook.js", content);
        assert_eq!(evaluation.verdict.outcome, Outcome::Block, "{content}");
        assert!(rules_with(&evaluation, Severity::Critical).contains(&"webhook-signature".to_string()));
    }
}

#[test]
fn any_in_tsx_blocks_even_with_clean_naming() {
    let evaluation = evaluate(
        "src/components/Summary.tsx",
        "interface ISummaryProps { total: number }\ntype TRow = { id: string };\nconst rows: any = [];",
    );
    assert_eq!(evaluation.verdict.outcome, Outcome::Block);
    assert_eq!(rules_with(&evaluation, Severity::Critical), vec!["no-explicit-any"]);
    assert!(!rules_with(&evaluation, Severity::Warning).contains(&"naming-conventions".to_string()));
}

#[test]
fn complete_pix_flow_passes() {
    let evaluation = evaluate(
        "src/pix/status.js",
        "pix qrCode qrCodeBase64 expirationTime polling 5000",
    );
    assert_eq!(evaluation.verdict.outcome, Outcome::Pass);
    assert_eq!(evaluation.verdict.total(), 0);
    assert_eq!(evaluation.exit_code(), 0);
}

#[test]
fn unclaimed_paths_pass_without_running_rules() {
    for path in ["README.md", "src/styles/site.css", "public/index.html", ""] {
        let evaluation = evaluate(path, "webhook checkout const x: any = 1; @ts-ignore");
        assert!(!evaluation.is_applicable(), "{path}");
        assert_eq!(evaluation.verdict.outcome, Outcome::Pass);
        assert_eq!(evaluation.summary.rules_run, 0);
    }
}

#[test]
fn clean_typescript_passes() {
    let evaluation = evaluate(
        "src/utils/math.ts",
        "export const total = (a: number, b: number): number => a + b;\n",
    );
    assert!(evaluation.is_applicable());
    assert_eq!(evaluation.verdict.outcome, Outcome::Pass);
}

#[test]
fn evaluation_is_idempotent() {
    let engine = engine();
    let path = "src/payment/CheckoutForm.tsx";
    let content = "export function CheckoutForm(props) { console.log(user.cpf); const x = y as any; }";

    let first = engine.evaluate(path, content);
    let second = engine.evaluate(path, content);
    assert_eq!(first.verdict, second.verdict);
    assert_eq!(
        first.findings().collect::<Vec<_>>(),
        second.findings().collect::<Vec<_>>()
    );
}

#[test]
fn adding_a_critical_trigger_only_flips_to_block() {
    let path = "src/pix/status.js";
    let clean = "pix qrCode qrCodeBase64 expirationTime polling 5000";
    let before = evaluate(path, clean);
    assert_eq!(before.verdict.outcome, Outcome::Pass);

    let after = evaluate(path, &format!("{clean}\n// @ts-ignore\nconsole.log(user.cpf)"));
    // .js path and no medical keywords in the path: neither trigger is routed here
    assert_eq!(after.verdict.outcome, Outcome::Pass);

    let after = evaluate(path, &format!("{clean}\n// webhook"));
    assert_eq!(after.verdict.outcome, Outcome::Block);
    assert_eq!(rules_with(&after, Severity::Critical), vec!["webhook-signature"]);
    assert!(after.verdict.warnings.is_empty());
}

#[test]
fn warn_to_block_keeps_existing_warnings() {
    let path = "src/pages/checkout.js";
    let before = evaluate(path, "checkout deviceId");
    let after = evaluate(path, "checkout deviceId // webhook");

    assert_eq!(before.verdict.outcome, Outcome::Warn);
    assert_eq!(after.verdict.outcome, Outcome::Block);
    for warning in &before.verdict.warnings {
        assert!(after.verdict.warnings.contains(warning));
    }
}

#[test]
fn path_claimed_by_every_domain_reports_all() {
    let evaluation = evaluate(
        "src/payment/CheckoutForm.tsx",
        "export function CheckoutForm(props) { console.log('saving cpf', cpf); }",
    );
    let domains: Vec<_> = evaluation.domains.iter().map(|d| d.domain).collect();
    assert_eq!(domains, vec![Domain::Medical, Domain::Payment, Domain::TypeSafety]);

    let critical = rules_with(&evaluation, Severity::Critical);
    assert!(critical.contains(&"sensitive-data-logging".to_string()));
    assert!(critical.contains(&"device-fingerprint".to_string()));
    assert_eq!(evaluation.verdict.outcome, Outcome::Block);
}

#[test]
fn hardcoded_real_cpf_blocks_medical_files() {
    let evaluation = evaluate(
        "src/pages/EmergencyProfile.jsx",
        "const demo = { cpf: '529.982.247-25' };",
    );
    assert!(rules_with(&evaluation, Severity::Critical).contains(&"hardcoded-cpf".to_string()));

    let evaluation = evaluate(
        "src/pages/EmergencyProfile.jsx",
        "const demo = { cpf: '000.000.000-00' };",
    );
    assert!(!rules_with(&evaluation, Severity::Critical).contains(&"hardcoded-cpf".to_string()));
}

#[test]
fn tsconfig_with_strict_disabled_blocks() {
    let evaluation = evaluate(
        "tsconfig.json",
        "{ \"compilerOptions\": { \"strict\": false, \"noImplicitAny\": false } }",
    );
    assert_eq!(evaluation.verdict.outcome, Outcome::Block);
    assert_eq!(rules_with(&evaluation, Severity::Critical), vec!["strict-mode"]);
    assert_eq!(rules_with(&evaluation, Severity::Warning), vec!["strict-mode"]);
}
