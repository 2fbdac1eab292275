//! Hook contract tests
//!
//! Runs the binary the way the host does: one JSON event on stdin, verdict
//! in the exit code (0 allow, 2 block, 1 tooling error).

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn gate_bin() -> &'static str {
    env!("CARGO_BIN_EXE_checkout-gate")
}

struct Run {
    code: i32,
    stdout: String,
    stderr: String,
}

/// Project dir with the external type check switched off
fn setup_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("checkout-gate.toml"),
        "[type_check]\nenabled = false\n",
    )
    .unwrap();
    dir
}

fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn run_gate(dir: &Path, args: &[&str], stdin: &str) -> Run {
    let mut child = Command::new(gate_bin())
        .arg("--project-dir")
        .arg(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run checkout-gate");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    Run {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

fn hook(dir: &Path, file_path: &str) -> Run {
    let event = serde_json::json!({
        "tool_name": "Write",
        "tool_input": { "file_path": file_path }
    });
    run_gate(dir, &[], &event.to_string())
}

#[test]
fn test_unrelated_path_is_silent() {
    let dir = setup_project();
    write_file(dir.path(), "docs/notes.md", "const x: any = 1;");

    let run = hook(dir.path(), "docs/notes.md");
    assert_eq!(run.code, 0);
    assert!(run.stdout.is_empty(), "stdout: {}", run.stdout);
    assert!(run.stderr.is_empty(), "stderr: {}", run.stderr);
}

#[test]
fn test_unrelated_missing_file_is_not_an_error() {
    let dir = setup_project();
    let run = hook(dir.path(), "styles/removed.css");
    assert_eq!(run.code, 0);
}

#[test]
fn test_medical_form_blocks() {
    let dir = setup_project();
    write_file(
        dir.path(),
        "src/components/MedicalForm.jsx",
        "const MedicalForm = { fullName, dateOfBirth, emergencyContact, phone, relationship };",
    );

    let run = hook(dir.path(), "src/components/MedicalForm.jsx");
    assert_eq!(run.code, 2);
    assert!(run.stderr.contains("[medical-data-sanitization]"));
    assert!(run.stderr.contains("LGPD"));
    assert!(run.stdout.contains("cpf, bloodType"));
}

#[test]
fn test_checkout_warning_allows() {
    let dir = setup_project();
    write_file(dir.path(), "src/pages/checkout.js", "checkout deviceId");

    let run = hook(dir.path(), "src/pages/checkout.js");
    assert_eq!(run.code, 0);
    assert!(run.stdout.contains("[device-fingerprint]"));
    assert!(run.stderr.is_empty(), "stderr: {}", run.stderr);
}

#[test]
fn test_webhook_without_signature_blocks() {
    let dir = setup_project();
    write_file(
        dir.path(),
        "api/webhook.js",
        "export default function handler(req, res) { res.status(200).end(); } // webhook",
    );

    let run = hook(dir.path(), "api/webhook.js");
    assert_eq!(run.code, 2);
    assert!(run.stderr.contains("[webhook-signature]"));
}

#[test]
fn test_any_in_tsx_blocks() {
    let dir = setup_project();
    write_file(
        dir.path(),
        "src/components/Button.tsx",
        "interface IButtonProps { label: string }\nexport function Button(props: any) { return null; }",
    );

    let run = hook(dir.path(), "src/components/Button.tsx");
    assert_eq!(run.code, 2);
    assert!(run.stderr.contains("[no-explicit-any]"));
}

#[test]
fn test_complete_pix_flow_passes() {
    let dir = setup_project();
    write_file(
        dir.path(),
        "src/pix/status.js",
        "pix qrCode qrCodeBase64 expirationTime polling 5000",
    );

    let run = hook(dir.path(), "src/pix/status.js");
    assert_eq!(run.code, 0);
    assert!(run.stdout.contains("checks passed"));
    assert!(run.stdout.contains("Remember: poll PIX status every 5 seconds"));
}

#[test]
fn test_absolute_path_and_crlf() {
    let dir = setup_project();
    write_file(dir.path(), "src/pix/status.js", "pix qrCode qrCodeBase64\r\nexpirationTime polling 5000\r\n");
    let absolute = dir.path().join("src/pix/status.js");

    let run = hook(dir.path(), absolute.to_str().unwrap());
    assert_eq!(run.code, 0);
}

#[test]
fn test_malformed_event_is_fatal() {
    let dir = setup_project();
    let run = run_gate(dir.path(), &[], "{\"tool_input\": ");
    assert_eq!(run.code, 1);
    assert!(run.stderr.contains("malformed hook event"));
}

#[test]
fn test_event_without_path_is_silent() {
    let dir = setup_project();
    let run = run_gate(dir.path(), &[], r#"{"tool_name":"Bash","tool_input":{"command":"ls"}}"#);
    assert_eq!(run.code, 0);
    assert!(run.stdout.is_empty());
}

#[test]
fn test_unreadable_claimed_file_is_fatal() {
    let dir = setup_project();
    let run = hook(dir.path(), "src/pages/checkout.tsx");
    assert_eq!(run.code, 1);
    assert!(run.stderr.contains("failed to read"));
}

#[test]
fn test_disabled_rule_via_config() {
    let dir = setup_project();
    std::fs::write(
        dir.path().join("checkout-gate.toml"),
        "[type_check]\nenabled = false\n\n[rules.webhook-signature]\nenabled = false\n",
    )
    .unwrap();
    write_file(dir.path(), "api/webhook.js", "// webhook\nres.status(200)");

    let run = hook(dir.path(), "api/webhook.js");
    assert_eq!(run.code, 0);
}

#[test]
fn test_excluded_path_is_silent() {
    let dir = setup_project();
    write_file(dir.path(), "node_modules/sdk/payment.ts", "let a: any;");

    let run = hook(dir.path(), "node_modules/sdk/payment.ts");
    assert_eq!(run.code, 0);
    assert!(run.stdout.is_empty());
}

#[test]
fn test_user_exclude_applies_to_absolute_paths() {
    let dir = setup_project();
    std::fs::write(
        dir.path().join("checkout-gate.toml"),
        "[type_check]\nenabled = false\n\n[exclude]\npaths = [\"src/generated/**\"]\n",
    )
    .unwrap();
    write_file(dir.path(), "src/generated/api.ts", "let a: any;");
    write_file(dir.path(), "src/lib/api.ts", "let a: any;");

    let excluded = dir.path().join("src/generated/api.ts");
    let run = hook(dir.path(), excluded.to_str().unwrap());
    assert_eq!(run.code, 0);
    assert!(run.stdout.is_empty(), "stdout: {}", run.stdout);
    assert!(run.stderr.is_empty(), "stderr: {}", run.stderr);

    let run = hook(dir.path(), "src/generated/api.ts");
    assert_eq!(run.code, 0);

    let checked = dir.path().join("src/lib/api.ts");
    let run = hook(dir.path(), checked.to_str().unwrap());
    assert_eq!(run.code, 2);
    assert!(run.stderr.contains("[no-explicit-any]"));
}

#[test]
fn test_check_command_json() {
    let dir = setup_project();
    write_file(dir.path(), "api/webhook.js", "// webhook\nres.status(200)");

    let run = run_gate(
        dir.path(),
        &["check", "api/webhook.js", "--format", "json"],
        "",
    );
    assert_eq!(run.code, 2);
    let parsed: serde_json::Value = serde_json::from_str(&run.stdout).expect("Invalid JSON");
    assert_eq!(parsed["outcome"], "BLOCK");
    assert_eq!(parsed["exit_code"], 2);
    assert_eq!(parsed["domains"][0], "payment");
}

#[test]
fn test_check_command_domain_filter() {
    let dir = setup_project();
    write_file(
        dir.path(),
        "src/payment/CheckoutForm.tsx",
        "export const CheckoutForm = (props: any) => null;",
    );

    let run = run_gate(
        dir.path(),
        &["--no-emoji", "check", "src/payment/CheckoutForm.tsx", "--domain", "typescript"],
        "",
    );
    assert_eq!(run.code, 2);
    assert!(run.stdout.starts_with("Validating TypeScript:"));
    assert!(!run.stdout.contains("payment flow"));
}

#[test]
fn test_rules_command_json() {
    let dir = setup_project();
    let run = run_gate(dir.path(), &["rules", "--format", "json"], "");
    assert_eq!(run.code, 0);

    let sets: Vec<serde_json::Value> = serde_json::from_str(&run.stdout).expect("Invalid JSON");
    let domains: Vec<_> = sets.iter().map(|s| s["domain"].as_str().unwrap()).collect();
    assert_eq!(domains, vec!["medical", "payment", "typescript"]);
}

#[test]
fn test_usage_error_is_not_a_block() {
    let dir = setup_project();
    let run = run_gate(dir.path(), &["check"], "");
    assert_eq!(run.code, 1);
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_gate(dir.path(), &["init"], "");
    assert_eq!(run.code, 0);
    assert!(dir.path().join("checkout-gate.toml").exists());
}
