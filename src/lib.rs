//! checkout-gate - edit-time compliance gate for a web checkout
//!
//! Each invocation inspects one edited file and returns a verdict:
//! PASS and WARN allow the edit (exit 0), BLOCK stops it (exit 2), and
//! tooling faults exit 1. Rules are plain text scans grouped by domain
//! (medical data, payment, type safety) and routed by path.

pub mod cli;
pub mod config;
pub mod error;
pub mod hook;
pub mod models;
pub mod patterns;
pub mod reporters;
pub mod rules;

pub use error::{GateError, GateResult};
pub use models::{Finding, Outcome, Severity, Verdict, EXIT_ALLOW, EXIT_BLOCK, EXIT_FATAL};
