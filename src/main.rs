//! checkout-gate binary

use checkout_gate::{cli, rules};
use checkout_gate::models::{EXIT_ALLOW, EXIT_FATAL};
use clap::Parser;
use std::panic::AssertUnwindSafe;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Usage errors must not exit 2, which the host reads as a blocked edit
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_FATAL } else { EXIT_ALLOW };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Logs go to stderr; stdout carries the verdict. RUST_LOG overrides --log-level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    // A panic must not leak exit code 101 to the host
    rules::install_quiet_panic_hook();
    let code = match std::panic::catch_unwind(AssertUnwindSafe(|| cli::run(cli))) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            eprintln!("error: {:#}", e);
            EXIT_FATAL
        }
        Err(payload) => {
            eprintln!("error: internal error: {}", rules::panic_message(payload.as_ref()));
            EXIT_FATAL
        }
    };
    std::process::exit(code);
}
