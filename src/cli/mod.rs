//! CLI command definitions and handlers

mod check;
mod hook;
mod init;
mod rules;

use crate::config::{load_gate_config, GateConfig};
use crate::reporters::TextOptions;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// checkout-gate - edit-time compliance gate
///
/// Reads an edit event on stdin and blocks edits that break medical-data,
/// payment or type-safety rules.
#[derive(Parser, Debug)]
#[command(name = "checkout-gate")]
#[command(
    version,
    about = "Edit-time compliance gate for medical-data, payment and TypeScript rules",
    long_about = "checkout-gate inspects the content of an edited file and decides whether \
the edit may proceed.\n\n\
Exit codes:\n  \
0  allowed (PASS, WARN, or no rule set applies)\n  \
2  blocked (at least one CRITICAL finding)\n  \
1  tooling error (malformed event, unreadable file)\n\n\
Run without a subcommand to read a hook event from stdin.",
    after_help = "\
Examples:
  echo '{\"tool_input\":{\"file_path\":\"src/pages/checkout.tsx\"}}' | checkout-gate
  checkout-gate check src/components/MedicalForm.tsx
  checkout-gate check src/api/webhook.ts --format json
  checkout-gate rules
  checkout-gate init"
)]
pub struct Cli {
    /// Project directory holding checkout-gate.toml; relative paths resolve here
    #[arg(
        long,
        global = true,
        env = "CHECKOUT_GATE_PROJECT_DIR",
        default_value = "."
    )]
    pub project_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Plain text markers instead of emoji
    #[arg(long, global = true)]
    pub no_emoji: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read a hook event from stdin and gate the edited file (default)
    Hook,

    #[command(after_help = "\
Examples:
  checkout-gate check src/pages/checkout.tsx
  checkout-gate check src/pages/checkout.tsx --domain payment
  checkout-gate check tsconfig.json --format json")]
    /// Gate a file directly, without a hook event
    Check {
        /// File to check
        file: PathBuf,

        /// Only run one rule set (medical, payment, typescript)
        #[arg(long, value_parser = ["medical", "payment", "typescript", "ts"])]
        domain: Option<String>,

        /// Output format
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// List rule sets, their routing and rules
    Rules {
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Write a checkout-gate.toml with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Project config, with the command line taking precedence over `[output]`
    fn load_config(&self) -> GateConfig {
        let mut config = load_gate_config(&self.project_dir);
        if self.no_emoji {
            config.output.no_emoji = true;
        }
        config
    }
}

fn text_options(config: &GateConfig) -> TextOptions {
    TextOptions {
        emoji: !config.output.no_emoji,
        hints: config.output.hints,
    }
}

/// Run the CLI and return the process exit code
pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        None | Some(Commands::Hook) => {
            let config = cli.load_config();
            hook::run(&cli.project_dir, &config, std::io::stdin().lock())
        }
        Some(Commands::Check {
            file,
            domain,
            format,
        }) => {
            let config = cli.load_config();
            check::run(
                &cli.project_dir,
                &config,
                file,
                domain.as_deref(),
                format,
            )
        }
        Some(Commands::Rules { format }) => {
            let config = cli.load_config();
            rules::run(&cli.project_dir, &config, format)?;
            Ok(crate::models::EXIT_ALLOW)
        }
        Some(Commands::Init { force }) => {
            init::run(&cli.project_dir, *force)?;
            Ok(crate::models::EXIT_ALLOW)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_hook() {
        let cli = Cli::try_parse_from(["checkout-gate"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_check_args() {
        let cli = Cli::try_parse_from([
            "checkout-gate",
            "--no-emoji",
            "check",
            "src/a.tsx",
            "--domain",
            "payment",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(cli.no_emoji);
        match cli.command {
            Some(Commands::Check { domain, format, .. }) => {
                assert_eq!(domain.as_deref(), Some("payment"));
                assert_eq!(format, "json");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_domain_rejected() {
        assert!(Cli::try_parse_from(["checkout-gate", "check", "a.ts", "--domain", "billing"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
