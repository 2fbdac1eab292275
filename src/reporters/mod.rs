//! Output reporters for gate evaluations
//!
//! Supports two output formats:
//! - `text` - Terminal output with emoji, split across stdout and stderr
//! - `json` - Machine-readable verdict on stdout
//!
//! Reporters only build strings. Writing them is left to the caller so the
//! rendering is testable without capturing process streams.

mod json;
mod text;

use crate::rules::Evaluation;
use anyhow::{anyhow, Result};
use std::io::Write;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Presentation switches for the text reporter
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    pub emoji: bool,
    /// Print contextual reminders when the edit is not blocked
    pub hints: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            emoji: true,
            hints: true,
        }
    }
}

/// Rendered output, split by destination stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub stdout: String,
    pub stderr: String,
}

impl Rendered {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }

    /// Write both parts to the process streams
    pub fn emit(&self) -> Result<()> {
        if !self.stdout.is_empty() {
            let mut out = std::io::stdout().lock();
            out.write_all(self.stdout.as_bytes())?;
            out.flush()?;
        }
        if !self.stderr.is_empty() {
            let mut err = std::io::stderr().lock();
            err.write_all(self.stderr.as_bytes())?;
            err.flush()?;
        }
        Ok(())
    }
}

/// Render an evaluation in the given format
///
/// Runs that no rule set claimed render as nothing in every format except
/// JSON, which always prints a verdict.
pub fn report(evaluation: &Evaluation, format: OutputFormat, options: TextOptions) -> Result<Rendered> {
    match format {
        OutputFormat::Text => Ok(text::render(evaluation, options)),
        OutputFormat::Json => Ok(Rendered {
            stdout: json::render(evaluation)? + "\n",
            stderr: String::new(),
        }),
    }
}
