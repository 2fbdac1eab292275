//! Check command - gate a file named on the command line

use super::text_options;
use crate::config::GateConfig;
use crate::hook::{read_source, resolve_path};
use crate::models::EXIT_ALLOW;
use crate::reporters::{self, OutputFormat, TextOptions};
use crate::rules::{Domain, GateEngine};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

pub fn run(
    project_dir: &Path,
    config: &GateConfig,
    file: &Path,
    domain: Option<&str>,
    format: &str,
) -> Result<i32> {
    let format: OutputFormat = format.parse()?;
    let domain: Option<Domain> = domain.map(str::parse).transpose()?;

    let engine = GateEngine::from_config(config, project_dir)?.with_domain(domain);
    let path = file.to_string_lossy();
    gate(
        &engine,
        &path,
        &resolve_path(&path, project_dir),
        format,
        text_options(config),
    )
}

/// Route, read, evaluate and report one file; returns the exit code.
///
/// The file is only read once a rule set claims the path, so edits to
/// unrelated files never fail on I/O.
pub(super) fn gate(
    engine: &GateEngine,
    path: &str,
    resolved: &Path,
    format: OutputFormat,
    options: TextOptions,
) -> Result<i32> {
    let claimed = !engine.route(path).is_empty();
    if !claimed && format == OutputFormat::Text {
        debug!("{} is not covered by any rule set", path);
        return Ok(EXIT_ALLOW);
    }

    let content = if claimed {
        read_source(resolved)?
    } else {
        String::new()
    };

    let evaluation = engine.evaluate(path, &content);
    reporters::report(&evaluation, format, options)?.emit()?;
    Ok(evaluation.exit_code())
}
