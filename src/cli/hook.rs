//! Hook command - the entry point the host calls on every edit

use super::check::gate;
use super::text_options;
use crate::config::GateConfig;
use crate::hook::{resolve_path, HookEvent};
use crate::reporters::OutputFormat;
use crate::rules::GateEngine;
use anyhow::Result;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read one event from `input` and gate the edited file
pub fn run(project_dir: &Path, config: &GateConfig, input: impl Read) -> Result<i32> {
    let event = HookEvent::from_reader(input)?;
    let path = event.file_path();
    debug!(
        "Hook event from {}: {:?}",
        event.tool_name.as_deref().unwrap_or("unknown tool"),
        path
    );

    let engine = GateEngine::from_config(config, project_dir)?;
    gate(
        &engine,
        path,
        &resolve_path(path, project_dir),
        OutputFormat::Text,
        text_options(config),
    )
}
