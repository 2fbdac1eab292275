//! Hook event parsing and source loading
//!
//! The host writes one JSON event to stdin per edit. Only the edited path is
//! used; every other key is ignored.

use crate::error::{GateError, GateResult};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Edit event sent by the host
///
/// ```json
/// {"tool_name": "Write", "tool_input": {"file_path": "src/pages/checkout.tsx"}}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookEvent {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
    /// Top-level form used by some hosts
    #[serde(default)]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl HookEvent {
    pub fn parse(input: &str) -> GateResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_reader(mut reader: impl Read) -> GateResult<Self> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .map_err(GateError::ReadEvent)?;
        Self::parse(&input)
    }

    /// Edited path: `tool_input.file_path`, then `tool_input.path`, then
    /// top-level `file_path`. Empty when none is present.
    pub fn file_path(&self) -> &str {
        self.tool_input
            .as_ref()
            .and_then(|input| input.file_path.as_deref().or(input.path.as_deref()))
            .or(self.file_path.as_deref())
            .unwrap_or("")
    }
}

/// Relative paths are taken from the project directory
pub fn resolve_path(path: &str, project_dir: &Path) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

/// Read the edited file as UTF-8 with LF line endings
pub fn read_source(path: &Path) -> GateResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| GateError::read_file(path, e))?;
    Ok(normalize_line_endings(content))
}

pub fn normalize_line_endings(content: String) -> String {
    if content.contains('\r') {
        content.replace("\r\n", "\n")
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_input_file_path() {
        let event = HookEvent::parse(
            r#"{"tool_name":"Edit","session_id":"abc","tool_input":{"file_path":"src/checkout.tsx","old_string":"a"}}"#,
        )
        .unwrap();
        assert_eq!(event.file_path(), "src/checkout.tsx");
        assert_eq!(event.tool_name.as_deref(), Some("Edit"));
    }

    #[test]
    fn test_path_fallbacks() {
        let event = HookEvent::parse(r#"{"tool_input":{"path":"a/b.ts"}}"#).unwrap();
        assert_eq!(event.file_path(), "a/b.ts");

        let event = HookEvent::parse(r#"{"file_path":"top.ts"}"#).unwrap();
        assert_eq!(event.file_path(), "top.ts");

        let event = HookEvent::parse(r#"{"tool_input":{},"file_path":"top.ts"}"#).unwrap();
        assert_eq!(event.file_path(), "top.ts");
    }

    #[test]
    fn test_missing_path_is_empty() {
        let event = HookEvent::parse(r#"{"tool_name":"Bash"}"#).unwrap();
        assert_eq!(event.file_path(), "");
    }

    #[test]
    fn test_malformed_events() {
        assert!(matches!(
            HookEvent::parse("{not json"),
            Err(GateError::MalformedEvent(_))
        ));
        assert!(HookEvent::parse("").is_err());
        assert!(HookEvent::parse("[1, 2]").is_err());
        assert!(HookEvent::parse(r#"{"tool_input":{"file_path":42}}"#).is_err());
    }

    #[test]
    fn test_from_reader() {
        let event = HookEvent::from_reader(r#"{"file_path":"x.ts"}"#.as_bytes()).unwrap();
        assert_eq!(event.file_path(), "x.ts");
    }

    #[test]
    fn test_read_source_normalizes_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "line1\r\nline2\r\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), "line1\nline2\n");
    }

    #[test]
    fn test_read_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ts");
        assert!(matches!(
            read_source(&missing),
            Err(GateError::ReadFile { .. })
        ));

        let binary = dir.path().join("blob.ts");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(read_source(&binary).is_err());
    }

    #[test]
    fn test_resolve_path() {
        let project = Path::new("/work/app");
        assert_eq!(
            resolve_path("src/a.ts", project),
            PathBuf::from("/work/app/src/a.ts")
        );
        #[cfg(unix)]
        assert_eq!(resolve_path("/tmp/b.ts", project), PathBuf::from("/tmp/b.ts"));
    }
}
