//! The operations the oracle may invoke against the project.
//!
//! Every operation resolves its path through a [`PathSandbox`] and returns a
//! [`ToolResult`]. Failures are values, not panics or propagated errors: the
//! loop turns them into `{"error": ...}` payloads and lets the oracle adapt.

use crate::conversation::ToolCall;
use dockhand_core::PathSandbox;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Tool name constants
pub const LIST_DIRECTORY: &str = "list_directory";
pub const READ_FILE: &str = "read_file";
pub const CHECK_FILE_EXISTS: &str = "check_file_exists";
pub const WRITE_DOCKERFILE: &str = "write_dockerfile";

pub use dockhand_core::RECIPE_FILE_NAME;

/// Lines returned by [`READ_FILE`] when the caller does not say.
pub const DEFAULT_MAX_LINES: usize = 200;

pub type ToolResult = Result<ToolOutput, ToolError>;

/// Category of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    OutsideRoot,
    NotFound,
    NotADirectory,
    NotAFile,
    PermissionDenied,
    Binary,
    Io,
    InvalidArgument,
    UnknownTool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn outside_root() -> Self {
        Self::new(ToolErrorKind::OutsideRoot, "Path outside project directory")
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ToolErrorKind::UnknownTool, format!("Unknown tool: {name}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub content: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Existence {
    pub exists: bool,
    pub is_file: bool,
    pub is_dir: bool,
}

/// Successful outcome of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Listing(Vec<DirEntry>),
    File(FileContent),
    Existence(Existence),
    /// The recipe was written; this ends the agent loop.
    Written(PathBuf),
}

/// Wire form of a result, as handed back to the oracle.
pub fn tool_payload(result: &ToolResult) -> Value {
    match result {
        Ok(ToolOutput::Listing(entries)) => json!({ "entries": entries }),
        Ok(ToolOutput::File(file)) => json!(file),
        Ok(ToolOutput::Existence(existence)) => json!(existence),
        Ok(ToolOutput::Written(path)) => json!({
            "success": true,
            "path": path.display().to_string(),
        }),
        Err(e) => json!({ "error": e.message }),
    }
}

/// Sandboxed filesystem view exposed to the oracle.
#[derive(Debug, Clone)]
pub struct ToolSurface {
    sandbox: PathSandbox,
}

impl ToolSurface {
    pub fn new(project_root: &Path) -> dockhand_core::Result<Self> {
        Ok(Self {
            sandbox: PathSandbox::new(project_root)?,
        })
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Route a requested call to its operation by name.
    ///
    /// Unknown names and malformed arguments produce an error result; extra
    /// arguments are ignored.
    pub fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let args = &call.args;
        match call.name.as_str() {
            LIST_DIRECTORY => {
                let path = optional_str(args, "path")?.unwrap_or(".");
                self.list_directory(path)
            }
            READ_FILE => {
                let path = required_str(args, "path")?;
                let max_lines = optional_count(args, "max_lines")?.unwrap_or(DEFAULT_MAX_LINES);
                self.read_file(path, max_lines)
            }
            CHECK_FILE_EXISTS => self.check_file_exists(required_str(args, "path")?),
            WRITE_DOCKERFILE => self.write_artifact(required_str(args, "content")?),
            other => {
                tracing::warn!(tool = other, "oracle requested unknown tool");
                Err(ToolError::unknown_tool(other))
            }
        }
    }

    /// List a directory: subdirectories first, then files, each alphabetically.
    pub fn list_directory(&self, path: &str) -> ToolResult {
        let target = self.sandbox.resolve(path).map_err(|_| ToolError::outside_root())?;

        if !target.exists() {
            return Err(ToolError::new(
                ToolErrorKind::NotFound,
                format!("Directory not found: {path}"),
            ));
        }
        if !target.is_dir() {
            return Err(ToolError::new(
                ToolErrorKind::NotADirectory,
                format!("Not a directory: {path}"),
            ));
        }

        let read_dir = std::fs::read_dir(&target).map_err(|e| io_error(&e, path))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| io_error(&e, path))?;
            let kind = if entry.path().is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        entries.sort_by(|a, b| {
            (a.kind == EntryKind::File, &a.name).cmp(&(b.kind == EntryKind::File, &b.name))
        });

        Ok(ToolOutput::Listing(entries))
    }

    /// Read the first `max_lines` lines of a text file.
    pub fn read_file(&self, path: &str, max_lines: usize) -> ToolResult {
        let target = self.sandbox.resolve(path).map_err(|_| ToolError::outside_root())?;

        if !target.exists() {
            return Err(ToolError::new(
                ToolErrorKind::NotFound,
                format!("File not found: {path}"),
            ));
        }
        if !target.is_file() {
            return Err(ToolError::new(
                ToolErrorKind::NotAFile,
                format!("Not a file: {path}"),
            ));
        }

        let bytes = std::fs::read(&target).map_err(|e| io_error(&e, path))?;
        let text = String::from_utf8(bytes).map_err(|_| {
            ToolError::new(
                ToolErrorKind::Binary,
                format!("Cannot read binary file: {path}"),
            )
        })?;

        let lines: Vec<&str> = text.lines().collect();
        let truncated = lines.len() > max_lines;
        let content = lines[..lines.len().min(max_lines)].join("\n");

        Ok(ToolOutput::File(FileContent { content, truncated }))
    }

    /// Report whether a path exists; absence is an answer, not an error.
    pub fn check_file_exists(&self, path: &str) -> ToolResult {
        let target = self.sandbox.resolve(path).map_err(|_| ToolError::outside_root())?;

        let exists = target.exists();
        Ok(ToolOutput::Existence(Existence {
            exists,
            is_file: exists && target.is_file(),
            is_dir: exists && target.is_dir(),
        }))
    }

    /// Write the recipe to the project root, overwriting any previous one.
    ///
    /// The stored file always ends in a newline. The target is resolved
    /// through the sandbox like every other operation, so a recipe symlink
    /// leading outside the root is refused.
    pub fn write_artifact(&self, content: &str) -> ToolResult {
        // A `Dockerfile` symlink pointing out of the project resolves outside.
        let path = self
            .sandbox
            .resolve(RECIPE_FILE_NAME)
            .map_err(|_| ToolError::outside_root())?;
        // Resolution replaces live links with their target; one left over
        // is dangling and writing through it could create a file anywhere.
        if std::fs::symlink_metadata(&path).is_ok_and(|m| m.file_type().is_symlink()) {
            tracing::warn!(path = %path.display(), "refusing to write through dangling recipe symlink");
            return Err(ToolError::outside_root());
        }
        let body = if content.ends_with('\n') {
            content.to_owned()
        } else {
            format!("{content}\n")
        };

        match std::fs::write(&path, body) {
            Ok(()) => Ok(ToolOutput::Written(path)),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(ToolError::new(
                ToolErrorKind::PermissionDenied,
                format!("Permission denied writing {RECIPE_FILE_NAME}"),
            )),
            Err(e) => Err(ToolError::new(
                ToolErrorKind::Io,
                format!("Failed to write {RECIPE_FILE_NAME}: {e}"),
            )),
        }
    }
}

fn io_error(e: &std::io::Error, path: &str) -> ToolError {
    if e.kind() == ErrorKind::PermissionDenied {
        ToolError::new(
            ToolErrorKind::PermissionDenied,
            format!("Permission denied: {path}"),
        )
    } else {
        ToolError::new(ToolErrorKind::Io, format!("Failed to read {path}: {e}"))
    }
}

fn required_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    optional_str(args, key)?.ok_or_else(|| {
        ToolError::new(
            ToolErrorKind::InvalidArgument,
            format!("Missing required argument: {key}"),
        )
    })
}

fn optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ToolError::new(
            ToolErrorKind::InvalidArgument,
            format!("Argument '{key}' must be a string"),
        )),
    }
}

/// A non-negative integer argument. Whole floats (`200.0`) are accepted since
/// some providers encode every JSON number as a double.
fn optional_count(args: &Map<String, Value>, key: &str) -> Result<Option<usize>, ToolError> {
    let invalid = || {
        ToolError::new(
            ToolErrorKind::InvalidArgument,
            format!("Argument '{key}' must be a non-negative integer"),
        )
    };
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                return usize::try_from(v).map(Some).map_err(|_| invalid());
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 => {
                    Ok(Some(f as usize))
                }
                _ => Err(invalid()),
            }
        }
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn optional_count_accepts_whole_floats() {
        let a = args(json!({ "max_lines": 20.0 }));
        assert_eq!(optional_count(&a, "max_lines").unwrap(), Some(20));
    }

    #[test]
    fn optional_count_rejects_fractions_and_negatives() {
        assert!(optional_count(&args(json!({ "n": 1.5 })), "n").is_err());
        assert!(optional_count(&args(json!({ "n": -3 })), "n").is_err());
        assert!(optional_count(&args(json!({ "n": "7" })), "n").is_err());
    }

    #[test]
    fn payload_for_error_has_only_error_key() {
        let result: ToolResult = Err(ToolError::unknown_tool("rm_rf"));
        assert_eq!(tool_payload(&result), json!({ "error": "Unknown tool: rm_rf" }));
    }

    #[test]
    fn payload_for_listing_uses_type_tag() {
        let result: ToolResult = Ok(ToolOutput::Listing(vec![DirEntry {
            name: "src".to_owned(),
            kind: EntryKind::Dir,
        }]));
        assert_eq!(
            tool_payload(&result),
            json!({ "entries": [{ "name": "src", "type": "dir" }] })
        );
    }
}
