//! WriteEngine — create or overwrite file content under a root directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::tools::{ExecResult, ExecutionEngine};

/// Engine for writing/creating files.
///
/// Paths are resolved relative to the engine's root; absolute paths and
/// `..` traversal are rejected so a streamed directive cannot reach outside
/// the workspace it was given.
pub struct WriteEngine {
    root: PathBuf,
}

impl WriteEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a directive path against the root, or explain why not.
    fn resolve(&self, path: &str) -> Result<PathBuf, String> {
        let rel = Path::new(path);
        if rel.is_absolute() {
            return Err(format!("absolute path not allowed: {path}"));
        }
        for component in rel.components() {
            if matches!(component, Component::ParentDir) {
                return Err(format!("path escapes the write root: {path}"));
            }
        }
        Ok(self.root.join(rel))
    }
}

#[derive(Deserialize)]
struct WriteParams {
    path: String,
    content: String,
    #[serde(default)]
    confirm: bool,
}

#[async_trait]
impl ExecutionEngine for WriteEngine {
    fn name(&self) -> &str {
        "write_to_file"
    }

    fn description(&self) -> &str {
        "Write or create a file with the given content"
    }

    fn schema(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path to write, relative to the write root"
                },
                "content": {
                    "type": "string",
                    "description": "Full file content to write"
                },
                "confirm": {
                    "type": "boolean",
                    "description": "Ask for interactive confirmation before writing"
                }
            },
            "required": ["path", "content"]
        }))
    }

    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult> {
        let p: WriteParams = match serde_json::from_str(params) {
            Ok(v) => v,
            Err(e) => return Ok(ExecResult::failure(format!("Invalid params: {e}"))),
        };

        if p.confirm {
            // No confirmer is attached on the stream path; callers there
            // always pass confirm: false.
            return Ok(ExecResult::failure(
                "interactive confirmation is not available",
            ));
        }

        let target = match self.resolve(&p.path) {
            Ok(t) => t,
            Err(e) => return Ok(ExecResult::failure(e)),
        };

        if let Some(parent) = target.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return Ok(ExecResult::failure(format!("{}: {e}", p.path)));
            }
        }

        match tokio::fs::write(&target, p.content.as_bytes()).await {
            Ok(()) => Ok(ExecResult::success(format!(
                "Wrote {} bytes to {}",
                p.content.len(),
                p.path
            ))),
            Err(e) => Ok(ExecResult::failure(format!("{}: {e}", p.path))),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}
