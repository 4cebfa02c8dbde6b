//! Tool registry and execution engines.
//!
//! Tools are side-effecting capabilities the stream pipeline can dispatch to.
//! Execution engines provide their implementations; the registry tracks which
//! tools exist and which of them the surrounding runner may actually use,
//! filtered by an allow-list and a per-tool eligibility flag.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Information about a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the tool is restricted to eligible (premium) callers.
    #[serde(default)]
    pub premium: bool,
}

impl ToolInfo {
    /// Create a new tool info.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            premium: false,
        }
    }

    /// Mark this tool as premium-only.
    pub fn premium(mut self) -> Self {
        self.premium = true;
        self
    }
}

/// Result of executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecResult {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Whether execution succeeded.
    pub success: bool,
}

impl ExecResult {
    /// Create a successful result.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }
}

/// Trait for execution engines.
///
/// An engine receives its parameters as a JSON string and reports failure
/// either as an `Err` (unexpected fault) or as a failed [`ExecResult`]
/// (expected tool-level failure). Both are converted to in-band status text
/// at the dispatch boundary.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Get the engine name.
    fn name(&self) -> &str;

    /// Get the engine description.
    fn description(&self) -> &str;

    /// Execute with JSON params and return the result.
    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult>;

    /// Check if this engine is available/ready.
    async fn is_available(&self) -> bool;

    /// Get the JSON Schema for the engine's input parameters.
    fn schema(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Registry of tools and their execution engines.
#[derive(Default)]
pub struct ToolRegistry {
    /// Available tools.
    tools: HashMap<String, ToolInfo>,
    /// Execution engines keyed by tool name.
    engines: HashMap<String, Arc<dyn ExecutionEngine>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools)
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool as available (without an engine).
    pub fn register(&mut self, info: ToolInfo) {
        self.tools.insert(info.name.clone(), info);
    }

    /// Register a tool with an execution engine.
    pub fn register_with_engine(&mut self, info: ToolInfo, engine: Arc<dyn ExecutionEngine>) {
        let name = info.name.clone();
        self.tools.insert(name.clone(), info);
        self.engines.insert(name, engine);
    }

    /// Get a tool's info.
    pub fn get(&self, name: &str) -> Option<&ToolInfo> {
        self.tools.get(name)
    }

    /// Get an engine for a tool.
    pub fn get_engine(&self, name: &str) -> Option<Arc<dyn ExecutionEngine>> {
        self.engines.get(name).cloned()
    }

    /// Check if a tool has an engine registered.
    pub fn has_engine(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// List all registered tools.
    pub fn list(&self) -> Vec<&ToolInfo> {
        self.tools.values().collect()
    }

    /// List tools the caller may use.
    ///
    /// A tool is enabled when its name appears in `allow` and it is either
    /// non-premium or the caller is eligible for premium tools.
    pub fn enabled(&self, allow: &[String], premium_ok: bool) -> Vec<&ToolInfo> {
        self.tools
            .values()
            .filter(|t| allow.iter().any(|a| a == &t.name))
            .filter(|t| !t.premium || premium_ok)
            .collect()
    }

    /// Get the engine for a tool the caller may use, or `None`.
    pub fn enabled_engine(
        &self,
        name: &str,
        allow: &[String],
        premium_ok: bool,
    ) -> Option<Arc<dyn ExecutionEngine>> {
        self.enabled(allow, premium_ok)
            .iter()
            .find(|t| t.name == name)
            .and_then(|t| self.get_engine(&t.name))
    }
}

/// A no-op execution engine for testing.
#[derive(Debug)]
pub struct NoopEngine;

#[async_trait]
impl ExecutionEngine for NoopEngine {
    fn name(&self) -> &str {
        "noop"
    }

    fn description(&self) -> &str {
        "No-op engine for testing"
    }

    async fn execute(&self, params: &str) -> anyhow::Result<ExecResult> {
        Ok(ExecResult::success(format!("noop: {}", params)))
    }

    async fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tool_info() {
        let info = ToolInfo::new("write_to_file", "Write a file");
        assert_eq!(info.name, "write_to_file");
        assert!(!info.premium);
        assert!(ToolInfo::new("x", "y").premium().premium);
    }

    #[test]
    fn test_exec_result() {
        let success = ExecResult::success("output");
        assert!(success.success);

        let failure = ExecResult::failure("error");
        assert!(!failure.success);
        assert_eq!(failure.stderr, "error");
    }

    #[test]
    fn test_enabled_respects_allow_list() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolInfo::new("write_to_file", "Write a file"));
        registry.register(ToolInfo::new("run_shell", "Run a shell command"));

        let enabled = registry.enabled(&allow(&["write_to_file"]), false);
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].name, "write_to_file");

        assert!(registry.enabled(&[], false).is_empty());
    }

    #[test]
    fn test_enabled_respects_eligibility() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolInfo::new("write_to_file", "Write a file").premium());

        let names = allow(&["write_to_file"]);
        assert!(registry.enabled(&names, false).is_empty());
        assert_eq!(registry.enabled(&names, true).len(), 1);
    }

    #[tokio::test]
    async fn test_enabled_engine_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register_with_engine(
            ToolInfo::new("noop", "Noop"),
            Arc::new(NoopEngine),
        );

        let names = allow(&["noop"]);
        let engine = registry.enabled_engine("noop", &names, false).unwrap();
        let result = engine.execute("{}").await.unwrap();
        assert!(result.success);

        assert!(registry.enabled_engine("noop", &[], false).is_none());
        assert!(registry.enabled_engine("missing", &names, false).is_none());
    }

    #[tokio::test]
    async fn test_noop_engine() {
        let engine = NoopEngine;
        assert!(engine.is_available().await);

        let result = engine.execute("hello").await.unwrap();
        assert!(result.success);
        assert_eq!(result.stdout, "noop: hello");
    }
}
