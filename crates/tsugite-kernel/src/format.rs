//! Result formatting for dispatched tool calls.

use crate::tools::ExecResult;

/// Renders a raw tool result into concise human-readable text, keyed by the
/// tool name so different tools can get different renderings.
pub trait ResultFormatter: Send + Sync {
    /// Format a successful result for the given tool.
    fn format(&self, tool: &str, result: &ExecResult) -> String;
}

/// Default formatter: the tool's stdout, trimmed, with a generic fallback
/// when the tool produced no output.
#[derive(Debug, Default)]
pub struct DefaultFormatter;

impl ResultFormatter for DefaultFormatter {
    fn format(&self, tool: &str, result: &ExecResult) -> String {
        let text = result.stdout.trim();
        if text.is_empty() {
            format!("{} completed", tool)
        } else {
            text.to_string()
        }
    }
}
