//! Dispatch bridge between detected directive blocks and tool engines.

use std::sync::Arc;

use tracing::{debug, warn};
use tsugite_types::Chunk;

use crate::detect::DirectiveFields;
use crate::format::{DefaultFormatter, ResultFormatter};
use crate::tools::ExecutionEngine;

/// Invokes the side-effecting action for one extracted directive and turns
/// the outcome into a synthetic status chunk.
///
/// `dispatch` always resolves: an engine error never crosses this boundary,
/// it is rendered as in-band failure text instead. Each call invokes the
/// engine exactly once — the side-effect guarantee is at-most-once per
/// detected block, never at-least-once.
pub struct ActionDispatchBridge {
    engine: Arc<dyn ExecutionEngine>,
    formatter: Arc<dyn ResultFormatter>,
}

impl std::fmt::Debug for ActionDispatchBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatchBridge")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl ActionDispatchBridge {
    /// Create a bridge over an engine with an explicit formatter.
    pub fn new(engine: Arc<dyn ExecutionEngine>, formatter: Arc<dyn ResultFormatter>) -> Self {
        Self { engine, formatter }
    }

    /// Create a bridge using the [`DefaultFormatter`].
    pub fn with_default_formatter(engine: Arc<dyn ExecutionEngine>) -> Self {
        Self::new(engine, Arc::new(DefaultFormatter))
    }

    /// Invoke the engine for one directive and return its status chunk.
    ///
    /// The engine is called with `confirm: false` — the stream has no
    /// synchronous human-in-the-loop channel, so interactive confirmation is
    /// always bypassed at this point. Success and failure text are framed
    /// identically with leading/trailing line breaks.
    pub async fn dispatch(&self, fields: DirectiveFields) -> Chunk {
        debug!(tool = self.engine.name(), path = %fields.path, "dispatching directive");

        let params = serde_json::json!({
            "path": fields.path,
            "content": fields.content,
            "confirm": false,
        });

        let text = match self.engine.execute(&params.to_string()).await {
            Ok(result) if result.success => self.formatter.format(self.engine.name(), &result),
            Ok(result) => {
                warn!(tool = self.engine.name(), error = %result.stderr, "dispatch failed");
                format!("Error: {}", result.stderr.trim())
            }
            Err(err) => {
                warn!(tool = self.engine.name(), error = %err, "dispatch failed");
                format!("Error: {err}")
            }
        };

        Chunk::text(format!("\n{text}\n"))
    }
}
