//! Stream pipeline assembly and mode selection.
//!
//! [`DirectivePipeline`] composes the detector with the dispatch bridge and
//! implements the chunk-level contract: every incoming chunk is forwarded
//! first, then each block it completes is dispatched and its status chunk
//! emitted before detection proceeds on the buffer tail. A dispatch suspends
//! the pipeline, so the status chunk for block N always precedes any text
//! that arrived after block N.
//!
//! [`spawn_pipeline`] wraps the pipeline in a bounded channel: downstream
//! backpressure stalls the pump, the output is a lazy [`ChunkStream`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tsugite_types::Chunk;

use crate::detect::StreamBlockDetector;
use crate::dispatch::ActionDispatchBridge;
use crate::tools::ToolRegistry;

/// Error type for pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The consumer dropped the output side; nothing left to forward to.
    #[error("output channel closed")]
    OutputClosed,
}

/// One stream's detector/bridge pair.
///
/// Single-use: one instance per stream, driven by one producer, processing
/// one chunk at a time. All state is exclusively owned, so suspension during
/// dispatch cannot race with buffer mutation.
#[derive(Debug)]
pub struct DirectivePipeline {
    detector: StreamBlockDetector,
    bridge: ActionDispatchBridge,
}

impl DirectivePipeline {
    /// Create a pipeline around a dispatch bridge.
    pub fn new(bridge: ActionDispatchBridge) -> Self {
        Self {
            detector: StreamBlockDetector::new(),
            bridge,
        }
    }

    /// Process one incoming chunk.
    ///
    /// Forwards the original chunk immediately and unmodified, then drains
    /// every block the accumulated buffer now completes, dispatching each
    /// one and emitting its status chunk in order. Errors only when the
    /// output side is gone.
    pub async fn process(
        &mut self,
        chunk: Chunk,
        tx: &mpsc::Sender<Chunk>,
    ) -> Result<(), PipelineError> {
        let text = chunk.payload.text();
        tx.send(chunk)
            .await
            .map_err(|_| PipelineError::OutputClosed)?;

        self.detector.push(&text);
        while let Some(fields) = self.detector.take_block() {
            let status = self.bridge.dispatch(fields).await;
            tx.send(status)
                .await
                .map_err(|_| PipelineError::OutputClosed)?;
        }
        Ok(())
    }

    /// Bytes left in the detector buffer.
    pub fn buffered(&self) -> usize {
        self.detector.buffered_len()
    }
}

/// Spawn a pipeline task over an input channel and return its lazy output.
///
/// The output channel is bounded by `capacity`; a slow consumer stalls
/// forwarding and therefore stalls dispatch of later blocks. When the input
/// closes with an unterminated block still buffered, the leftover is logged
/// and never dispatched — the upstream terminates streams with a final
/// non-text signal, so there is no flush hook here.
pub fn spawn_pipeline(
    mut input: mpsc::Receiver<Chunk>,
    bridge: ActionDispatchBridge,
    capacity: usize,
) -> ChunkStream {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        let mut pipeline = DirectivePipeline::new(bridge);
        while let Some(chunk) = input.recv().await {
            if pipeline.process(chunk, &tx).await.is_err() {
                debug!("consumer dropped output, stopping pipeline");
                return;
            }
        }
        if pipeline.buffered() > 0 {
            debug!(
                bytes = pipeline.buffered(),
                "stream ended with unterminated buffer content"
            );
        }
    });
    ChunkStream { rx }
}

/// Lazy sequence of outgoing chunks.
pub struct ChunkStream {
    rx: mpsc::Receiver<Chunk>,
}

impl ChunkStream {
    /// Receive the next outgoing chunk.
    pub async fn recv(&mut self) -> Option<Chunk> {
        self.rx.recv().await
    }
}

impl Stream for ChunkStream {
    type Item = Chunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Chunk>> {
        self.rx.poll_recv(cx)
    }
}

/// How the surrounding runner treats a response stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Detect directive blocks and dispatch them.
    Directive,
    /// Forward chunks untouched (fallback when the tool is unavailable).
    PassThrough,
}

impl StreamMode {
    /// Pick the mode for a stream.
    ///
    /// Directive mode requires the named tool to be allow-listed, eligible
    /// for this caller, and backed by a registered engine.
    pub fn select(registry: &ToolRegistry, tool: &str, allow: &[String], premium_ok: bool) -> Self {
        if registry.enabled_engine(tool, allow, premium_ok).is_some() {
            info!(tool, "directive stream mode enabled");
            Self::Directive
        } else {
            info!(tool, "tool unavailable, falling back to pass-through");
            Self::PassThrough
        }
    }
}
