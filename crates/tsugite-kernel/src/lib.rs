//! # tsugite-kernel
//!
//! Streaming directive detection and tool dispatch.
//!
//! tsugite sits between a token-by-token LLM response stream and whatever
//! renders it. Chunks flow through untouched; when the accumulated text
//! completes a `<writeToFile>` directive block — however it was fragmented,
//! fenced or not — the block's fields are extracted, the write tool is
//! invoked exactly once, and a synthetic status chunk is emitted in-band.
//!
//! ```text
//! ┌──────────┐  chunks   ┌─────────────────────┐  chunks + status  ┌──────────┐
//! │ provider ├──────────▶│  DirectivePipeline  ├──────────────────▶│ consumer │
//! └──────────┘           │  detector + bridge  │                   └──────────┘
//!                        └──────────┬──────────┘
//!                                   │ one dispatch per block
//!                                   ▼
//!                        ┌─────────────────────┐
//!                        │   ExecutionEngine   │
//!                        │   (write_to_file)   │
//!                        └─────────────────────┘
//! ```

pub mod config;
pub mod detect;
pub mod dispatch;
pub mod file_tools;
pub mod format;
pub mod runner;
pub mod tools;

pub use config::{ConfigError, PipelineConfig};
pub use detect::{DirectiveFields, StreamBlockDetector, CLOSE_TAG, OPEN_TAG};
pub use dispatch::ActionDispatchBridge;
pub use file_tools::WriteEngine;
pub use format::{DefaultFormatter, ResultFormatter};
pub use runner::{spawn_pipeline, ChunkStream, DirectivePipeline, PipelineError, StreamMode};
pub use tools::{ExecResult, ExecutionEngine, NoopEngine, ToolInfo, ToolRegistry};
