//! File-level tools the stream pipeline can dispatch to.
//!
//! Engines here operate on the local filesystem under a configured root.
//! They take JSON params like every other [`crate::tools::ExecutionEngine`]
//! and report expected failures as failed results, not errors.

pub mod write;

pub use write::WriteEngine;
