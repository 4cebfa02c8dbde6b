//! Shared chunk and payload types for tsugite.
//!
//! This crate is the stream data model: the [`Chunk`] unit delivered by a
//! response stream, its heterogeneous [`ChunkPayload`], and the normalization
//! that flattens a payload to plain text. It has **no internal tsugite
//! dependencies** — a pure leaf crate that the kernel builds on.
//!
//! Payloads arrive in two shapes at the boundary: a plain string, or an
//! ordered sequence of typed [`Segment`]s where only text segments carry
//! detectable content. Everything downstream works on the normalized text
//! while the original chunk is forwarded verbatim.

pub mod chunk;

// Re-export primary types at crate root for convenience.
pub use chunk::{Chunk, ChunkPayload, Segment};
