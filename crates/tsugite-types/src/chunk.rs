//! Stream chunk types and payload normalization.

use serde::{Deserialize, Serialize};

/// One delivered unit of a streamed response.
///
/// Chunks are immutable once received. The kernel only ever produces new
/// chunks via [`Chunk::with_payload`], cloning the original with the payload
/// field replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Provider-assigned chunk id, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The text-bearing payload.
    pub payload: ChunkPayload,
}

impl Chunk {
    /// Create a plain-text chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            payload: ChunkPayload::Text(text.into()),
        }
    }

    /// Create a chunk from ordered segments.
    pub fn segments(segments: Vec<Segment>) -> Self {
        Self {
            id: None,
            payload: ChunkPayload::Segments(segments),
        }
    }

    /// Clone this chunk with only the payload replaced.
    pub fn with_payload(&self, payload: ChunkPayload) -> Self {
        Self {
            id: self.id.clone(),
            payload,
        }
    }
}

/// Payload of a [`Chunk`].
///
/// Upstream providers deliver either a bare string or a list of typed
/// segments. Call sites never branch on the shape; [`ChunkPayload::text`]
/// is the single normalization point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkPayload {
    /// Plain string payload.
    Text(String),
    /// Ordered typed segments.
    Segments(Vec<Segment>),
}

impl ChunkPayload {
    /// Flatten this payload to plain text.
    ///
    /// Concatenates every text segment in order; non-text segments
    /// contribute nothing. A malformed or empty payload normalizes to the
    /// empty string rather than an error — the chunk itself is still
    /// forwarded unchanged by the caller.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Segments(segments) => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// True if normalization would produce no text.
    pub fn is_textless(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Segments(segments) => !segments
                .iter()
                .any(|s| matches!(s, Segment::Text { text } if !text.is_empty())),
        }
    }
}

/// One typed segment of a segmented payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Text content — the only kind that contributes to detection.
    Text {
        /// Segment text.
        text: String,
    },
    /// Extended thinking content (ignored for detection).
    Thinking {
        /// Thinking text.
        thinking: String,
    },
    /// Token usage metadata (ignored for detection).
    Usage {
        /// Input tokens consumed.
        input_tokens: u32,
        /// Output tokens generated.
        output_tokens: u32,
    },
}
