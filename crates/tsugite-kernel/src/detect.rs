//! Incremental directive-block detection over fragmented stream text.
//!
//! A response stream may embed a `<writeToFile>` directive block whose
//! opening tag, body, and closing tag land in different chunks, and the whole
//! block may be wrapped in a code fence that some generators add
//! non-deterministically:
//!
//! ````text
//! ```xml                      ← optional fence, with or without language tag
//! <writeToFile>
//!   <path>notes/a.md</path>
//!   <content>hello</content>
//! </writeToFile>
//! ```                         ← optional trailing fence
//! ````
//!
//! [`StreamBlockDetector`] accumulates normalized chunk text and hands back
//! one complete block at a time. It is a pure parser: it knows nothing about
//! dispatch, channels, or chunks — the pipeline in [`crate::runner`] composes
//! it with the dispatch bridge.
//!
//! Matching is an explicit two-pointer scan (first opening tag, then the
//! earliest closing tag after it) rather than a backtracking regex, so
//! adversarial input cannot blow up matching time. The earliest closing tag
//! always terminates the block.

use tracing::{debug, warn};

/// Literal opening tag of a directive block.
pub const OPEN_TAG: &str = "<writeToFile>";

/// Literal closing tag of a directive block.
pub const CLOSE_TAG: &str = "</writeToFile>";

const FENCE: &str = "```";

/// Fields extracted from one complete directive block.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveFields {
    /// Target path. Required; a block without one is discarded.
    pub path: String,
    /// Content to write. A block without one dispatches empty content.
    pub content: String,
}

/// Span of one complete block within the buffer.
struct BlockSpan {
    /// Byte range of the body between the tags.
    body: std::ops::Range<usize>,
    /// Offset just past the closing tag and one trailing fence marker.
    end: usize,
}

/// Stateful detector for directive blocks split across stream chunks.
///
/// One instance serves exactly one stream. The buffer holds every byte of
/// normalized text received since the end of the last consumed block and is
/// only ever advanced in one atomic step per block, so no span can be
/// matched twice.
#[derive(Debug, Default)]
pub struct StreamBlockDetector {
    buffer: String,
}

impl StreamBlockDetector {
    /// Create a detector with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append normalized chunk text to the buffer.
    pub fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Bytes currently buffered (tail of the stream not yet consumed).
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete, valid block out of the buffer.
    ///
    /// Returns `None` when the remaining buffer holds no complete block —
    /// an unterminated tail stays put and waits for more chunks. Complete
    /// blocks without a recognizable path are consumed and discarded here,
    /// never surfaced. A block without a content field is surfaced with
    /// empty content.
    pub fn take_block(&mut self) -> Option<DirectiveFields> {
        loop {
            let span = scan_block(&self.buffer)?;
            let fields = extract_fields(&self.buffer[span.body.clone()]);

            // Consume the full span (leading text, fence, tags, body, one
            // trailing fence marker) in one step before anything else looks
            // at it.
            self.buffer.drain(..span.end);

            match fields {
                Some((path, Some(content))) => {
                    debug!(path = %path, bytes = content.len(), "directive block complete");
                    return Some(DirectiveFields { path, content });
                }
                Some((path, None)) => {
                    warn!(path = %path, "directive block has no content field, treating as empty");
                    return Some(DirectiveFields {
                        path,
                        content: String::new(),
                    });
                }
                None => {
                    warn!("discarding directive block with no path field");
                }
            }
        }
    }
}

/// Find the first complete block span in `buffer`.
///
/// Two-pointer scan: the first opening tag, then the earliest closing tag
/// after it. A fence marker can only sit outside the tags, so scanning the
/// raw buffer finds exactly the spans a fence-stripped view would; the
/// leading fence falls inside the consumed prefix and exactly one trailing
/// marker is folded into the span end.
fn scan_block(buffer: &str) -> Option<BlockSpan> {
    let open = buffer.find(OPEN_TAG)?;
    let body_start = open + OPEN_TAG.len();
    let close = buffer[body_start..].find(CLOSE_TAG)? + body_start;

    let mut end = close + CLOSE_TAG.len();
    end += trailing_fence_len(&buffer[end..]);

    Some(BlockSpan {
        body: body_start..close,
        end,
    })
}

/// Length of one immediately-following fence marker, or 0.
///
/// Consumes at most one marker; stacked fences are left alone.
fn trailing_fence_len(rest: &str) -> usize {
    let after_newline = rest.strip_prefix('\n');
    let (tail, newline_len) = match after_newline {
        Some(tail) => (tail, 1),
        None => (rest, 0),
    };
    if tail.starts_with(FENCE) {
        newline_len + FENCE.len()
    } else {
        0
    }
}

/// Value of the first `<open>…</close>` pair at or after `from`, with the
/// earliest closing tag winning, plus the offset just past it.
fn tag_value<'a>(text: &'a str, open: &str, close: &str, from: usize) -> Option<(&'a str, usize)> {
    let start = text[from..].find(open)? + from + open.len();
    let end = text[start..].find(close)? + start;
    Some((&text[start..end], end + close.len()))
}

/// Extract `(path, content)` from a block body.
///
/// Field order is fixed: path precedes content. Returns `None` when the
/// path is missing or blank; a missing content field yields `(path, None)`.
fn extract_fields(body: &str) -> Option<(String, Option<String>)> {
    let (path, after_path) = tag_value(body, "<path>", "</path>", 0)?;
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    let content = tag_value(body, "<content>", "</content>", after_path).map(|(c, _)| c.to_string());
    Some((path.to_string(), content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(path: &str, content: &str) -> String {
        format!("{OPEN_TAG}<path>{path}</path><content>{content}</content>{CLOSE_TAG}")
    }

    fn drain(detector: &mut StreamBlockDetector) -> Vec<DirectiveFields> {
        std::iter::from_fn(|| detector.take_block()).collect()
    }

    #[test]
    fn test_single_chunk_block() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&block("a.md", "hi"));
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "a.md");
        assert_eq!(fields.content, "hi");
        assert!(detector.take_block().is_none());
        assert_eq!(detector.buffered_len(), 0);
    }

    #[test]
    fn test_split_across_two_chunks() {
        let mut detector = StreamBlockDetector::new();
        detector.push("<write");
        assert!(detector.take_block().is_none());
        detector.push("eToFile><path>a.md</path><content>hi</content></writeToFile>");
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "a.md");
        assert_eq!(fields.content, "hi");
    }

    #[test]
    fn test_arbitrary_fragmentation_matches_one_shot() {
        let text = format!("prose before {} prose after", block("dir/x.txt", "line1\nline2\n"));
        let mut detector = StreamBlockDetector::new();
        let mut found = Vec::new();
        for (i, _) in text.char_indices() {
            detector.push(&text[i..i + 1]);
            found.extend(drain(&mut detector));
        }
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "dir/x.txt");
        assert_eq!(found[0].content, "line1\nline2\n");
    }

    #[test]
    fn test_fence_with_language_tag() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!("```xml\n{}\n```", block("b.md", "x")));
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "b.md");
        assert_eq!(fields.content, "x");
        // Trailing fence consumed with the block.
        assert_eq!(detector.buffered_len(), 0);
    }

    #[test]
    fn test_fence_without_language_tag() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!("```\n{}\n```", block("b.md", "x")));
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "b.md");
        assert_eq!(detector.buffered_len(), 0);
    }

    #[test]
    fn test_only_one_trailing_fence_consumed() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!("{}\n```\n```", block("b.md", "x")));
        detector.take_block().unwrap();
        assert_eq!(detector.buffered_len(), "\n```".len());
    }

    #[test]
    fn test_no_double_detection() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&block("a.md", "hi"));
        assert!(detector.take_block().is_some());
        // Residue resembling the consumed block must not re-match.
        detector.push("</writeToFile>");
        assert!(detector.take_block().is_none());
    }

    #[test]
    fn test_missing_path_discarded_and_stream_continues() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!(
            "{OPEN_TAG}<content>orphan</content>{CLOSE_TAG}{}",
            block("ok.md", "y")
        ));
        // The malformed block is skipped, the next valid one comes out.
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "ok.md");
        assert!(detector.take_block().is_none());
    }

    #[test]
    fn test_blank_path_counts_as_missing() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!(
            "{OPEN_TAG}<path>  </path><content>x</content>{CLOSE_TAG}"
        ));
        assert!(detector.take_block().is_none());
        assert_eq!(detector.buffered_len(), 0);
    }

    #[test]
    fn test_missing_content_becomes_empty() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!("{OPEN_TAG}<path>a.md</path>{CLOSE_TAG}"));
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "a.md");
        assert_eq!(fields.content, "");
    }

    #[test]
    fn test_two_blocks_in_one_chunk_in_order() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!("{}{}", block("first.md", "1"), block("second.md", "2")));
        let found = drain(&mut detector);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].path, "first.md");
        assert_eq!(found[1].path, "second.md");
    }

    #[test]
    fn test_unterminated_block_waits() {
        let mut detector = StreamBlockDetector::new();
        detector.push("<writeToFile><path>a.md</path><content>partial");
        assert!(detector.take_block().is_none());
        assert!(detector.buffered_len() > 0);
        // The close tag arriving later completes it.
        detector.push("</content></writeToFile>");
        assert_eq!(detector.take_block().unwrap().content, "partial");
    }

    #[test]
    fn test_earliest_close_tag_wins() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&format!(
            "{OPEN_TAG}<path>a.md</path><content>x</content>{CLOSE_TAG} tail {CLOSE_TAG}"
        ));
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.content, "x");
        // The second close tag stays in the buffer untouched.
        assert_eq!(detector.buffered_len(), " tail </writeToFile>".len());
    }

    #[test]
    fn test_path_is_trimmed_content_is_verbatim() {
        let mut detector = StreamBlockDetector::new();
        detector.push(&block("\n  a.md\n", "  spaced  "));
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "a.md");
        assert_eq!(fields.content, "  spaced  ");
    }

    #[test]
    fn test_multiline_fields() {
        let mut detector = StreamBlockDetector::new();
        detector.push(
            "<writeToFile>\n  <path>src/lib.rs</path>\n  <content>fn main() {\n}\n</content>\n</writeToFile>",
        );
        let fields = detector.take_block().unwrap();
        assert_eq!(fields.path, "src/lib.rs");
        assert_eq!(fields.content, "fn main() {\n}\n");
    }
}
