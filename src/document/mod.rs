//! Block document model and its markdown bridge.
//!
//! This module handles:
//! - The in-memory block document used by the visual editor
//! - Parsing markdown into blocks with comrak
//! - Serializing blocks back to markdown
//!
//! Markdown is the stored form of an article. A block document lives only for
//! one editing session and is rebuilt from markdown when an editor opens.

mod inline;
mod parser;
mod serialize;
mod types;

pub(crate) use inline::byte_index;
pub use inline::{InlineContent, InlineMark, InlineRun, InlineStyle};
pub use parser::parse;
pub(crate) use parser::is_closing_fence;
pub use serialize::serialize;
pub use types::{Block, BlockDocument, BlockId, BlockKind, BlockType, ColumnAlign, Table};

/// Parse markdown and serialize it again.
///
/// Used to bring hand-written or imported markdown into the canonical form the
/// editor produces.
pub fn normalize(source: &str) -> String {
    serialize(&parse(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        let source = "#  Title\n\n* one\n* two\n\nSome *text*   here.\n";
        let once = normalize(source);
        let twice = normalize(&once);
        assert_eq!(once, twice, "normalizing twice should change nothing");
    }

    #[test]
    fn test_normalize_canonical_markers() {
        let normalized = normalize("* one\n* two\n");
        assert_eq!(normalized, "- one\n- two\n");
    }

    #[test]
    fn test_round_trip_keeps_content() {
        let source = "## News\n\nA **bold** claim with a [link](https://example.com).\n\n> quoted\n\n```rust\nfn main() {}\n```\n";
        let doc = parse(source);
        let again = parse(&serialize(&doc));
        assert!(doc.equivalent(&again), "round trip should preserve content");
    }
}
