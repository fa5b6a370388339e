//! Core document types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::inline::InlineContent;

/// Stable identifier of a block within one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(u64);

impl BlockId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blk-{}", self.0)
    }
}

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAlign {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Table content: a header row plus body rows of styled cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub alignments: Vec<ColumnAlign>,
    pub header: Vec<InlineContent>,
    pub rows: Vec<Vec<InlineContent>>,
}

impl Table {
    /// Number of columns, taken as the widest row.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .chain(std::iter::once(self.alignments.len()))
            .max()
            .unwrap_or(0)
    }
}

/// The typed payload of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph {
        content: InlineContent,
    },
    Heading {
        level: u8,
        content: InlineContent,
    },
    BulletListItem {
        depth: u8,
        content: InlineContent,
    },
    NumberedListItem {
        depth: u8,
        content: InlineContent,
    },
    CheckListItem {
        depth: u8,
        checked: bool,
        content: InlineContent,
    },
    Quote {
        content: InlineContent,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Image {
        url: String,
        alt: String,
    },
    Table(Table),
    Divider,
}

/// Target of a block type change. Carries no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockType {
    Paragraph,
    Heading(u8),
    BulletListItem,
    NumberedListItem,
    CheckListItem,
    Quote,
    CodeBlock(Option<String>),
}

impl BlockKind {
    pub fn paragraph(text: &str) -> Self {
        Self::Paragraph {
            content: InlineContent::plain(text),
        }
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Self::Heading {
            level: level.clamp(1, 6),
            content: InlineContent::plain(text),
        }
    }

    pub const fn empty_paragraph() -> Self {
        Self::Paragraph {
            content: InlineContent::new(),
        }
    }

    /// Styled content of blocks that hold inline text.
    pub const fn inline(&self) -> Option<&InlineContent> {
        match self {
            Self::Paragraph { content }
            | Self::Heading { content, .. }
            | Self::BulletListItem { content, .. }
            | Self::NumberedListItem { content, .. }
            | Self::CheckListItem { content, .. }
            | Self::Quote { content } => Some(content),
            Self::CodeBlock { .. } | Self::Image { .. } | Self::Table(_) | Self::Divider => None,
        }
    }

    pub fn inline_mut(&mut self) -> Option<&mut InlineContent> {
        match self {
            Self::Paragraph { content }
            | Self::Heading { content, .. }
            | Self::BulletListItem { content, .. }
            | Self::NumberedListItem { content, .. }
            | Self::CheckListItem { content, .. }
            | Self::Quote { content } => Some(content),
            Self::CodeBlock { .. } | Self::Image { .. } | Self::Table(_) | Self::Divider => None,
        }
    }

    /// Whether a cursor can be placed inside this block.
    pub const fn is_text(&self) -> bool {
        self.inline().is_some() || matches!(self, Self::CodeBlock { .. })
    }

    /// Editable length in chars; zero for non-text blocks.
    pub fn text_len(&self) -> usize {
        match self {
            Self::CodeBlock { code, .. } => code.chars().count(),
            _ => self.inline().map_or(0, InlineContent::char_len),
        }
    }

    /// The block's text with styling dropped, used when a block must degrade.
    pub fn plain_text(&self) -> String {
        match self {
            Self::CodeBlock { code, .. } => code.clone(),
            Self::Image { url, alt } => {
                if alt.is_empty() {
                    url.clone()
                } else {
                    alt.clone()
                }
            }
            Self::Table(table) => table
                .header
                .iter()
                .chain(table.rows.iter().flatten())
                .map(InlineContent::plain_text)
                .collect::<Vec<_>>()
                .join(" "),
            Self::Divider => String::new(),
            _ => self.inline().map(InlineContent::plain_text).unwrap_or_default(),
        }
    }

    pub const fn list_depth(&self) -> Option<u8> {
        match self {
            Self::BulletListItem { depth, .. }
            | Self::NumberedListItem { depth, .. }
            | Self::CheckListItem { depth, .. } => Some(*depth),
            _ => None,
        }
    }

    fn list_depth_mut(&mut self) -> Option<&mut u8> {
        match self {
            Self::BulletListItem { depth, .. }
            | Self::NumberedListItem { depth, .. }
            | Self::CheckListItem { depth, .. } => Some(depth),
            _ => None,
        }
    }

    pub const fn is_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph { .. })
    }

    /// A paragraph with no visible text.
    pub fn is_blank_paragraph(&self) -> bool {
        matches!(self, Self::Paragraph { content } if content.plain_text().trim().is_empty())
    }

    /// Convert a text block to another text block type, keeping its text.
    ///
    /// Returns `None` for images, tables and dividers.
    pub fn converted(&self, target: &BlockType) -> Option<Self> {
        if !self.is_text() {
            return None;
        }
        let depth = self.list_depth().unwrap_or(0);
        let checked = matches!(self, Self::CheckListItem { checked: true, .. });
        let content = || match self {
            Self::CodeBlock { code, .. } => InlineContent::plain(code.as_str()),
            _ => self.inline().cloned().unwrap_or_default(),
        };
        Some(match target {
            BlockType::CodeBlock(language) => Self::CodeBlock {
                language: language.clone().or_else(|| match self {
                    Self::CodeBlock { language, .. } => language.clone(),
                    _ => None,
                }),
                code: self.plain_text(),
            },
            BlockType::Paragraph => Self::Paragraph { content: content() },
            BlockType::Heading(level) => Self::Heading {
                level: (*level).clamp(1, 6),
                content: content(),
            },
            BlockType::BulletListItem => Self::BulletListItem {
                depth,
                content: content(),
            },
            BlockType::NumberedListItem => Self::NumberedListItem {
                depth,
                content: content(),
            },
            BlockType::CheckListItem => Self::CheckListItem {
                depth,
                checked,
                content: content(),
            },
            BlockType::Quote => Self::Quote { content: content() },
        })
    }

    /// Structural comparison ignoring cosmetic whitespace and run boundaries.
    pub fn equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::CodeBlock {
                    language: a_lang,
                    code: a_code,
                },
                Self::CodeBlock {
                    language: b_lang,
                    code: b_code,
                },
            ) => a_lang == b_lang && a_code.trim_end() == b_code.trim_end(),
            (Self::Image { url: a_url, alt: a_alt }, Self::Image { url: b_url, alt: b_alt }) => {
                a_url == b_url && a_alt.trim() == b_alt.trim()
            }
            (Self::Table(a), Self::Table(b)) => {
                let cells = |row: &[InlineContent]| {
                    row.iter().map(InlineContent::signature).collect::<Vec<_>>()
                };
                a.alignments == b.alignments
                    && cells(&a.header) == cells(&b.header)
                    && a.rows.len() == b.rows.len()
                    && a.rows
                        .iter()
                        .zip(&b.rows)
                        .all(|(ra, rb)| cells(ra) == cells(rb))
            }
            (Self::Divider, Self::Divider) => true,
            _ => {
                let (Some(a), Some(b)) = (self.inline(), other.inline()) else {
                    return false;
                };
                std::mem::discriminant(self) == std::mem::discriminant(other)
                    && self.heading_level() == other.heading_level()
                    && self.list_depth() == other.list_depth()
                    && self.is_checked() == other.is_checked()
                    && a.signature() == b.signature()
            }
        }
    }

    const fn heading_level(&self) -> Option<u8> {
        match self {
            Self::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    const fn is_checked(&self) -> Option<bool> {
        match self {
            Self::CheckListItem { checked, .. } => Some(*checked),
            _ => None,
        }
    }
}

/// A block with its stable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// An ordered sequence of blocks, alive for one editing session.
///
/// Identifiers are allocated from a per-document counter and never reused,
/// so a removed block's id cannot come back and alias a new block.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlockDocument {
    blocks: Vec<Block>,
    #[serde(skip)]
    next_id: u64,
}

impl BlockDocument {
    /// Create an empty document.
    pub const fn new() -> Self {
        Self {
            blocks: Vec::new(),
            next_id: 1,
        }
    }

    /// Document holding a single empty paragraph, the state of a fresh editor.
    pub fn with_empty_paragraph() -> Self {
        let mut doc = Self::new();
        doc.push(BlockKind::empty_paragraph());
        doc
    }

    pub fn from_kinds(kinds: impl IntoIterator<Item = BlockKind>) -> Self {
        let mut doc = Self::new();
        for kind in kinds {
            doc.push(kind);
        }
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    pub fn first_id(&self) -> Option<BlockId> {
        self.blocks.first().map(|block| block.id)
    }

    pub fn last_id(&self) -> Option<BlockId> {
        self.blocks.last().map(|block| block.id)
    }

    pub fn push(&mut self, kind: BlockKind) -> BlockId {
        let id = self.allocate_id();
        self.blocks.push(Block { id, kind });
        id
    }

    /// Insert at `index`, clamped to the end of the document.
    pub fn insert(&mut self, index: usize, kind: BlockKind) -> BlockId {
        let id = self.allocate_id();
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, Block { id, kind });
        id
    }

    pub fn insert_after(&mut self, anchor: BlockId, kind: BlockKind) -> BlockId {
        let index = self.position(anchor).map_or(self.blocks.len(), |pos| pos + 1);
        self.insert(index, kind)
    }

    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let index = self.position(id)?;
        Some(self.blocks.remove(index))
    }

    /// Move a block to `to` (clamped). Returns `false` for unknown ids.
    pub fn move_block(&mut self, id: BlockId, to: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let block = self.blocks.remove(from);
        let to = to.min(self.blocks.len());
        self.blocks.insert(to, block);
        true
    }

    /// Clamp every list item to at most one level below the item before it.
    /// An item not preceded by one goes to depth zero. Blank paragraphs do
    /// not end a list, since they serialize to nothing.
    ///
    /// Returns whether any depth changed.
    pub fn normalize_list_depths(&mut self) -> bool {
        let mut changed = false;
        let mut previous: Option<u8> = None;
        for block in &mut self.blocks {
            if block.kind.is_blank_paragraph() {
                continue;
            }
            let Some(depth) = block.kind.list_depth_mut() else {
                previous = None;
                continue;
            };
            let limit = previous.map_or(0, |above| above.saturating_add(1));
            if *depth > limit {
                *depth = limit;
                changed = true;
            }
            previous = Some(*depth);
        }
        changed
    }

    pub fn kinds(&self) -> impl Iterator<Item = &BlockKind> {
        self.blocks.iter().map(|block| &block.kind)
    }

    /// Whether both documents hold the same content, ignoring ids, empty
    /// paragraphs and cosmetic whitespace.
    pub fn equivalent(&self, other: &Self) -> bool {
        let significant = |doc: &'_ Self| -> Vec<BlockKind> {
            doc.kinds()
                .filter(|kind| !kind.is_blank_paragraph())
                .cloned()
                .collect()
        };
        let a = significant(self);
        let b = significant(other);
        a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.equivalent(y))
    }

    const fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_not_reused() {
        let mut doc = BlockDocument::new();
        let a = doc.push(BlockKind::paragraph("a"));
        doc.remove(a);
        let b = doc.push(BlockKind::paragraph("b"));
        assert_ne!(a, b, "removed ids must not be reused");
    }

    #[test]
    fn test_insert_after_unknown_anchor_appends() {
        let mut doc = BlockDocument::from_kinds([BlockKind::paragraph("a")]);
        let foreign = BlockId(99);
        let id = doc.insert_after(foreign, BlockKind::Divider);
        assert_eq!(doc.position(id), Some(1));
    }

    #[test]
    fn test_move_block_keeps_identity() {
        let mut doc = BlockDocument::from_kinds([
            BlockKind::paragraph("a"),
            BlockKind::paragraph("b"),
            BlockKind::paragraph("c"),
        ]);
        let first = doc.first_id().unwrap();
        assert!(doc.move_block(first, 2));
        assert_eq!(doc.position(first), Some(2));
        assert_eq!(doc.blocks()[2].kind.plain_text(), "a");
    }

    #[test]
    fn test_normalize_list_depths_clamps_orphans() {
        let item = |depth| BlockKind::BulletListItem {
            depth,
            content: "x".into(),
        };
        let mut doc = BlockDocument::from_kinds([
            item(2),
            item(0),
            BlockKind::empty_paragraph(),
            item(3),
            BlockKind::paragraph("break"),
            item(1),
        ]);
        assert!(doc.normalize_list_depths());
        let depths: Vec<_> = doc.kinds().map(BlockKind::list_depth).collect();
        assert_eq!(depths, vec![Some(0), Some(0), None, Some(1), None, Some(0)]);
        assert!(!doc.normalize_list_depths(), "second pass must be a no-op");
    }

    #[test]
    fn test_converted_keeps_text_and_depth() {
        let item = BlockKind::BulletListItem {
            depth: 1,
            content: InlineContent::plain("x"),
        };
        let numbered = item.converted(&BlockType::NumberedListItem).unwrap();
        assert_eq!(numbered.list_depth(), Some(1));
        assert_eq!(numbered.plain_text(), "x");
    }

    #[test]
    fn test_converted_rejects_non_text_blocks() {
        let image = BlockKind::Image {
            url: "https://cdn.example.com/a.png".to_string(),
            alt: String::new(),
        };
        assert!(image.converted(&BlockType::Paragraph).is_none());
    }

    #[test]
    fn test_converted_clamps_heading_level() {
        let para = BlockKind::paragraph("title");
        let heading = para.converted(&BlockType::Heading(9)).unwrap();
        assert!(matches!(heading, BlockKind::Heading { level: 6, .. }));
    }

    #[test]
    fn test_equivalent_ignores_empty_paragraphs_and_ids() {
        let a = BlockDocument::from_kinds([
            BlockKind::paragraph("hello"),
            BlockKind::empty_paragraph(),
            BlockKind::heading(2, "title"),
        ]);
        let b = BlockDocument::from_kinds([
            BlockKind::empty_paragraph(),
            BlockKind::paragraph("hello "),
            BlockKind::heading(2, "title"),
        ]);
        assert!(a.equivalent(&b));
    }

    #[test]
    fn test_equivalent_detects_kind_change() {
        let a = BlockDocument::from_kinds([BlockKind::heading(2, "x")]);
        let b = BlockDocument::from_kinds([BlockKind::heading(3, "x")]);
        assert!(!a.equivalent(&b));
    }
}
