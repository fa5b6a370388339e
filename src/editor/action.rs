use thiserror::Error;
use tracing::debug;

use std::ops::Range;

use crate::document::{
    BlockDocument, BlockId, BlockKind, BlockType, InlineContent, InlineMark, byte_index,
};

/// Caret position in the visual editor: a block and a char offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCursor {
    pub block: BlockId,
    pub offset: usize,
}

impl BlockCursor {
    pub const fn new(block: BlockId, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// A single user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Type text at the cursor.
    InsertText(String),
    /// Backspace.
    DeleteBackward,
    /// Enter.
    SplitBlock,
    SetBlockType(BlockType),
    ToggleChecked,
    MoveBlock { block: BlockId, to: usize },
    DeleteBlock(BlockId),
    /// Insert a block after `after`, or at the top when `None`.
    InsertBlock {
        after: Option<BlockId>,
        kind: BlockKind,
    },
    /// Insert an image block after the cursor's block.
    InsertImage { url: String, alt: String },
    SetCursor(BlockCursor),
    /// Toggle a mark over a char range of the cursor's block. The mark is
    /// removed when the whole range already carries it, added otherwise.
    ToggleMark { range: Range<usize>, mark: InlineMark },
    /// Link a char range of the cursor's block, or unlink it with `None`.
    SetLink { range: Range<usize>, url: Option<String> },
}

/// An edit that could not be applied. The document is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),
    #[error("block {0} does not hold text")]
    NotTextBlock(BlockId),
    #[error("block {0} is not a checklist item")]
    NotChecklistItem(BlockId),
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Apply `action` to `doc`, moving `cursor` as the edit implies.
///
/// Blocks the edit does not touch keep their ids. After a successful edit,
/// list items nest at most one level below the item above them.
///
/// # Errors
/// Returns [`EditError`] when the action refers to a block or offset that
/// does not exist or does not fit the block's kind.
pub fn apply(
    doc: &mut BlockDocument,
    cursor: &mut BlockCursor,
    action: EditAction,
) -> Result<(), EditError> {
    let result = match action {
        EditAction::InsertText(text) => insert_text(doc, cursor, &text),
        EditAction::DeleteBackward => delete_backward(doc, cursor),
        EditAction::SplitBlock => split_block(doc, cursor),
        EditAction::SetBlockType(target) => set_block_type(doc, cursor, &target),
        EditAction::ToggleChecked => toggle_checked(doc, cursor),
        EditAction::MoveBlock { block, to } => move_block(doc, block, to),
        EditAction::DeleteBlock(block) => delete_block(doc, cursor, block),
        EditAction::InsertBlock { after, kind } => insert_block(doc, cursor, after, kind),
        EditAction::InsertImage { url, alt } => {
            insert_image(doc, cursor, url, alt);
            Ok(())
        }
        EditAction::SetCursor(target) => set_cursor(doc, cursor, target),
        EditAction::ToggleMark { range, mark } => toggle_mark(doc, cursor, range, mark),
        EditAction::SetLink { range, url } => set_link(doc, cursor, range, url),
    };
    if result.is_ok() && doc.normalize_list_depths() {
        debug!("list items re-nested after edit");
    }
    result
}

fn current_kind<'a>(
    doc: &'a mut BlockDocument,
    cursor: &BlockCursor,
) -> Result<&'a mut BlockKind, EditError> {
    doc.get_mut(cursor.block)
        .map(|block| &mut block.kind)
        .ok_or(EditError::UnknownBlock(cursor.block))
}

fn insert_text(doc: &mut BlockDocument, cursor: &mut BlockCursor, text: &str) -> Result<(), EditError> {
    let kind = current_kind(doc, cursor)?;
    let inserted = text.chars().count();
    match kind {
        BlockKind::CodeBlock { code, .. } => {
            let at = byte_index(code, cursor.offset);
            code.insert_str(at, text);
            cursor.offset += inserted;
        }
        _ => {
            if let Some(content) = kind.inline_mut() {
                let offset = cursor.offset.min(content.char_len());
                content.insert_text(offset, text);
                cursor.offset = offset + inserted;
            } else {
                // Typing on an image, table or divider starts a new paragraph.
                let id = doc.insert_after(
                    cursor.block,
                    BlockKind::Paragraph {
                        content: InlineContent::plain(text),
                    },
                );
                *cursor = BlockCursor::new(id, inserted);
            }
        }
    }
    Ok(())
}

fn delete_backward(doc: &mut BlockDocument, cursor: &mut BlockCursor) -> Result<(), EditError> {
    let kind = current_kind(doc, cursor)?;

    if cursor.offset > 0 {
        match kind {
            BlockKind::CodeBlock { code, .. } => {
                let at = byte_index(code, cursor.offset - 1);
                if at < code.len() {
                    code.remove(at);
                }
            }
            _ => {
                if let Some(content) = kind.inline_mut() {
                    content.remove_char_before(cursor.offset.min(content.char_len()));
                }
            }
        }
        cursor.offset = cursor.offset.saturating_sub(1).min(kind.text_len());
        return Ok(());
    }

    // At the start of a block: unwrap to a paragraph first, merge second.
    if kind.is_text() && !kind.is_paragraph() {
        if let Some(paragraph) = kind.converted(&BlockType::Paragraph) {
            *kind = paragraph;
        }
        return Ok(());
    }
    if !kind.is_paragraph() {
        return Ok(());
    }

    let Some(index) = doc.position(cursor.block) else {
        return Err(EditError::UnknownBlock(cursor.block));
    };
    if index == 0 {
        return Ok(());
    }
    let previous = doc.blocks()[index - 1].id;
    let previous_is_text = doc
        .get(previous)
        .is_some_and(|block| block.kind.is_text());

    if previous_is_text {
        let Some(removed) = doc.remove(cursor.block) else {
            return Err(EditError::UnknownBlock(cursor.block));
        };
        let content = removed.kind.inline().cloned().unwrap_or_default();
        let target = current_kind(doc, &BlockCursor::new(previous, 0))?;
        let joined_at = target.text_len();
        match target {
            BlockKind::CodeBlock { code, .. } => code.push_str(&content.plain_text()),
            _ => {
                if let Some(previous_content) = target.inline_mut() {
                    previous_content.append(content);
                }
            }
        }
        *cursor = BlockCursor::new(previous, joined_at);
    } else {
        // Backspace into an image or divider removes it.
        debug!(block = %previous, "backspace removed non-text block");
        doc.remove(previous);
    }
    Ok(())
}

fn split_block(doc: &mut BlockDocument, cursor: &mut BlockCursor) -> Result<(), EditError> {
    let kind = current_kind(doc, cursor)?;

    if kind.list_depth().is_some() && kind.text_len() == 0 {
        // Enter on an empty list item ends the list.
        *kind = BlockKind::empty_paragraph();
        cursor.offset = 0;
        return Ok(());
    }

    let next = match kind {
        BlockKind::CodeBlock { code, .. } => {
            let at = byte_index(code, cursor.offset);
            code.insert(at, '\n');
            cursor.offset += 1;
            return Ok(());
        }
        BlockKind::BulletListItem { depth, content } => BlockKind::BulletListItem {
            depth: *depth,
            content: content.split_off(cursor.offset),
        },
        BlockKind::NumberedListItem { depth, content } => BlockKind::NumberedListItem {
            depth: *depth,
            content: content.split_off(cursor.offset),
        },
        BlockKind::CheckListItem { depth, content, .. } => BlockKind::CheckListItem {
            depth: *depth,
            checked: false,
            content: content.split_off(cursor.offset),
        },
        other => match other.inline_mut() {
            Some(content) => BlockKind::Paragraph {
                content: content.split_off(cursor.offset),
            },
            None => BlockKind::empty_paragraph(),
        },
    };
    let id = doc.insert_after(cursor.block, next);
    *cursor = BlockCursor::new(id, 0);
    Ok(())
}

fn set_block_type(
    doc: &mut BlockDocument,
    cursor: &mut BlockCursor,
    target: &BlockType,
) -> Result<(), EditError> {
    let kind = current_kind(doc, cursor)?;
    let converted = kind
        .converted(target)
        .ok_or(EditError::NotTextBlock(cursor.block))?;
    *kind = converted;
    cursor.offset = cursor.offset.min(kind.text_len());
    Ok(())
}

fn toggle_checked(doc: &mut BlockDocument, cursor: &BlockCursor) -> Result<(), EditError> {
    match current_kind(doc, cursor)? {
        BlockKind::CheckListItem { checked, .. } => {
            *checked = !*checked;
            Ok(())
        }
        _ => Err(EditError::NotChecklistItem(cursor.block)),
    }
}

/// The cursor block's inline content, with `range` checked against it.
fn inline_range<'a>(
    doc: &'a mut BlockDocument,
    cursor: &BlockCursor,
    range: &Range<usize>,
) -> Result<&'a mut InlineContent, EditError> {
    let content = current_kind(doc, cursor)?
        .inline_mut()
        .ok_or(EditError::NotTextBlock(cursor.block))?;
    let len = content.char_len();
    if range.end > len || range.start > range.end {
        return Err(EditError::IndexOutOfRange {
            index: range.end.max(range.start),
            len,
        });
    }
    Ok(content)
}

fn toggle_mark(
    doc: &mut BlockDocument,
    cursor: &BlockCursor,
    range: Range<usize>,
    mark: InlineMark,
) -> Result<(), EditError> {
    let content = inline_range(doc, cursor, &range)?;
    let on = !content.all_styled(range.clone(), |style| style.has(mark));
    content.restyle(range, |style| style.set(mark, on));
    Ok(())
}

fn set_link(
    doc: &mut BlockDocument,
    cursor: &BlockCursor,
    range: Range<usize>,
    url: Option<String>,
) -> Result<(), EditError> {
    let content = inline_range(doc, cursor, &range)?;
    let url = url.filter(|url| !url.trim().is_empty());
    content.restyle(range, |style| style.link.clone_from(&url));
    Ok(())
}

fn move_block(doc: &mut BlockDocument, block: BlockId, to: usize) -> Result<(), EditError> {
    if to >= doc.len() {
        return Err(EditError::IndexOutOfRange {
            index: to,
            len: doc.len(),
        });
    }
    if doc.move_block(block, to) {
        Ok(())
    } else {
        Err(EditError::UnknownBlock(block))
    }
}

fn delete_block(doc: &mut BlockDocument, cursor: &mut BlockCursor, block: BlockId) -> Result<(), EditError> {
    let index = doc.position(block).ok_or(EditError::UnknownBlock(block))?;
    doc.remove(block);
    if doc.is_empty() {
        doc.push(BlockKind::empty_paragraph());
    }
    if cursor.block == block {
        // Land at the end of the block before, or the start of the one after.
        *cursor = match index.checked_sub(1).map(|i| &doc.blocks()[i]) {
            Some(previous) => BlockCursor::new(previous.id, previous.kind.text_len()),
            None => BlockCursor::new(doc.blocks()[0].id, 0),
        };
    }
    Ok(())
}

fn insert_block(
    doc: &mut BlockDocument,
    cursor: &mut BlockCursor,
    after: Option<BlockId>,
    kind: BlockKind,
) -> Result<(), EditError> {
    let id = match after {
        Some(anchor) => {
            if doc.position(anchor).is_none() {
                return Err(EditError::UnknownBlock(anchor));
            }
            doc.insert_after(anchor, kind)
        }
        None => doc.insert(0, kind),
    };
    *cursor = BlockCursor::new(id, 0);
    Ok(())
}

/// Insert an image after the cursor's block.
///
/// Falls back to the end of the document when the cursor's block no longer
/// exists. A blank paragraph under the cursor is replaced by the image.
pub(crate) fn insert_image(doc: &mut BlockDocument, cursor: &mut BlockCursor, url: String, alt: String) -> BlockId {
    let image = BlockKind::Image { url, alt };
    let replace_blank = doc
        .get(cursor.block)
        .is_some_and(|block| block.kind.is_blank_paragraph());

    let id = if replace_blank {
        let anchor = cursor.block;
        let id = doc.insert_after(anchor, image);
        doc.remove(anchor);
        id
    } else {
        if doc.get(cursor.block).is_none() {
            debug!(block = %cursor.block, "cursor block gone, appending image");
        }
        doc.insert_after(cursor.block, image)
    };

    // Leave a paragraph to keep typing in after the image.
    let after = doc.insert_after(id, BlockKind::empty_paragraph());
    *cursor = BlockCursor::new(after, 0);
    doc.normalize_list_depths();
    id
}

fn set_cursor(doc: &BlockDocument, cursor: &mut BlockCursor, target: BlockCursor) -> Result<(), EditError> {
    let block = doc
        .get(target.block)
        .ok_or(EditError::UnknownBlock(target.block))?;
    let len = block.kind.text_len();
    if target.offset > len {
        return Err(EditError::IndexOutOfRange {
            index: target.offset,
            len,
        });
    }
    *cursor = target;
    Ok(())
}
