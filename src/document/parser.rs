//! Markdown parsing into blocks with comrak.

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use tracing::debug;

use super::inline::{InlineContent, InlineRun, InlineStyle};
use super::types::{BlockDocument, BlockKind, ColumnAlign, Table};

impl BlockDocument {
    /// Parse markdown into a block document.
    ///
    /// # Example
    ///
    /// ```
    /// use newsdesk::document::{BlockDocument, BlockKind};
    ///
    /// let doc = BlockDocument::from_markdown("# Hello\n\nWorld");
    /// assert_eq!(doc.len(), 2);
    /// assert!(matches!(doc.blocks()[0].kind, BlockKind::Heading { level: 1, .. }));
    /// ```
    pub fn from_markdown(source: &str) -> Self {
        parse(source)
    }
}

/// Parse markdown source into blocks.
///
/// Never fails: constructs the block model has no shape for degrade to
/// paragraphs of their plain text. Empty input yields a single empty
/// paragraph so an editor always has somewhere to put the cursor.
pub fn parse(source: &str) -> BlockDocument {
    let _scope = crate::perf::scope("document.parse");
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let source_lines: Vec<&str> = source.lines().collect();
    let mut kinds = Vec::new();
    collect_blocks(root, &source_lines, &mut kinds);

    if kinds.is_empty() {
        return BlockDocument::with_empty_paragraph();
    }
    BlockDocument::from_kinds(kinds)
}

/// Parser options for the editor.
///
/// Autolinks stay off: a bare URL typed into a paragraph is text to the
/// editor, and the renderer linkifies it at display time.
pub(crate) fn create_options() -> Options {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.tasklist = true;

    options
}

fn collect_blocks<'a>(node: &'a AstNode<'a>, source_lines: &[&str], out: &mut Vec<BlockKind>) {
    match &node.data.borrow().value {
        NodeValue::Document => {
            for child in node.children() {
                collect_blocks(child, source_lines, out);
            }
        }

        NodeValue::Paragraph => {
            push_segments(collect_segments(node), out, |content| BlockKind::Paragraph {
                content,
            });
        }

        NodeValue::Heading(heading) => {
            let level = heading.level.clamp(1, 6);
            let segments = collect_segments(node);
            let content = flatten_text_segments(&segments);
            out.push(BlockKind::Heading { level, content });
            push_images_only(segments, out);
        }

        NodeValue::CodeBlock(code_block) => {
            let closed = !code_block.fenced
                || fence_is_closed(
                    source_lines,
                    node,
                    code_block.fence_char,
                    code_block.fence_length,
                );
            if closed {
                let language = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .filter(|lang| !lang.is_empty())
                    .map(ToString::to_string);
                let code = code_block
                    .literal
                    .strip_suffix('\n')
                    .unwrap_or(&code_block.literal)
                    .to_string();
                out.push(BlockKind::CodeBlock { language, code });
            } else {
                debug!(
                    info = %code_block.info,
                    "unterminated code fence, keeping remaining content as text"
                );
                let fence = char::from(code_block.fence_char)
                    .to_string()
                    .repeat(code_block.fence_length);
                let mut text = format!("{fence}{}", code_block.info);
                let body = code_block.literal.trim_end();
                if !body.is_empty() {
                    text.push('\n');
                    text.push_str(body);
                }
                out.push(BlockKind::Paragraph {
                    content: InlineContent::plain(text),
                });
            }
        }

        NodeValue::List(list) => {
            collect_list(node, list.list_type, 0, source_lines, out);
        }

        NodeValue::BlockQuote => {
            let mut content = InlineContent::new();
            for child in node.children() {
                let part = match &child.data.borrow().value {
                    NodeValue::Paragraph => flatten_text_segments(&collect_segments(child)),
                    _ => InlineContent::plain(extract_text(child).trim_end()),
                };
                if part.is_empty() {
                    continue;
                }
                if !content.is_empty() {
                    content.push(InlineRun::plain("\n"));
                }
                content.append(part);
            }
            out.push(BlockKind::Quote { content });
        }

        NodeValue::ThematicBreak => out.push(BlockKind::Divider),

        NodeValue::Table(table) => {
            let alignments = table.alignments.iter().copied().map(column_align).collect();
            out.push(BlockKind::Table(collect_table(node, alignments)));
        }

        NodeValue::HtmlBlock(html) => {
            debug!("raw html block kept as text");
            let text = html.literal.trim();
            if !text.is_empty() {
                out.push(BlockKind::Paragraph {
                    content: InlineContent::plain(text),
                });
            }
        }

        _ => {
            let text = extract_text(node);
            let text = text.trim();
            if !text.is_empty() {
                debug!("unsupported block construct kept as text");
                out.push(BlockKind::Paragraph {
                    content: InlineContent::plain(text),
                });
            }
        }
    }
}

fn collect_list<'a>(
    list_node: &'a AstNode<'a>,
    list_type: ListType,
    depth: u8,
    source_lines: &[&str],
    out: &mut Vec<BlockKind>,
) {
    for item in list_node.children() {
        let checked = match &item.data.borrow().value {
            NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
            NodeValue::Item(_) => None,
            _ => continue,
        };

        let mut content: Option<InlineContent> = None;
        let mut trailing = Vec::new();
        for child in item.children() {
            match &child.data.borrow().value {
                NodeValue::Paragraph if content.is_none() => {
                    let segments = collect_segments(child);
                    content = Some(flatten_text_segments(&segments));
                    push_images_only(segments, &mut trailing);
                }
                NodeValue::List(nested) => {
                    let nested_type = nested.list_type;
                    collect_list(
                        child,
                        nested_type,
                        depth.saturating_add(1),
                        source_lines,
                        &mut trailing,
                    );
                }
                _ => collect_blocks(child, source_lines, &mut trailing),
            }
        }

        let content = content.unwrap_or_default();
        let kind = match (checked, list_type) {
            (Some(checked), _) => BlockKind::CheckListItem {
                depth,
                checked,
                content,
            },
            (None, ListType::Bullet) => BlockKind::BulletListItem { depth, content },
            (None, ListType::Ordered) => BlockKind::NumberedListItem { depth, content },
        };
        out.push(kind);
        out.extend(trailing);
    }
}

fn collect_table<'a>(table_node: &'a AstNode<'a>, alignments: Vec<ColumnAlign>) -> Table {
    let mut table = Table {
        alignments,
        ..Table::default()
    };
    for row_node in table_node.children() {
        let is_header = match row_node.data.borrow().value {
            NodeValue::TableRow(header) => header,
            _ => continue,
        };
        let cells: Vec<InlineContent> = row_node
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| flatten_text_segments(&collect_segments(cell)))
            .collect();
        if is_header {
            table.header = cells;
        } else {
            table.rows.push(cells);
        }
    }
    table
}

const fn column_align(alignment: TableAlignment) -> ColumnAlign {
    match alignment {
        TableAlignment::None => ColumnAlign::None,
        TableAlignment::Left => ColumnAlign::Left,
        TableAlignment::Center => ColumnAlign::Center,
        TableAlignment::Right => ColumnAlign::Right,
    }
}

/// Whether a fenced code block's last source line is a closing fence.
fn fence_is_closed<'a>(
    source_lines: &[&str],
    node: &'a AstNode<'a>,
    fence_char: u8,
    fence_length: usize,
) -> bool {
    let sourcepos = node.data.borrow().sourcepos;
    if sourcepos.end.line <= sourcepos.start.line {
        return false;
    }
    let Some(line) = source_lines.get(sourcepos.end.line.saturating_sub(1)) else {
        return false;
    };
    is_closing_fence(line, char::from(fence_char), fence_length)
}

pub(crate) fn is_closing_fence(line: &str, fence_char: char, fence_length: usize) -> bool {
    // Closing fences may sit inside list or quote containers.
    let trimmed = line.trim_start_matches(|c: char| c == '>' || c.is_whitespace());
    let run = trimmed.chars().take_while(|c| *c == fence_char).count();
    run >= fence_length && trimmed[run * fence_char.len_utf8()..].trim().is_empty()
}

/// A piece of paragraph content: styled text, or an image that becomes its
/// own block.
#[derive(Debug)]
enum Segment {
    Text(InlineContent),
    Image { url: String, alt: String },
}

fn collect_segments<'a>(node: &'a AstNode<'a>) -> Vec<Segment> {
    let mut segments = Vec::new();
    for child in node.children() {
        walk_inline(child, &InlineStyle::default(), &mut segments);
    }
    segments
}

fn push_run(segments: &mut Vec<Segment>, run: InlineRun) {
    if let Some(Segment::Text(content)) = segments.last_mut() {
        content.push(run);
    } else {
        segments.push(Segment::Text(InlineContent::from_runs([run])));
    }
}

fn walk_inline<'a>(node: &'a AstNode<'a>, style: &InlineStyle, segments: &mut Vec<Segment>) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => push_run(segments, InlineRun::new(text.clone(), style.clone())),
        NodeValue::Code(code) => {
            let mut code_style = style.clone();
            code_style.code = true;
            push_run(segments, InlineRun::new(code.literal.clone(), code_style));
        }
        NodeValue::Emph => {
            let mut next = style.clone();
            next.emphasis = true;
            for child in node.children() {
                walk_inline(child, &next, segments);
            }
        }
        NodeValue::Strong => {
            let mut next = style.clone();
            next.strong = true;
            for child in node.children() {
                walk_inline(child, &next, segments);
            }
        }
        NodeValue::Strikethrough => {
            let mut next = style.clone();
            next.strikethrough = true;
            for child in node.children() {
                walk_inline(child, &next, segments);
            }
        }
        NodeValue::Link(link) => {
            let mut next = style.clone();
            next.link = Some(link.url.clone());
            for child in node.children() {
                walk_inline(child, &next, segments);
            }
        }
        NodeValue::Image(image) => {
            segments.push(Segment::Image {
                url: image.url.clone(),
                alt: extract_text(node),
            });
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            push_run(segments, InlineRun::new("\n", style.clone()));
        }
        NodeValue::HtmlInline(html) => {
            push_run(segments, InlineRun::new(html.clone(), style.clone()));
        }
        _ => {
            for child in node.children() {
                walk_inline(child, style, segments);
            }
        }
    }
}

/// Emit paragraph-like blocks and image blocks in reading order.
fn push_segments(
    segments: Vec<Segment>,
    out: &mut Vec<BlockKind>,
    make: impl Fn(InlineContent) -> BlockKind,
) {
    for segment in segments {
        match segment {
            Segment::Text(content) => {
                if !content.plain_text().trim().is_empty() {
                    out.push(make(trim_content(content)));
                }
            }
            Segment::Image { url, alt } => out.push(BlockKind::Image { url, alt }),
        }
    }
}

fn push_images_only(segments: Vec<Segment>, out: &mut Vec<BlockKind>) {
    for segment in segments {
        if let Segment::Image { url, alt } = segment {
            out.push(BlockKind::Image { url, alt });
        }
    }
}

/// Join the text segments, dropping images (they are emitted separately).
fn flatten_text_segments(segments: &[Segment]) -> InlineContent {
    let mut content = InlineContent::new();
    for segment in segments {
        if let Segment::Text(text) = segment {
            content.append(text.clone());
        }
    }
    trim_content(content)
}

/// Strip line breaks left dangling at the edges after images were split out.
fn trim_content(content: InlineContent) -> InlineContent {
    let mut runs: Vec<InlineRun> = content.runs().to_vec();
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start_matches(['\n', ' ']).to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end_matches(['\n', ' ']).to_string();
    }
    InlineContent::from_runs(runs)
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => text.push_str(&c.literal),
        NodeValue::CodeBlock(c) => text.push_str(&c.literal),
        NodeValue::HtmlInline(html) => text.push_str(html),
        NodeValue::HtmlBlock(html) => text.push_str(&html.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
            if node.data.borrow().value.block() && !text.ends_with('\n') {
                text.push('\n');
            }
        }
    }
}
