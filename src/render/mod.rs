//! Markdown to presentational node tree.
//!
//! Rendering is pure: the same markdown always produces the same tree.
//! Every construct the parser can produce has an [`ElementKind`], and
//! anything without dedicated handling falls back to a plain container of
//! its text rather than being dropped.
//!
//! Single newlines inside a paragraph render as line breaks. Fenced code
//! blocks get a header with the language name and a copy button, and a
//! fence that never closes degrades to a paragraph of its lines.

mod clipboard;
mod code;
mod html;
mod node;
mod style;

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use tracing::debug;

pub use clipboard::{
    COPIED_LABEL, COPY_ACK_DURATION, COPY_LABEL, Clipboard, ClipboardError, CopyTracker,
    MemoryClipboard, SystemClipboard,
};
pub use code::{code_block, copy_text, display_language, normalize_language};
pub use html::{page, to_html};
pub use node::{Element, Node};
pub use style::{ACCENT, CODE_BLOCK_PRE_STYLE, ElementKind, Presentation, presentation};

use crate::document::is_closing_fence;

/// Per-render state supplied by the host page.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext<'a> {
    /// Code of the block whose copy button is acknowledging a copy.
    pub copied: Option<&'a str>,
    /// Highlighting theme for code blocks; `None` uses the default.
    pub theme: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    /// Context for a page whose copy tracker is in the given state.
    pub fn from_tracker(tracker: &'a CopyTracker, now: std::time::Instant) -> Self {
        Self {
            copied: tracker.acknowledged(now),
            theme: None,
        }
    }

    #[must_use]
    pub const fn with_theme(mut self, theme: Option<&'a str>) -> Self {
        self.theme = theme;
        self
    }
}

/// Render markdown with no copy acknowledgement showing.
///
/// # Example
///
/// ```
/// use newsdesk::render::{render, to_html};
///
/// let tree = render("[docs](https://example.com)");
/// assert!(to_html(&tree).contains("rel=\"noopener noreferrer\""));
/// ```
pub fn render(markdown: &str) -> Node {
    render_with(markdown, &RenderContext::default())
}

/// Render markdown to a node tree.
pub fn render_with(markdown: &str, ctx: &RenderContext<'_>) -> Node {
    let _scope = crate::perf::scope("render.markdown");
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, markdown, &options);

    let renderer = Renderer {
        ctx,
        source_lines: markdown.lines().collect(),
    };
    let mut body = element(ElementKind::Root);
    for child in root.children() {
        body.children.extend(renderer.block(child, false));
    }
    body.into()
}

/// Render markdown straight to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    to_html(&render(markdown))
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

fn element(kind: ElementKind) -> Element {
    let presentation = presentation(kind);
    Element::new(presentation.tag).class(presentation.class)
}

/// Whether a link or image target points outside the site.
pub fn is_external(url: &str) -> bool {
    url.starts_with("http")
}

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "irc", "ircs", "xmpp"];

/// The URL to emit for a link or image target. Relative URLs and the web and
/// mail schemes pass through; any other scheme (`javascript:`, `data:`, ...)
/// becomes an empty string.
pub fn safe_url(url: &str) -> &str {
    let Some(colon) = url.find(':') else {
        return url;
    };
    if url[..colon].contains(['/', '?', '#']) {
        return url;
    }
    let scheme = url[..colon].trim();
    if SAFE_SCHEMES.iter().any(|safe| safe.eq_ignore_ascii_case(scheme)) {
        url
    } else {
        debug!(scheme, "dropping link target with unsafe scheme");
        ""
    }
}

struct Renderer<'r> {
    ctx: &'r RenderContext<'r>,
    source_lines: Vec<&'r str>,
}

impl Renderer<'_> {
    /// Render a block node. `tight` is set for children of tight list items,
    /// whose paragraphs render without a wrapper.
    fn block<'a>(&self, node: &'a AstNode<'a>, tight: bool) -> Vec<Node> {
        let data = node.data.borrow();
        let rendered: Element = match &data.value {
            NodeValue::Paragraph => {
                if tight {
                    return self.inlines(node);
                }
                let kind = if contains_image(node) {
                    ElementKind::ImageParagraph
                } else {
                    ElementKind::Paragraph
                };
                element(kind).children(self.inlines(node))
            }
            NodeValue::Heading(heading) => {
                element(ElementKind::Heading(heading.level.clamp(1, 6))).children(self.inlines(node))
            }
            NodeValue::List(list) => {
                let mut list_element = match list.list_type {
                    ListType::Bullet => element(ElementKind::BulletList),
                    ListType::Ordered => element(ElementKind::OrderedList),
                };
                if list.list_type == ListType::Ordered && list.start != 1 {
                    list_element = list_element.attr("start", list.start.to_string());
                }
                for item in node.children() {
                    list_element.children.push(self.list_item(item, list.tight).into());
                }
                list_element
            }
            NodeValue::Item(_) | NodeValue::TaskItem(_) => self.list_item(node, tight),
            NodeValue::BlockQuote => {
                let mut body = element(ElementKind::BlockQuoteBody);
                for child in node.children() {
                    body.children.extend(self.block(child, false));
                }
                element(ElementKind::BlockQuote).child(body)
            }
            NodeValue::CodeBlock(block) => {
                if block.fenced && !self.fence_is_closed(node, char::from(block.fence_char), block.fence_length) {
                    debug!(info = %block.info, "unterminated code fence rendered as text");
                    let fence = char::from(block.fence_char).to_string().repeat(block.fence_length);
                    let mut text = format!("{fence}{}", block.info);
                    let body = block.literal.trim_end();
                    if !body.is_empty() {
                        text.push('\n');
                        text.push_str(body);
                    }
                    element(ElementKind::Paragraph).children(text_with_breaks(&text))
                } else {
                    let language = normalize_language(&block.info);
                    let label = if self.ctx.copied == Some(copy_text(&block.literal)) {
                        COPIED_LABEL
                    } else {
                        COPY_LABEL
                    };
                    code_block(language.as_deref(), &block.literal, label, self.ctx.theme)
                }
            }
            NodeValue::ThematicBreak => element(ElementKind::ThematicBreak),
            NodeValue::Table(table) => self.table(node, &table.alignments),
            NodeValue::HtmlBlock(html) => {
                debug!("raw html block rendered as text");
                element(ElementKind::Paragraph).children(text_with_breaks(html.literal.trim_end()))
            }
            _ => {
                let text = plain_text(node);
                let text = text.trim();
                if text.is_empty() {
                    return Vec::new();
                }
                debug!("construct without dedicated element rendered as text");
                element(ElementKind::Fallback).children(text_with_breaks(text))
            }
        };
        vec![rendered.into()]
    }

    fn list_item<'a>(&self, item: &'a AstNode<'a>, tight: bool) -> Element {
        let mut li = element(ElementKind::ListItem);
        if let NodeValue::TaskItem(symbol) = &item.data.borrow().value {
            let mut checkbox = element(ElementKind::TaskCheckbox)
                .attr("type", "checkbox")
                .attr("disabled", "");
            if symbol.is_some() {
                checkbox = checkbox.attr("checked", "");
            }
            li = li.child(checkbox).child(" ");
        }
        for child in item.children() {
            li.children.extend(self.block(child, tight));
        }
        li
    }

    fn table<'a>(&self, node: &'a AstNode<'a>, alignments: &[TableAlignment]) -> Element {
        let mut head = element(ElementKind::TableHead);
        let mut body = element(ElementKind::TableBody);
        for row in node.children() {
            let NodeValue::TableRow(is_header) = row.data.borrow().value else {
                continue;
            };
            let cell_kind = if is_header {
                ElementKind::TableHeaderCell
            } else {
                ElementKind::TableCell
            };
            let mut tr = element(ElementKind::TableRow);
            for (idx, cell) in row.children().enumerate() {
                let mut td = element(cell_kind);
                if let Some(align) = alignments.get(idx).copied().and_then(text_align) {
                    td = td.attr("style", format!("text-align: {align}"));
                }
                tr.children.push(td.children(self.inlines(cell)).into());
            }
            if is_header {
                head.children.push(tr.into());
            } else {
                body.children.push(tr.into());
            }
        }
        let mut table = element(ElementKind::Table).child(head);
        if !body.children.is_empty() {
            table = table.child(body);
        }
        table
    }

    fn fence_is_closed<'a>(&self, node: &'a AstNode<'a>, fence_char: char, fence_length: usize) -> bool {
        let sourcepos = node.data.borrow().sourcepos;
        if sourcepos.end.line <= sourcepos.start.line {
            return false;
        }
        self.source_lines
            .get(sourcepos.end.line.saturating_sub(1))
            .is_some_and(|line| is_closing_fence(line, fence_char, fence_length))
    }

    fn inlines<'a>(&self, node: &'a AstNode<'a>) -> Vec<Node> {
        let mut out = Vec::new();
        for child in node.children() {
            self.inline(child, &mut out);
        }
        out
    }

    fn inline<'a>(&self, node: &'a AstNode<'a>, out: &mut Vec<Node>) {
        let data = node.data.borrow();
        let rendered: Node = match &data.value {
            NodeValue::Text(text) => Node::Text(text.clone()),
            NodeValue::SoftBreak | NodeValue::LineBreak => element(ElementKind::LineBreak).into(),
            NodeValue::Code(code) => element(ElementKind::InlineCode).child(code.literal.clone()).into(),
            NodeValue::Emph => element(ElementKind::Emphasis).children(self.inlines(node)).into(),
            NodeValue::Strong => element(ElementKind::Strong).children(self.inlines(node)).into(),
            NodeValue::Strikethrough => {
                element(ElementKind::Strikethrough).children(self.inlines(node)).into()
            }
            NodeValue::Link(link) => {
                let url = safe_url(&link.url);
                let mut anchor = element(ElementKind::Link).attr("href", url);
                if !link.title.is_empty() {
                    anchor = anchor.attr("title", link.title.clone());
                }
                if is_external(url) {
                    anchor = anchor
                        .attr("target", "_blank")
                        .attr("rel", "noopener noreferrer");
                }
                anchor.children(self.inlines(node)).into()
            }
            NodeValue::Image(image) => image_element(&image.url, &plain_text(node)).into(),
            NodeValue::HtmlInline(html) => Node::Text(html.clone()),
            _ => {
                debug!("inline construct without dedicated element rendered as text");
                Node::Text(plain_text(node))
            }
        };
        out.push(rendered);
    }
}

fn image_element(url: &str, alt: &str) -> Element {
    let url = safe_url(url);
    let mut img = element(ElementKind::Image)
        .attr("src", url)
        .attr("alt", alt)
        .attr("width", "1200")
        .attr("height", "800")
        .attr("loading", "lazy")
        .attr("style", "object-fit: cover");
    if is_external(url) {
        img = img.attr("data-unoptimized", "true");
    }
    element(ElementKind::ImageFrame).child(img)
}

const fn text_align(alignment: TableAlignment) -> Option<&'static str> {
    match alignment {
        TableAlignment::None => None,
        TableAlignment::Left => Some("left"),
        TableAlignment::Center => Some("center"),
        TableAlignment::Right => Some("right"),
    }
}

fn text_with_breaks(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            nodes.push(element(ElementKind::LineBreak).into());
        }
        if !line.is_empty() {
            nodes.push(Node::from(line));
        }
    }
    nodes
}

fn contains_image<'a>(node: &'a AstNode<'a>) -> bool {
    node.descendants()
        .any(|n| matches!(n.data.borrow().value, NodeValue::Image(_)))
}

fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(c) => text.push_str(&c.literal),
            NodeValue::CodeBlock(c) => text.push_str(&c.literal),
            NodeValue::HtmlInline(html) => text.push_str(html),
            NodeValue::HtmlBlock(html) => text.push_str(&html.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
            _ => {}
        }
    }
    text
}
