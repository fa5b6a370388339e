//! Presentation table: which tag and class each rendered element gets.
//!
//! Kinds without custom styling map to their plain tag and no class.

/// Every element kind the renderer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Root,
    Paragraph,
    /// A paragraph holding an image; images render as blocks, which a `p`
    /// cannot contain.
    ImageParagraph,
    Heading(u8),
    BulletList,
    OrderedList,
    ListItem,
    TaskCheckbox,
    BlockQuote,
    BlockQuoteBody,
    ThematicBreak,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode,
    Link,
    ImageFrame,
    Image,
    LineBreak,
    CodeBlockFrame,
    CodeBlockPanel,
    CodeBlockHeader,
    CodeBlockLabel,
    CopyButton,
    CodeBlockScroll,
    CodeBlockPre,
    CodeBlockCode,
    HighlightSpan,
    /// Container for content that has no dedicated element.
    Fallback,
}

/// Tag and class for an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub tag: &'static str,
    pub class: Option<&'static str>,
}

impl Presentation {
    const fn plain(tag: &'static str) -> Self {
        Self { tag, class: None }
    }

    const fn styled(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag,
            class: Some(class),
        }
    }
}

/// Accent color shared by links and quote borders.
pub const ACCENT: &str = "#5fbcd4";

const BODY_TEXT: &str = "text-gray-700 leading-relaxed mb-4";

/// The presentation of `kind`.
pub const fn presentation(kind: ElementKind) -> Presentation {
    match kind {
        ElementKind::Root => Presentation::styled("div", "prose prose-lg max-w-none prose-gray"),
        ElementKind::Paragraph => Presentation::styled("p", BODY_TEXT),
        ElementKind::ImageParagraph => Presentation::styled("div", BODY_TEXT),
        ElementKind::Heading(level) => heading(level),
        ElementKind::BulletList => Presentation::styled(
            "ul",
            "list-disc list-inside mb-4 space-y-2 text-gray-700",
        ),
        ElementKind::OrderedList => Presentation::styled(
            "ol",
            "list-decimal list-inside mb-4 space-y-2 text-gray-700",
        ),
        ElementKind::ListItem => Presentation::styled("li", "text-gray-700"),
        ElementKind::TaskCheckbox => Presentation::plain("input"),
        ElementKind::BlockQuote => {
            Presentation::styled("blockquote", "border-l-4 border-[#5fbcd4] pl-4 my-6 italic")
        }
        ElementKind::BlockQuoteBody => Presentation::styled("div", "text-gray-700"),
        ElementKind::ThematicBreak => Presentation::plain("hr"),
        ElementKind::Table => Presentation::plain("table"),
        ElementKind::TableHead => Presentation::plain("thead"),
        ElementKind::TableBody => Presentation::plain("tbody"),
        ElementKind::TableRow => Presentation::plain("tr"),
        ElementKind::TableHeaderCell => Presentation::plain("th"),
        ElementKind::TableCell => Presentation::plain("td"),
        ElementKind::Emphasis => Presentation::plain("em"),
        ElementKind::Strong => Presentation::plain("strong"),
        ElementKind::Strikethrough => Presentation::plain("del"),
        ElementKind::InlineCode => {
            Presentation::styled("code", "bg-gray-100 px-2 py-1 rounded text-sm text-gray-800")
        }
        ElementKind::Link => {
            Presentation::styled("a", "text-[#5fbcd4] hover:opacity-70 transition-opacity")
        }
        ElementKind::ImageFrame => Presentation::styled("span", "block relative w-full my-8"),
        ElementKind::Image => Presentation::styled("img", "rounded-lg shadow-lg w-full h-auto"),
        ElementKind::LineBreak => Presentation::plain("br"),
        ElementKind::CodeBlockFrame => {
            Presentation::styled("div", "relative w-screen -ml-[50vw] left-[50%] my-8")
        }
        ElementKind::CodeBlockPanel => Presentation::styled(
            "div",
            "bg-[#1e1e1e] rounded-lg overflow-hidden mx-4 lg:mx-auto lg:max-w-6xl",
        ),
        ElementKind::CodeBlockHeader => Presentation::styled(
            "div",
            "flex items-center justify-between px-4 py-2 bg-[#2d2d2d] border-b border-[#3e3e3e]",
        ),
        ElementKind::CodeBlockLabel => Presentation::styled("span", "text-xs text-gray-400 font-mono"),
        ElementKind::CopyButton => Presentation::styled(
            "button",
            "flex items-center gap-1 text-xs text-gray-400 hover:text-white transition-colors",
        ),
        ElementKind::CodeBlockScroll => Presentation::styled("div", "overflow-x-auto"),
        ElementKind::CodeBlockPre => Presentation::plain("pre"),
        ElementKind::CodeBlockCode => Presentation::plain("code"),
        ElementKind::HighlightSpan => Presentation::plain("span"),
        ElementKind::Fallback => Presentation::plain("div"),
    }
}

const fn heading(level: u8) -> Presentation {
    match level {
        1 => Presentation::plain("h1"),
        2 => Presentation::styled("h2", "text-2xl font-medium text-gray-800 mt-8 mb-4"),
        3 => Presentation::styled("h3", "text-xl font-medium text-gray-800 mt-6 mb-3"),
        4 => Presentation::styled("h4", "text-lg font-medium text-gray-800 mt-4 mb-2"),
        5 => Presentation::plain("h5"),
        _ => Presentation::plain("h6"),
    }
}

/// Inline style of the `pre` inside a code block.
pub const CODE_BLOCK_PRE_STYLE: &str =
    "margin: 0; padding: 1rem; background: #1e1e1e; font-size: 0.875rem; line-height: 1.5";
