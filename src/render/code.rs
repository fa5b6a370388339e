//! Code block chrome: language label, copy button and highlighted body.

use super::node::{Element, Node};
use super::style::{CODE_BLOCK_PRE_STYLE, ElementKind, presentation};
use crate::highlight::{HighlightSpan, highlight_code};

/// Normalize a fence's language tag, resolving common short names.
///
/// Only the first word of the info string counts. Returns `None` for an
/// untagged fence.
pub fn normalize_language(info: &str) -> Option<String> {
    let tag = info.split_whitespace().next()?;
    let lower = tag.to_ascii_lowercase();
    let resolved = match lower.as_str() {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "rb" => "ruby",
        "yml" => "yaml",
        "sh" | "shell" => "bash",
        other => other,
    };
    Some(resolved.to_string())
}

/// Header label: the language with its first letter capitalized, or "Text".
pub fn display_language(language: Option<&str>) -> String {
    let Some(language) = language.filter(|l| !l.is_empty()) else {
        return "Text".to_string();
    };
    let mut chars = language.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn element(kind: ElementKind) -> Element {
    let presentation = presentation(kind);
    Element::new(presentation.tag).class(presentation.class)
}

/// The text a copy button puts on the clipboard: the block's code without
/// its final newline.
pub fn copy_text(code: &str) -> &str {
    code.strip_suffix('\n').unwrap_or(code)
}

/// Build the code block container.
///
/// `copy_label` is the text shown on the copy button. `theme` names the
/// highlighting theme; `None` uses the default.
pub fn code_block(
    language: Option<&str>,
    code: &str,
    copy_label: &str,
    theme: Option<&str>,
) -> Element {
    let code = copy_text(code);
    let header = element(ElementKind::CodeBlockHeader)
        .child(element(ElementKind::CodeBlockLabel).child(display_language(language)))
        .child(
            element(ElementKind::CopyButton)
                .attr("type", "button")
                .attr("data-copy", code)
                .child(Element::new("span").child(copy_label)),
        );

    let mut code_element = element(ElementKind::CodeBlockCode);
    if let Some(language) = language {
        code_element = code_element.attr("class", format!("language-{language}"));
    }
    let code_element = code_element.children(highlighted_lines(language, code, theme));

    let body = element(ElementKind::CodeBlockScroll).child(
        element(ElementKind::CodeBlockPre)
            .attr("style", CODE_BLOCK_PRE_STYLE)
            .child(code_element),
    );

    element(ElementKind::CodeBlockFrame).child(element(ElementKind::CodeBlockPanel).child(header).child(body))
}

fn highlighted_lines(language: Option<&str>, code: &str, theme: Option<&str>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (idx, line) in highlight_code(language, code, theme).into_iter().enumerate() {
        if idx > 0 {
            nodes.push(Node::from("\n"));
        }
        nodes.extend(line.into_iter().map(span_node));
    }
    nodes
}

fn span_node(span: HighlightSpan) -> Node {
    let Some(color) = span.color else {
        return Node::Text(span.text);
    };
    let mut style = format!("color: {}", color.to_hex());
    if span.bold {
        style.push_str("; font-weight: bold");
    }
    if span.italic {
        style.push_str("; font-style: italic");
    }
    element(ElementKind::HighlightSpan)
        .attr("style", style)
        .child(span.text)
        .into()
}
