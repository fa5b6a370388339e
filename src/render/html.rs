//! HTML output for rendered trees.

use std::fmt::Write;

use super::node::{Element, Node};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Serialize a tree to an HTML fragment. Text and attribute values are
/// escaped.
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Wrap a fragment in a standalone HTML page.
pub fn page(title: &str, body: &Node) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_text(title),
        to_html(body)
    )
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(element.tag);
    for (name, value) in &element.attrs {
        let _ = write!(out, " {name}=\"{}\"", escape_attr(name, value));
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&element.tag) {
        return;
    }
    for child in &element.children {
        write_node(child, out);
    }
    let _ = write!(out, "</{}>", element.tag);
}

/// Attributes whose values are URLs and take href escaping.
const URL_ATTRS: &[&str] = &["href", "src"];

fn escape_with(
    escape: fn(&mut dyn std::io::Write, &[u8]) -> std::io::Result<()>,
    value: &str,
) -> String {
    let mut buffer = Vec::with_capacity(value.len());
    if escape(&mut buffer, value.as_bytes()).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

pub(crate) fn escape_text(text: &str) -> String {
    escape_with(comrak::html::escape, text)
}

fn escape_attr(name: &str, value: &str) -> String {
    if URL_ATTRS.contains(&name) {
        escape_with(comrak::html::escape_href, value)
    } else {
        escape_with(comrak::html::escape, value)
    }
}
