use std::time::{Duration, Instant};

use newsdesk::render::{
    COPIED_LABEL, COPY_LABEL, CopyTracker, MemoryClipboard, Node, RenderContext, render, render_html,
    render_with, to_html,
};
use proptest::prelude::*;

const ARTICLE: &str = include_str!("fixtures/article.md");

fn button_labels(markdown: &str, ctx: &RenderContext<'_>) -> Vec<String> {
    render_with(markdown, ctx)
        .find_all("button")
        .into_iter()
        .map(|button| button.children.iter().map(Node::text_content).collect())
        .collect()
}

#[test]
fn test_article_structure() {
    let tree = render(ARTICLE);
    assert_eq!(tree.find_all("h1").len(), 1);
    assert_eq!(tree.find_all("h2").len(), 2);
    assert_eq!(tree.find_all("h3").len(), 1);
    assert_eq!(tree.find_all("table").len(), 1);
    assert_eq!(tree.find_all("th").len(), 3);
    assert_eq!(tree.find_all("hr").len(), 1);
    assert_eq!(tree.find_all("del").len(), 1);

    let checkboxes: Vec<_> = tree
        .find_all("input")
        .into_iter()
        .filter(|input| input.get_attr("type") == Some("checkbox"))
        .collect();
    assert_eq!(checkboxes.len(), 3);
    assert_eq!(
        checkboxes
            .iter()
            .filter(|input| input.get_attr("checked").is_some())
            .count(),
        2
    );
}

#[test]
fn test_article_images_and_links() {
    let tree = render(ARTICLE);
    let images = tree.find_all("img");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].get_attr("alt"), Some("The main hall"));
    assert_eq!(images[0].get_attr("data-unoptimized"), Some("true"));

    let links = tree.find_all("a");
    let blog = links
        .iter()
        .find(|a| a.get_attr("href") == Some("https://example.com/blog"))
        .unwrap();
    assert_eq!(blog.get_attr("target"), Some("_blank"));
    let service = links
        .iter()
        .find(|a| a.get_attr("href") == Some("/service"))
        .unwrap();
    assert_eq!(service.get_attr("target"), None);
}

#[test]
fn test_article_code_blocks_are_labelled() {
    let tree = render(ARTICLE);
    let html = to_html(&tree);
    assert!(html.contains("Javascript"), "js fence resolves to javascript");
    assert!(html.contains(">Text<"), "untagged fence is labelled Text");
    assert_eq!(
        button_labels(ARTICLE, &RenderContext::default()),
        vec![COPY_LABEL.to_string(), COPY_LABEL.to_string()]
    );
}

#[test]
fn test_copy_acknowledgement_expires() {
    let markdown = "```\nfirst\n```\n\n```\nsecond\n```\n";
    let mut tracker = CopyTracker::new();
    let mut clipboard = MemoryClipboard::default();
    let start = Instant::now();
    assert!(tracker.copy(&mut clipboard, "second", start));
    assert_eq!(clipboard.contents.as_deref(), Some("second"));

    let ctx = RenderContext::from_tracker(&tracker, start + Duration::from_secs(1));
    assert_eq!(
        button_labels(markdown, &ctx),
        vec![COPY_LABEL.to_string(), COPIED_LABEL.to_string()]
    );

    let ctx = RenderContext::from_tracker(&tracker, start + Duration::from_secs(3));
    assert_eq!(
        button_labels(markdown, &ctx),
        vec![COPY_LABEL.to_string(), COPY_LABEL.to_string()]
    );
}

#[test]
fn test_html_page_output_escapes_text() {
    let html = render_html("Fish & chips <b>now</b>");
    assert!(html.contains("Fish &amp; chips &lt;b&gt;now&lt;/b&gt;"));
    assert!(!html.contains("<b>"));
}

proptest! {
    #[test]
    fn test_render_is_total_and_deterministic(markdown in "[a-z#*_`>\\-\\[\\]()!|~ \n0-9.]{0,80}") {
        let first = render_html(&markdown);
        prop_assert_eq!(render_html(&markdown), first);
    }

    #[test]
    fn test_raw_html_never_reaches_output(tag in "zz[a-z]{0,6}", body in "[a-z ]{0,12}") {
        let markdown = format!("<{tag}>{body}</{tag}>\n\ntext <{tag}> inline");
        let html = render_html(&markdown);
        let opening = format!("<{tag}>");
        prop_assert!(!html.contains(&opening), "raw tag leaked: {}", html);
    }
}
