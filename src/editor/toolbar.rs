//! Markdown toolbar for the source-mode editor.

use super::buffer::SourceBuffer;

/// Default language for code blocks inserted from the toolbar.
pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

/// A toolbar button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarAction {
    Bold,
    Italic,
    /// Heading prefix. The toolbar offers levels 2 to 4.
    Heading(u8),
    BulletList,
    Link,
    Quote,
    CodeBlock,
}

impl ToolbarAction {
    /// Prefix, suffix and placeholder used when nothing is selected.
    fn parts(&self) -> (String, &'static str, &'static str) {
        match self {
            Self::Bold => ("**".to_string(), "**", "text"),
            Self::Italic => ("*".to_string(), "*", "text"),
            Self::Heading(level) => {
                let level = usize::from((*level).clamp(1, 6));
                (format!("{} ", "#".repeat(level)), "", "Heading")
            }
            Self::BulletList => ("- ".to_string(), "", "text"),
            Self::Link => ("[".to_string(), "](url)", "text"),
            Self::Quote => ("> ".to_string(), "", "Quote"),
            Self::CodeBlock => (
                format!("```{DEFAULT_CODE_LANGUAGE}\n"),
                "\n```",
                "// write code here",
            ),
        }
    }
}

impl SourceBuffer {
    /// Wrap the selection (or a placeholder) in the action's markup.
    ///
    /// The wrapped text stays selected so it can be typed over.
    pub fn apply_toolbar(&mut self, action: &ToolbarAction) {
        let (prefix, suffix, placeholder) = action.parts();
        let selected = self.selected_text();
        let body = if selected.is_empty() {
            placeholder.to_string()
        } else {
            selected
        };
        let start = self.replace_selection(&format!("{prefix}{body}{suffix}"));
        let body_start = start + prefix.chars().count();
        self.select(body_start..body_start + body.chars().count());
    }

    /// Replace the selection with an image reference and put the caret
    /// after it.
    pub fn insert_image(&mut self, name: &str, url: &str) {
        self.insert_str(&format!("![{name}]({url})"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_selection_and_keeps_it_selected() {
        let mut buf = SourceBuffer::from_text("make this bold");
        buf.select(5..9);
        buf.apply_toolbar(&ToolbarAction::Bold);
        assert_eq!(buf.text(), "make **this** bold");
        assert_eq!(buf.selected_text(), "this");
    }

    #[test]
    fn test_empty_selection_uses_placeholder() {
        let mut buf = SourceBuffer::empty();
        buf.apply_toolbar(&ToolbarAction::Heading(3));
        assert_eq!(buf.text(), "### Heading");
        assert_eq!(buf.selected_text(), "Heading");
    }

    #[test]
    fn test_link_wraps_selection() {
        let mut buf = SourceBuffer::from_text("docs");
        buf.select(0..4);
        buf.apply_toolbar(&ToolbarAction::Link);
        assert_eq!(buf.text(), "[docs](url)");
    }

    #[test]
    fn test_code_block_defaults_to_javascript() {
        let mut buf = SourceBuffer::empty();
        buf.apply_toolbar(&ToolbarAction::CodeBlock);
        assert_eq!(buf.text(), "```javascript\n// write code here\n```");
    }

    #[test]
    fn test_quote_and_bullet_prefixes() {
        let mut buf = SourceBuffer::from_text("x");
        buf.select(0..1);
        buf.apply_toolbar(&ToolbarAction::Quote);
        assert_eq!(buf.text(), "> x");
        let mut buf = SourceBuffer::from_text("y");
        buf.select(0..1);
        buf.apply_toolbar(&ToolbarAction::BulletList);
        assert_eq!(buf.text(), "- y");
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let mut buf = SourceBuffer::empty();
        buf.apply_toolbar(&ToolbarAction::Heading(9));
        assert_eq!(buf.text(), "###### Heading");
    }

    #[test]
    fn test_insert_image_replaces_selection_and_moves_caret() {
        let mut buf = SourceBuffer::from_text("before PLACEHOLDER after");
        buf.select(7..18);
        buf.insert_image("a.png", "https://cdn.example.com/a.png");
        let expected = "before ![a.png](https://cdn.example.com/a.png) after";
        assert_eq!(buf.text(), expected);
        let caret = "before ![a.png](https://cdn.example.com/a.png)".chars().count();
        assert_eq!(buf.selection().head, caret);
        assert!(buf.selection().is_empty());
    }
}
