//! Syntax highlighting for code blocks.
//!
//! Uses syntect with its bundled Sublime Text syntax definitions and themes.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Theme used when none is configured. Dark, to sit on the code block's
/// `#1e1e1e` background.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// An RGB foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// CSS hex notation, e.g. `#c0c5ce`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A highlighted piece of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub text: String,
    pub color: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
}

impl HighlightSpan {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            color: None,
            bold: false,
            italic: false,
        }
    }
}

/// Whether `language` has highlighting rules.
pub fn is_supported(language: &str) -> bool {
    find_syntax(syntax_set(), language).is_some()
}

/// Highlight `code` line by line with the named theme, or
/// [`DEFAULT_THEME`] when `theme` is `None` or unknown.
///
/// Unknown or missing languages produce one uncolored span per line.
pub fn highlight_code(
    language: Option<&str>,
    code: &str,
    theme: Option<&str>,
) -> Vec<Vec<HighlightSpan>> {
    let _scope = crate::perf::scope("highlight.code");
    let syntax_set = syntax_set();
    let syntax = language.and_then(|lang| find_syntax(syntax_set, lang));

    let Some(syntax) = syntax else {
        return code.lines().map(|line| vec![HighlightSpan::plain(line)]).collect();
    };

    let theme = resolve_theme(theme);
    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter
            .highlight_line(line, syntax_set)
            .unwrap_or_default();
        let spans = ranges
            .into_iter()
            .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
            .filter(|(_, text)| !text.is_empty())
            .map(|(style, text)| HighlightSpan {
                text: text.to_string(),
                color: Some(Rgb {
                    r: style.foreground.r,
                    g: style.foreground.g,
                    b: style.foreground.b,
                }),
                bold: style.font_style.contains(FontStyle::BOLD),
                italic: style.font_style.contains(FontStyle::ITALIC),
            })
            .collect();
        lines.push(spans);
    }
    lines
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, language: &str) -> Option<&'a SyntaxReference> {
    syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language))
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        ThemeSet::load_defaults()
    })
}

/// Names of the bundled themes, sorted.
pub fn theme_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = theme_set().themes.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

fn resolve_theme(name: Option<&str>) -> &'static Theme {
    static FALLBACK: OnceLock<Theme> = OnceLock::new();
    let themes = &theme_set().themes;
    if let Some(name) = name {
        if let Some(theme) = themes.get(name) {
            return theme;
        }
        tracing::warn!(theme = %name, "unknown highlight theme, using default");
    }
    themes
        .get(DEFAULT_THEME)
        .or_else(|| themes.values().next())
        .unwrap_or_else(|| FALLBACK.get_or_init(Theme::default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_python_produces_colored_spans() {
        let code = "def main():\n    return 1\n";
        let lines = highlight_code(Some("python"), code, None);

        assert_eq!(lines.len(), 2);
        let has_color = lines.iter().flatten().any(|span| span.color.is_some());
        assert!(has_color, "Expected at least one colored span for Python");
    }

    #[test]
    fn test_highlight_unknown_language_falls_back_to_plain() {
        let lines = highlight_code(Some("nope"), "just text", None);

        assert_eq!(lines.len(), 1);
        let has_color = lines.iter().flatten().any(|span| span.color.is_some());
        assert!(!has_color, "Unknown language should not colorize");
    }

    #[test]
    fn test_highlight_without_language_keeps_text() {
        let lines = highlight_code(None, "a\nb", None);
        let text: Vec<&str> = lines
            .iter()
            .flatten()
            .map(|span| span.text.as_str())
            .collect();
        assert_eq!(text, vec!["a", "b"]);
    }

    #[test]
    fn test_highlighted_spans_rebuild_the_line() {
        let line = "let x = \"<b>\";";
        let lines = highlight_code(Some("javascript"), line, None);
        let rebuilt: String = lines[0].iter().map(|span| span.text.as_str()).collect();
        assert_eq!(rebuilt, line);
    }

    #[test]
    fn test_is_supported_resolves_names_and_tokens() {
        assert!(is_supported("python"));
        assert!(is_supported("bash"));
        assert!(!is_supported("definitely-not-a-language"));
    }

    #[test]
    fn test_default_theme_is_bundled() {
        assert!(theme_names().contains(&DEFAULT_THEME));
    }

    fn colors(theme: Option<&str>) -> Vec<Option<Rgb>> {
        highlight_code(Some("python"), "def main():\n    return 1\n", theme)
            .into_iter()
            .flatten()
            .map(|span| span.color)
            .collect()
    }

    #[test]
    fn test_named_theme_changes_colors() {
        assert_ne!(colors(Some("InspiredGitHub")), colors(None));
        assert_eq!(colors(Some(DEFAULT_THEME)), colors(None));
    }

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        assert_eq!(colors(Some("no-such-theme")), colors(None));
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb { r: 30, g: 30, b: 30 }.to_hex(), "#1e1e1e");
    }
}
