use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("slug filter pattern is valid"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("dash pattern is valid"));

/// URL slug for a title or category name.
///
/// Lowercases, drops everything but ASCII word characters, whitespace and
/// `-`, turns whitespace runs into `-`, collapses repeated dashes and trims
/// dashes from the ends. Titles with no ASCII word characters produce an
/// empty slug, which forms reject.
pub fn generate_slug(value: &str) -> String {
    let lower = value.to_lowercase();
    let kept = DISALLOWED.replace_all(&lower, "");
    let dashed = WHITESPACE.replace_all(kept.trim(), "-");
    let collapsed = DASHES.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug_basic() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("Spring Event 2025!"), "spring-event-2025");
    }

    #[test]
    fn test_generate_slug_collapses_dashes_and_space() {
        assert_eq!(generate_slug("a  -  b"), "a-b");
        assert_eq!(generate_slug("  padded  "), "padded");
        assert_eq!(generate_slug("--x--"), "x");
    }

    #[test]
    fn test_generate_slug_keeps_underscores() {
        assert_eq!(generate_slug("snake_case Title"), "snake_case-title");
    }

    #[test]
    fn test_generate_slug_drops_non_ascii() {
        assert_eq!(generate_slug("お知らせ"), "");
        assert_eq!(generate_slug("News お知らせ 1"), "news-1");
    }
}
