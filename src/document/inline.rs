//! Styled inline text held by text blocks.

use serde::{Deserialize, Serialize};

/// Inline text styling.
///
/// Mirrors the marks the editor toolbar can apply. `link` carries the target
/// URL rather than a flag so a run knows where it points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InlineStyle {
    #[serde(default, skip_serializing_if = "is_false")]
    pub strong: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub emphasis: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl InlineStyle {
    /// Style with no marks.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    pub const fn has(&self, mark: InlineMark) -> bool {
        match mark {
            InlineMark::Strong => self.strong,
            InlineMark::Emphasis => self.emphasis,
            InlineMark::Strikethrough => self.strikethrough,
            InlineMark::Code => self.code,
        }
    }

    pub const fn set(&mut self, mark: InlineMark, on: bool) {
        match mark {
            InlineMark::Strong => self.strong = on,
            InlineMark::Emphasis => self.emphasis = on,
            InlineMark::Strikethrough => self.strikethrough = on,
            InlineMark::Code => self.code = on,
        }
    }
}

/// A toggleable flag of [`InlineStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineMark {
    Strong,
    Emphasis,
    Strikethrough,
    Code,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "InlineStyle::is_plain")]
    pub style: InlineStyle,
}

impl InlineRun {
    pub fn new(text: impl Into<String>, style: InlineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, InlineStyle::plain())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Ordered styled runs forming the content of a text block.
///
/// Offsets are measured in chars, never bytes. Adjacent runs with identical
/// styles are merged on insertion and empty runs are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineContent {
    runs: Vec<InlineRun>,
}

impl InlineContent {
    pub const fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Content made of a single unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut content = Self::new();
        content.push(InlineRun::plain(text));
        content
    }

    pub fn from_runs(runs: impl IntoIterator<Item = InlineRun>) -> Self {
        let mut content = Self::new();
        for run in runs {
            content.push(run);
        }
        content
    }

    pub fn runs(&self) -> &[InlineRun] {
        &self.runs
    }

    /// Append a run, merging it into the previous one when styles match.
    pub fn push(&mut self, run: InlineRun) {
        if run.text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut()
            && last.style == run.style
        {
            last.text.push_str(&run.text);
            return;
        }
        self.runs.push(run);
    }

    pub fn append(&mut self, other: Self) {
        for run in other.runs {
            self.push(run);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.text.is_empty())
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(InlineRun::char_len).sum()
    }

    /// Text with all styling dropped.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Insert text at a char offset.
    ///
    /// The inserted text takes the style of the character before the
    /// insertion point, so typing at the end of a bold word stays bold.
    pub fn insert_text(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.runs.is_empty() {
            self.push(InlineRun::plain(text));
            return;
        }
        let offset = offset.min(self.char_len());
        let mut start = 0usize;
        for run in &mut self.runs {
            let len = run.char_len();
            if offset <= start + len {
                let at = byte_index(&run.text, offset - start);
                run.text.insert_str(at, text);
                return;
            }
            start += len;
        }
    }

    /// Remove the char immediately before `offset`.
    ///
    /// Returns `false` when there is nothing to remove.
    pub fn remove_char_before(&mut self, offset: usize) -> bool {
        if offset == 0 || offset > self.char_len() {
            return false;
        }
        let target = offset - 1;
        let mut start = 0usize;
        for run in &mut self.runs {
            let len = run.char_len();
            if target < start + len {
                let at = byte_index(&run.text, target - start);
                run.text.remove(at);
                break;
            }
            start += len;
        }
        self.compact();
        true
    }

    /// Split the content at a char offset, keeping the head and returning the tail.
    pub fn split_off(&mut self, offset: usize) -> Self {
        let offset = offset.min(self.char_len());
        let mut head = Self::new();
        let mut tail = Self::new();
        let mut start = 0usize;
        for run in std::mem::take(&mut self.runs) {
            let len = run.char_len();
            if start + len <= offset {
                head.push(run);
            } else if start >= offset {
                tail.push(run);
            } else {
                let at = byte_index(&run.text, offset - start);
                let (left, right) = run.text.split_at(at);
                head.push(InlineRun::new(left, run.style.clone()));
                tail.push(InlineRun::new(right, run.style));
            }
            start += len;
        }
        *self = head;
        tail
    }

    /// Apply `mutate` to the style of every char in `range` (char offsets).
    pub fn restyle(&mut self, range: std::ops::Range<usize>, mutate: impl Fn(&mut InlineStyle)) {
        let end = range.end.min(self.char_len());
        let begin = range.start.min(end);
        if begin == end {
            return;
        }
        let tail = self.split_off(end);
        let mut middle = self.split_off(begin);
        for run in &mut middle.runs {
            mutate(&mut run.style);
        }
        let mut rebuilt = Self::new();
        rebuilt.append(std::mem::take(self));
        rebuilt.append(middle);
        rebuilt.append(tail);
        *self = rebuilt;
    }

    /// Whether every char in `range` satisfies `test`. False for an empty range.
    pub fn all_styled(&self, range: std::ops::Range<usize>, test: impl Fn(&InlineStyle) -> bool) -> bool {
        let mut start = 0usize;
        let mut seen = false;
        for run in &self.runs {
            let end = start + run.char_len();
            if end > range.start && start < range.end {
                if !test(&run.style) {
                    return false;
                }
                seen = true;
            }
            start = end;
        }
        seen
    }

    /// Comparison key that ignores run boundaries, outer whitespace, the
    /// width of whitespace gaps and the styling of whitespace.
    pub(crate) fn signature(&self) -> Vec<(char, Option<InlineStyle>)> {
        let mut chars: Vec<(char, Option<InlineStyle>)> = Vec::new();
        for run in &self.runs {
            for ch in run.text.chars() {
                if ch.is_whitespace() {
                    if chars.last().is_some_and(|(last, style)| *last != ' ' || style.is_some()) {
                        chars.push((' ', None));
                    }
                } else {
                    chars.push((ch, Some(run.style.clone())));
                }
            }
        }
        if chars.last().is_some_and(|(ch, style)| *ch == ' ' && style.is_none()) {
            chars.pop();
        }
        chars
    }

    fn compact(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        for run in runs {
            self.push(run);
        }
    }
}

impl From<&str> for InlineContent {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

/// Byte index of the `char_idx`-th char, or the string length past the end.
pub(crate) fn byte_index(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map_or(text.len(), |(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> InlineStyle {
        InlineStyle {
            strong: true,
            ..InlineStyle::default()
        }
    }

    #[test]
    fn test_push_merges_runs_with_same_style() {
        let mut content = InlineContent::plain("ab");
        content.push(InlineRun::plain("cd"));
        assert_eq!(content.runs().len(), 1);
        assert_eq!(content.plain_text(), "abcd");
    }

    #[test]
    fn test_insert_text_inherits_style_of_previous_char() {
        let mut content = InlineContent::from_runs([
            InlineRun::new("bold", bold()),
            InlineRun::plain(" tail"),
        ]);
        content.insert_text(4, "er");
        assert_eq!(content.runs()[0].text, "bolder");
        assert_eq!(content.runs()[1].text, " tail");
    }

    #[test]
    fn test_insert_text_at_start_uses_first_run() {
        let mut content = InlineContent::from_runs([InlineRun::new("x", bold())]);
        content.insert_text(0, "y");
        assert_eq!(content.runs()[0].text, "yx");
    }

    #[test]
    fn test_insert_text_handles_multibyte_chars() {
        let mut content = InlineContent::plain("日本");
        content.insert_text(1, "の");
        assert_eq!(content.plain_text(), "日の本");
    }

    #[test]
    fn test_remove_char_before_drops_empty_runs() {
        let mut content = InlineContent::from_runs([
            InlineRun::plain("a"),
            InlineRun::new("b", bold()),
            InlineRun::plain("c"),
        ]);
        assert!(content.remove_char_before(2));
        assert_eq!(content.runs().len(), 1);
        assert_eq!(content.plain_text(), "ac");
    }

    #[test]
    fn test_remove_char_before_at_start_is_noop() {
        let mut content = InlineContent::plain("abc");
        assert!(!content.remove_char_before(0));
        assert_eq!(content.plain_text(), "abc");
    }

    #[test]
    fn test_split_off_inside_run() {
        let mut content = InlineContent::from_runs([
            InlineRun::plain("hello "),
            InlineRun::new("world", bold()),
        ]);
        let tail = content.split_off(8);
        assert_eq!(content.plain_text(), "hello wo");
        assert_eq!(tail.plain_text(), "rld");
        assert!(tail.runs()[0].style.strong);
    }

    #[test]
    fn test_restyle_marks_range() {
        let mut content = InlineContent::plain("make this bold");
        content.restyle(5..9, |style| style.strong = true);
        let runs = content.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].text, "this");
        assert!(runs[1].style.strong);
    }

    #[test]
    fn test_all_styled_checks_every_run_in_range() {
        let content = InlineContent::from_runs([InlineRun::plain("ab"), InlineRun::new("cd", bold())]);
        let strong = |style: &InlineStyle| style.has(InlineMark::Strong);
        assert!(content.all_styled(2..4, strong));
        assert!(!content.all_styled(1..3, strong));
        assert!(!content.all_styled(2..2, strong), "empty ranges select nothing");
    }

    #[test]
    fn test_signature_ignores_whitespace_style_and_run_boundaries() {
        let a = InlineContent::from_runs([
            InlineRun::new("a", bold()),
            InlineRun::plain(" "),
            InlineRun::new("b", bold()),
        ]);
        let b = InlineContent::from_runs([InlineRun::new("a b ", bold())]);
        assert_eq!(a.signature(), b.signature());
    }
}
