use std::ops::Range;

use ropey::Rope;

/// A selection in char indices. `anchor == head` is a plain caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub const fn caret(at: usize) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Selected range, ordered.
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.head)..self.anchor.max(self.head)
    }

    pub const fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Markdown source held in a rope, edited like a textarea.
///
/// Positions are char indices into the whole text. Typing replaces the
/// selection.
pub struct SourceBuffer {
    rope: Rope,
    selection: Selection,
    /// Remembered column for vertical movement.
    col_memory: usize,
    dirty: bool,
}

impl SourceBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Selection::default(),
            col_memory: 0,
            dirty: false,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx).to_string();
        Some(line.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    pub const fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_text(&self) -> String {
        self.rope.slice(self.selection.range()).to_string()
    }

    /// Select `range`, clamped to the text.
    pub fn select(&mut self, range: Range<usize>) {
        let len = self.len_chars();
        self.selection = Selection::new(range.start.min(len), range.end.min(len));
        self.col_memory = self.caret().1;
    }

    pub fn set_caret(&mut self, at: usize) {
        self.select(at..at);
    }

    /// Caret as (line, column), both zero-based, column in chars.
    pub fn caret(&self) -> (usize, usize) {
        let head = self.selection.head.min(self.len_chars());
        let line = self.rope.char_to_line(head);
        (line, head - self.rope.line_to_char(line))
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Replace the selection with `s` and put the caret after it.
    pub fn insert_str(&mut self, s: &str) {
        let start = self.replace_selection(s);
        self.set_caret(start + s.chars().count());
    }

    /// Replace the selection with `s`, returning where the replacement starts.
    pub(crate) fn replace_selection(&mut self, s: &str) -> usize {
        let range = self.selection.range();
        if !range.is_empty() {
            self.rope.remove(range.clone());
            self.dirty = true;
        }
        if !s.is_empty() {
            self.rope.insert(range.start, s);
            self.dirty = true;
        }
        range.start
    }

    /// Backspace: delete the selection, or the char before the caret.
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        let range = self.selection.range();
        if !range.is_empty() {
            self.rope.remove(range.clone());
            self.set_caret(range.start);
            self.dirty = true;
            return true;
        }
        if range.start == 0 {
            return false;
        }
        self.rope.remove(range.start - 1..range.start);
        self.set_caret(range.start - 1);
        self.dirty = true;
        true
    }

    /// Move the caret, collapsing any selection.
    pub fn move_cursor(&mut self, direction: Direction) {
        let head = self.selection.head;
        match direction {
            Direction::Left => self.set_caret(head.saturating_sub(1)),
            Direction::Right => self.set_caret(head + 1),
            Direction::Up | Direction::Down => {
                let (line, _) = self.caret();
                let target = match direction {
                    Direction::Up if line > 0 => line - 1,
                    Direction::Down if line + 1 < self.line_count() => line + 1,
                    _ => return,
                };
                let col = self.col_memory.min(self.line_len(target));
                self.selection = Selection::caret(self.rope.line_to_char(target) + col);
            }
        }
    }

    /// Move the caret to the start of its line.
    pub fn move_home(&mut self) {
        let (line, _) = self.caret();
        self.set_caret(self.rope.line_to_char(line));
    }

    /// Move the caret to the end of its line.
    pub fn move_end(&mut self) {
        let (line, _) = self.caret();
        self.set_caret(self.rope.line_to_char(line) + self.line_len(line));
    }
}

impl std::fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("selection", &self.selection)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
