//! Block document to markdown serialization.
//!
//! Output stays inside the dialect the renderer parses (GFM tables,
//! strikethrough, task items, fenced code) so a saved article displays the
//! way it was edited.

use super::inline::{InlineContent, InlineStyle};
use super::types::{BlockDocument, BlockKind, ColumnAlign, Table};

impl BlockDocument {
    /// Serialize the document to markdown.
    pub fn to_markdown(&self) -> String {
        serialize(self)
    }
}

/// Serialize a block document to markdown.
///
/// Total over every block kind. Blank paragraphs produce no output, matching
/// what a reader would see.
pub fn serialize(doc: &BlockDocument) -> String {
    let _scope = crate::perf::scope("document.serialize");
    let mut out = String::new();
    let mut lists = ListState::default();
    let mut previous_was_item = false;

    for block in doc.blocks() {
        let kind = &block.kind;
        if kind.is_blank_paragraph() {
            continue;
        }
        let is_item = kind.list_depth().is_some();
        if !out.is_empty() {
            let tight = is_item && previous_was_item && !lists.needs_blank_line(kind);
            out.push_str(if tight { "\n" } else { "\n\n" });
        }
        if !is_item {
            lists.clear();
        }
        write_block(kind, &mut lists, &mut out);
        previous_was_item = is_item;
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn write_block(kind: &BlockKind, lists: &mut ListState, out: &mut String) {
    match kind {
        BlockKind::Paragraph { content } => out.push_str(&inline_markdown(content, false)),
        BlockKind::Heading { level, content } => {
            out.push_str(&"#".repeat(usize::from((*level).clamp(1, 6))));
            let text = inline_markdown(content, false).replace('\n', " ");
            if !text.is_empty() {
                out.push(' ');
                out.push_str(&text);
            }
        }
        BlockKind::BulletListItem { depth, content } => {
            write_list_item(lists, ListFamily::Bullet, *depth, None, content, out);
        }
        BlockKind::NumberedListItem { depth, content } => {
            write_list_item(lists, ListFamily::Ordered, *depth, None, content, out);
        }
        BlockKind::CheckListItem {
            depth,
            checked,
            content,
        } => {
            write_list_item(lists, ListFamily::Bullet, *depth, Some(*checked), content, out);
        }
        BlockKind::Quote { content } => {
            let text = inline_markdown(content, false);
            let quoted: Vec<String> = text
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect();
            out.push_str(&quoted.join("\n"));
        }
        BlockKind::CodeBlock { language, code } => write_code_block(language.as_deref(), code, out),
        BlockKind::Image { url, alt } => {
            out.push_str("![");
            out.push_str(&escape_plain(alt).replace('\n', " "));
            out.push_str("](");
            out.push_str(&link_destination(url));
            out.push(')');
        }
        BlockKind::Table(table) => write_table(table, out),
        BlockKind::Divider => out.push_str("---"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFamily {
    Bullet,
    Ordered,
}

#[derive(Debug)]
struct ListLevel {
    family: ListFamily,
    indent: usize,
    next_number: u64,
    content_indent: usize,
}

/// Open list levels while consecutive list items are written.
#[derive(Debug, Default)]
struct ListState {
    levels: Vec<ListLevel>,
}

impl ListState {
    fn clear(&mut self) {
        self.levels.clear();
    }

    /// Whether `kind` is an empty item that would start a new list. Such an
    /// item cannot interrupt the previous item's paragraph, so it needs a
    /// blank line before it.
    fn needs_blank_line(&self, kind: &BlockKind) -> bool {
        let (family, depth, content) = match kind {
            BlockKind::BulletListItem { depth, content } => (ListFamily::Bullet, *depth, content),
            BlockKind::NumberedListItem { depth, content } => {
                (ListFamily::Ordered, *depth, content)
            }
            _ => return false,
        };
        if !content.plain_text().trim().is_empty() {
            return false;
        }
        let depth = usize::from(depth).min(self.levels.len());
        self.levels
            .get(depth)
            .is_none_or(|level| level.family != family)
    }

    /// Returns (indent, marker) for the next item, opening or closing levels.
    fn next_marker(&mut self, family: ListFamily, depth: u8) -> (usize, usize, String) {
        // An item can nest at most one level below the deepest open list.
        let depth = usize::from(depth).min(self.levels.len());
        self.levels.truncate(depth + 1);
        if self.levels.len() == depth + 1 && self.levels[depth].family != family {
            self.levels.truncate(depth);
        }
        if self.levels.len() == depth {
            let indent = if depth == 0 {
                0
            } else {
                self.levels[depth - 1].content_indent
            };
            self.levels.push(ListLevel {
                family,
                indent,
                next_number: 1,
                content_indent: indent + 2,
            });
        }
        let level = &mut self.levels[depth];
        let marker = match family {
            ListFamily::Bullet => "- ".to_string(),
            ListFamily::Ordered => {
                let marker = format!("{}. ", level.next_number);
                level.next_number += 1;
                marker
            }
        };
        level.content_indent = level.indent + marker.len();
        (level.indent, level.content_indent, marker)
    }
}

fn write_list_item(
    lists: &mut ListState,
    family: ListFamily,
    depth: u8,
    checked: Option<bool>,
    content: &InlineContent,
    out: &mut String,
) {
    let (indent, content_indent, marker) = lists.next_marker(family, depth);
    out.push_str(&" ".repeat(indent));
    out.push_str(&marker);
    match checked {
        Some(true) => out.push_str("[x] "),
        Some(false) => out.push_str("[ ] "),
        None => {}
    }
    let text = inline_markdown(content, false);
    let continuation = format!("\n{}", " ".repeat(content_indent));
    out.push_str(&text.replace('\n', &continuation));
    if text.is_empty() && checked.is_none() {
        // "- " with nothing after it would leave trailing whitespace.
        while out.ends_with(' ') {
            out.pop();
        }
    }
}

fn write_code_block(language: Option<&str>, code: &str, out: &mut String) {
    let longest_run = longest_backtick_run(code);
    let fence = "`".repeat(longest_run.max(2) + 1);
    let language: String = language
        .unwrap_or_default()
        .chars()
        .take_while(|c| !c.is_whitespace())
        .filter(|c| *c != '`')
        .collect();
    out.push_str(&fence);
    out.push_str(&language);
    out.push('\n');
    if !code.is_empty() {
        out.push_str(code.trim_end_matches('\n'));
        out.push('\n');
    }
    out.push_str(&fence);
}

fn write_table(table: &Table, out: &mut String) {
    let columns = table.column_count();
    if columns == 0 {
        return;
    }
    let row_line = |cells: &[InlineContent]| {
        let mut line = String::from("|");
        for idx in 0..columns {
            let cell = cells
                .get(idx)
                .map(|c| inline_markdown(c, true).replace('\n', " "))
                .unwrap_or_default();
            line.push(' ');
            line.push_str(&cell);
            line.push_str(" |");
        }
        line
    };
    let mut lines = vec![row_line(&table.header)];
    let mut delimiter = String::from("|");
    for idx in 0..columns {
        delimiter.push_str(
            match table.alignments.get(idx).copied().unwrap_or_default() {
                ColumnAlign::None => " --- |",
                ColumnAlign::Left => " :-- |",
                ColumnAlign::Center => " :-: |",
                ColumnAlign::Right => " --: |",
            },
        );
    }
    lines.push(delimiter);
    for row in &table.rows {
        lines.push(row_line(row));
    }
    out.push_str(&lines.join("\n"));
}

/// Marks in nesting order, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mark {
    Link(String),
    Strong,
    Emphasis,
    Strikethrough,
}

fn marks_of(style: &InlineStyle) -> Vec<Mark> {
    let mut marks = Vec::new();
    if let Some(url) = &style.link {
        marks.push(Mark::Link(url.clone()));
    }
    if style.strong {
        marks.push(Mark::Strong);
    }
    if style.emphasis {
        marks.push(Mark::Emphasis);
    }
    if style.strikethrough {
        marks.push(Mark::Strikethrough);
    }
    marks
}

/// Serialize styled runs to inline markdown.
///
/// Marks shared with the previous run stay open. Whitespace at run edges is
/// moved outside the delimiters so emphasis stays left/right flanking.
pub(crate) fn inline_markdown(content: &InlineContent, in_table: bool) -> String {
    let mut writer = InlineWriter::new(in_table);
    let mut active: Vec<Mark> = Vec::new();
    let mut pending_ws = String::new();

    for run in content.runs() {
        let wanted = marks_of(&run.style);
        let (lead, core, trail) = if run.style.code {
            ("", run.text.as_str(), "")
        } else {
            split_whitespace_edges(&run.text)
        };
        if core.is_empty() {
            pending_ws.push_str(&run.text);
            continue;
        }

        let keep = active
            .iter()
            .zip(&wanted)
            .take_while(|(open, want)| open == want)
            .count();
        while active.len() > keep {
            if let Some(mark) = active.pop() {
                writer.close(&mark);
            }
        }
        writer.text(&pending_ws);
        pending_ws.clear();
        writer.text(lead);
        for mark in &wanted[keep..] {
            writer.open(mark);
            active.push(mark.clone());
        }
        if run.style.code {
            writer.code_span(core);
        } else {
            writer.text(core);
        }
        pending_ws.push_str(trail);
    }

    while let Some(mark) = active.pop() {
        writer.close(&mark);
    }
    writer.finish()
}

fn split_whitespace_edges(text: &str) -> (&str, &str, &str) {
    let trimmed_start = text.trim_start();
    let lead = &text[..text.len() - trimmed_start.len()];
    let core = trimmed_start.trim_end();
    let trail = &trimmed_start[core.len()..];
    (lead, core, trail)
}

/// Whether `out` ends in a `!` that no backslash escapes.
fn ends_with_bare_bang(out: &str) -> bool {
    let Some(head) = out.strip_suffix('!') else {
        return false;
    };
    let backslashes = head.chars().rev().take_while(|ch| *ch == '\\').count();
    backslashes % 2 == 0
}

struct InlineWriter {
    out: String,
    line_start: bool,
    in_table: bool,
}

impl InlineWriter {
    const fn new(in_table: bool) -> Self {
        Self {
            out: String::new(),
            line_start: true,
            in_table,
        }
    }

    fn open(&mut self, mark: &Mark) {
        if matches!(mark, Mark::Link(_)) && ends_with_bare_bang(&self.out) {
            // `![` would turn the link into an image.
            self.out.insert(self.out.len() - 1, '\\');
        }
        self.out.push_str(match mark {
            Mark::Link(_) => "[",
            Mark::Strong => "**",
            Mark::Emphasis => "*",
            Mark::Strikethrough => "~~",
        });
        self.line_start = false;
    }

    fn close(&mut self, mark: &Mark) {
        match mark {
            Mark::Link(url) => {
                self.out.push_str("](");
                self.out.push_str(&link_destination(url));
                self.out.push(')');
            }
            Mark::Strong => self.out.push_str("**"),
            Mark::Emphasis => self.out.push('*'),
            Mark::Strikethrough => self.out.push_str("~~"),
        }
        self.line_start = false;
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let escaped = escape_with_state(text, &mut self.line_start, self.out.chars().last());
        self.out.push_str(&escaped);
    }

    fn code_span(&mut self, code: &str) {
        let mut code = code.replace('\n', " ");
        if self.in_table {
            code = code.replace('|', "\\|");
        }
        let fence = "`".repeat(longest_backtick_run(&code) + 1);
        let needs_pad = code.starts_with('`')
            || code.ends_with('`')
            || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
        self.out.push_str(&fence);
        if needs_pad {
            self.out.push(' ');
        }
        self.out.push_str(&code);
        if needs_pad {
            self.out.push(' ');
        }
        self.out.push_str(&fence);
        self.line_start = false;
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Escape text outside any inline context (image alt text).
fn escape_plain(text: &str) -> String {
    let mut line_start = true;
    escape_with_state(text, &mut line_start, None)
}

/// Backslash-escape characters that would otherwise start markdown syntax.
///
/// `line_start` tracks whether the next char begins a line, where list
/// markers, headings, quotes and setext underlines could be triggered.
/// Indentation at line start is dropped.
fn escape_with_state(
    text: &str,
    line_start: &mut bool,
    mut previous: Option<char>,
) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        let next = chars.get(idx + 1).copied();

        if ch == '\n' {
            // A blank line would end the block.
            if !*line_start {
                out.push('\n');
                *line_start = true;
                previous = Some(ch);
            }
            idx += 1;
            continue;
        }
        // Indentation would turn a line into an indented code block.
        if *line_start && (ch == ' ' || ch == '\t') {
            idx += 1;
            continue;
        }

        if *line_start {
            *line_start = false;
            if matches!(ch, '-' | '+' | '=' | '>') {
                out.push('\\');
                out.push(ch);
                previous = Some(ch);
                idx += 1;
                continue;
            }
            if ch.is_ascii_digit() {
                let digits: String = chars[idx..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                let after = chars.get(idx + digits.len()).copied();
                out.push_str(&digits);
                idx += digits.len();
                previous = digits.chars().last();
                if matches!(after, Some('.' | ')')) {
                    out.push('\\');
                    if let Some(punct) = after {
                        out.push(punct);
                        previous = Some(punct);
                    }
                    idx += 1;
                }
                continue;
            }
        }

        let escape = match ch {
            '\\' | '`' | '*' | '[' | ']' | '<' | '~' => true,
            '_' => !(previous.is_some_and(char::is_alphanumeric)
                && next.is_some_and(char::is_alphanumeric)),
            '#' => previous.is_none_or(char::is_whitespace),
            '&' => next.is_some_and(|n| n.is_alphanumeric() || n == '#'),
            '|' => true,
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(ch);
        previous = Some(ch);
        idx += 1;
    }
    out
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Link destination, bracketed when the URL would otherwise end early.
fn link_destination(url: &str) -> String {
    if url.is_empty() || url.chars().any(|c| c.is_whitespace() || c == '(' || c == ')' || c == '<' || c == '>') {
        let escaped = url.replace('<', "\\<").replace('>', "\\>");
        format!("<{escaped}>")
    } else {
        url.to_string()
    }
}
