//! Rope-backed line index.
//!
//! Converts between document character offsets and line/column positions. Lines are split on
//! `\n`, `\r\n` and lone `\r`, matching the anchors used by the built-in rule patterns.

use ropey::Rope;

/// A zero-based line/column position (column in `char`s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column within the line.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Logical line index over a document's text.
///
/// Hosts that already keep their own buffer only need this for offset conversion; the demo host
/// also uses it as its editable buffer.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build an index from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Convert a character offset to a line/column position.
    ///
    /// Offsets past the end are clamped to the end of the document.
    pub fn char_offset_to_position(&self, char_offset: usize) -> Position {
        let char_offset = char_offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_offset);
        let line_start = self.rope.line_to_char(line);
        Position::new(line, char_offset - line_start)
    }

    /// Convert a line/column position to a character offset.
    ///
    /// Lines past the end map to the end of the document; columns past the end of a line are
    /// clamped to the position just before its terminator.
    pub fn position_to_char_offset(&self, position: Position) -> usize {
        if position.line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }

        let line_start = self.rope.line_to_char(position.line);
        line_start + position.column.min(self.line_len(position.line))
    }

    /// Length of a line in characters, excluding its terminator.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }

        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
        len
    }

    /// Get total line count (an empty document has one line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Insert text at a character offset (clamped to the end).
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let char_offset = char_offset.min(self.rope.len_chars());
        self.rope.insert(char_offset, text);
    }

    /// Delete `len_chars` characters starting at `start_char` (clamped to the end).
    pub fn delete(&mut self, start_char: usize, len_chars: usize) {
        let start_char = start_char.min(self.rope.len_chars());
        let end_char = start_char.saturating_add(len_chars).min(self.rope.len_chars());

        if start_char < end_char {
            self.rope.remove(start_char..end_char);
        }
    }

    /// Get the complete text.
    pub fn get_text(&self) -> String {
        self.rope.to_string()
    }

    /// Get text of a line, excluding its terminator.
    pub fn get_line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }

        let start = self.rope.line_to_char(line);
        Some(self.rope.slice(start..start + self.line_len(line)).to_string())
    }
}
