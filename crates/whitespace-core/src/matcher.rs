//! Pattern matching over whole documents.
//!
//! Matching runs over the full text in a single pass and reports **character offsets** (not
//! byte offsets). Patterns are compiled in multi-line, CRLF-aware mode so that `^` and `$`
//! anchor at every line boundary, including before `\r\n` and lone `\r`.

use crate::error::WhitespaceError;
use crate::span::Span;
use regex::{Regex, RegexBuilder};

/// A compiled, immutable matching pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile `source` for the rule called `rule` (used in the error).
    pub fn new(rule: &'static str, source: &str) -> Result<Self, WhitespaceError> {
        let regex = RegexBuilder::new(source)
            .multi_line(true)
            .crlf(true)
            .build()
            .map_err(|source| WhitespaceError::Pattern { rule, source })?;
        Ok(Self { regex })
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Byte-to-char offset table. Pure-ASCII text maps offsets one to one without a table.
#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Option<Vec<usize>>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let char_to_byte = (!text.is_ascii()).then(|| {
            let mut table: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
            table.push(text.len());
            table
        });
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        match &self.char_to_byte {
            Some(table) => table.len().saturating_sub(1),
            None => self.text_len,
        }
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        match &self.char_to_byte {
            Some(table) => table.get(clamped).copied().unwrap_or(self.text_len),
            None => clamped,
        }
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match &self.char_to_byte {
            Some(table) => match table.binary_search(&clamped) {
                Ok(idx) => idx,
                Err(idx) => idx,
            },
            None => clamped,
        }
    }
}

/// Find all non-empty, non-overlapping matches of `pattern` in `text`, in document order.
///
/// - Returned spans are half-open character ranges with no annotation.
/// - After an empty match the search resumes one character further on, so patterns that can
///   match the empty string still terminate.
pub fn find_spans(text: &str, pattern: &Pattern) -> Vec<Span> {
    let index = CharIndex::new(text);
    let char_count = index.char_count();

    let mut spans = Vec::new();
    let mut from_char = 0;
    while from_char <= char_count {
        let Some(m) = pattern.regex.find_at(text, index.char_to_byte(from_char)) else {
            break;
        };

        let start = index.byte_to_char(m.start());
        let end = index.byte_to_char(m.end());
        match Span::new(start, end) {
            Some(span) => {
                spans.push(span);
                from_char = end;
            }
            None => from_char = end + 1,
        }
    }

    spans
}
