//! Scan aggregation.
//!
//! [`compute_decorations`] is the whole scan: a pure function of the snapshot text, the cursor,
//! the configuration and the compiled rules. All I/O happens in the caller.

use crate::config::WhitespaceConfig;
use crate::rules::RuleSet;
use crate::span::{FlaggedSpan, Span};

/// Everything a single scan reads, captured fresh by the caller before each scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    /// Full document text.
    pub text: &'a str,
    /// Active cursor, as a character offset.
    pub cursor: Option<usize>,
    /// Resolved configuration.
    pub config: &'a WhitespaceConfig,
    /// Master show/hide flag. Starts from `config.show_highlights`; the toggle command flips it.
    pub show_highlights: bool,
}

impl<'a> ScanContext<'a> {
    /// Build a context that takes the master flag from `config`.
    pub fn new(text: &'a str, cursor: Option<usize>, config: &'a WhitespaceConfig) -> Self {
        Self {
            text,
            cursor,
            config,
            show_highlights: config.show_highlights,
        }
    }

    /// Override the master flag.
    pub fn with_show_highlights(mut self, show: bool) -> Self {
        self.show_highlights = show;
        self
    }
}

/// Run every enabled rule over `ctx.text` and apply the suppression policy.
///
/// The result is in document order (ties keep rule order) and each entry carries its rule's
/// annotation. Spans from different rules that cover the same text stay separate.
pub fn compute_decorations(ctx: ScanContext<'_>, rules: &RuleSet) -> Vec<FlaggedSpan> {
    if !ctx.show_highlights {
        return Vec::new();
    }

    let mut flagged: Vec<FlaggedSpan> = rules
        .rules()
        .iter()
        .filter(|rule| ctx.config.is_rule_enabled(rule.kind()))
        .flat_map(|rule| rule.classify(ctx.text))
        .collect();

    if ctx.config.suppress_at_cursor
        && let Some(cursor) = ctx.cursor
    {
        flagged.retain(|f| f.span.end != cursor);
    }

    flagged.sort_by_key(|f| (f.span.start, f.span.end));
    flagged
}

/// One-character spans for each space and tab inside `flagged`, for glyph rendering.
///
/// Spans that overlap (e.g. a whitespace-only line flagged by both rules) do not produce
/// duplicate glyphs.
pub fn glyph_spans(text: &str, flagged: &[FlaggedSpan]) -> Vec<Span> {
    let mut ranges: Vec<(usize, usize)> = flagged
        .iter()
        .map(|f| (f.span.start, f.span.end))
        .collect();
    ranges.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut glyphs = Vec::new();
    let mut pending = merged.into_iter().peekable();
    for (offset, ch) in text.chars().enumerate() {
        while pending.next_if(|&(_, end)| end <= offset).is_some() {}
        let Some(&(start, _)) = pending.peek() else {
            break;
        };
        if offset >= start && matches!(ch, ' ' | '\t') {
            glyphs.extend(Span::new(offset, offset + 1));
        }
    }

    glyphs
}
