//! Flagged span data model.
//!
//! All offsets are half-open ranges of Unicode scalar values (`char`) from the start of the
//! document, the same unit [`LineIndex`](crate::LineIndex) converts to and from line/column.

use crate::rules::RuleKind;

/// A non-empty half-open character range (`start..end`) with an optional annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// Why the span was flagged, if known.
    pub annotation: Option<&'static str>,
}

impl Span {
    /// Create a span, or `None` if the range would be empty (or inverted).
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start < end).then_some(Self {
            start,
            end,
            annotation: None,
        })
    }

    /// Attach an annotation.
    pub fn with_annotation(mut self, annotation: &'static str) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Returns the length of the span in characters (always at least 1).
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `offset` lies inside `start..end`.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// A span produced by a specific rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlaggedSpan {
    /// The rule that produced the span.
    pub rule: RuleKind,
    /// The flagged range, annotated with the rule's explanation.
    pub span: Span,
}

impl FlaggedSpan {
    /// Tag `span` with `rule`, replacing its annotation with the rule's.
    pub fn new(rule: RuleKind, span: Span) -> Self {
        Self {
            rule,
            span: span.with_annotation(rule.annotation()),
        }
    }
}
