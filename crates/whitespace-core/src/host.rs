//! Collaborator interfaces implemented by the host editor.
//!
//! The engine reads the active document, the cursor and the configuration through these traits
//! and writes results to a [`RenderSink`]. Notifications flow the other way: the host calls the
//! `on_*` methods of [`WhitespaceHighlighter`](crate::WhitespaceHighlighter) when something
//! changes.

use crate::config::WhitespaceConfig;
use crate::line_index::Position;
use crate::rules::RuleKind;
use crate::span::Span;
use std::borrow::Cow;

/// Host-assigned identifier of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

/// Access to the host's documents.
pub trait DocumentProvider {
    /// The document currently shown to the user, if any.
    fn active_document(&self) -> Option<DocumentId>;

    /// Revision counter of `document`; it must change whenever the text changes.
    ///
    /// Returns `None` once the document is closed.
    fn revision(&self, document: DocumentId) -> Option<u64>;

    /// Full text of `document`.
    fn text(&self, document: DocumentId) -> Option<Cow<'_, str>>;
}

/// The active cursor, either as a character offset or a line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition {
    /// Character offset from the start of the document.
    Offset(usize),
    /// Zero-based line and character column.
    LineColumn(Position),
}

/// Access to the host's single active cursor.
pub trait CursorProvider {
    /// Current cursor position in the active document.
    fn cursor(&self) -> Option<CursorPosition>;
}

/// Access to the host's settings.
pub trait ConfigProvider {
    /// Current configuration values.
    fn config(&self) -> WhitespaceConfig;

    /// Whether the host already draws whitespace characters itself.
    fn host_renders_whitespace(&self) -> bool {
        false
    }
}

/// A named highlight category; each is painted once per scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HighlightCategory {
    /// Spans from a rule.
    Rule(RuleKind),
    /// Individual space/tab characters inside flagged spans.
    WhitespaceGlyphs,
}

impl HighlightCategory {
    /// Every category, in painting order.
    pub const ALL: [HighlightCategory; 3] = [
        HighlightCategory::Rule(RuleKind::MixedIndentation),
        HighlightCategory::Rule(RuleKind::TrailingWhitespace),
        HighlightCategory::WhitespaceGlyphs,
    ];

    /// Stable identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rule(kind) => kind.name(),
            Self::WhitespaceGlyphs => "whitespaceGlyphs",
        }
    }
}

/// What a [`RenderSink`] is asked to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightLayer {
    /// The category being replaced.
    pub category: HighlightCategory,
    /// Color override from the configuration, if any.
    pub color: Option<String>,
}

/// Receives scan results.
pub trait RenderSink {
    /// Replace everything painted for `layer.category` with `spans`.
    fn paint(&mut self, layer: &HighlightLayer, spans: &[Span]);

    /// Show a short status message to the user.
    fn notify(&mut self, _message: &str) {}
}
