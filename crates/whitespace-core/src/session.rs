//! The live highlighting controller.
//!
//! [`WhitespaceHighlighter`] owns the compiled rules, the current configuration, the master
//! show/hide flag and the debounce [`Scheduler`]. The host forwards change notifications to the
//! `on_*` methods and reports expired timer handles to [`WhitespaceHighlighter::fire`], which
//! runs one scan and repaints every [`HighlightCategory`] on the [`RenderSink`].
//!
//! # Example
//!
//! ```rust
//! use std::borrow::Cow;
//! use std::time::Duration;
//! use whitespace_core::{
//!     ConfigProvider, CursorPosition, CursorProvider, DocumentId, DocumentProvider,
//!     HighlightCategory, HighlightLayer, ManualTimer, RenderSink, RuleSet, ScanOutcome,
//!     Span, WhitespaceConfig, WhitespaceHighlighter,
//! };
//!
//! struct Doc(String);
//!
//! impl DocumentProvider for Doc {
//!     fn active_document(&self) -> Option<DocumentId> { Some(DocumentId(1)) }
//!     fn revision(&self, _: DocumentId) -> Option<u64> { Some(1) }
//!     fn text(&self, _: DocumentId) -> Option<Cow<'_, str>> { Some(Cow::Borrowed(&self.0)) }
//! }
//! impl CursorProvider for Doc {
//!     fn cursor(&self) -> Option<CursorPosition> { Some(CursorPosition::Offset(0)) }
//! }
//! impl ConfigProvider for Doc {
//!     fn config(&self) -> WhitespaceConfig { WhitespaceConfig::default() }
//! }
//!
//! #[derive(Default)]
//! struct Painted(Vec<(HighlightCategory, Vec<Span>)>);
//! impl RenderSink for Painted {
//!     fn paint(&mut self, layer: &HighlightLayer, spans: &[Span]) {
//!         self.0.push((layer.category, spans.to_vec()));
//!     }
//! }
//!
//! let doc = Doc("let x = 1;   \n".to_string());
//! let mut sink = Painted::default();
//! let mut highlighter = WhitespaceHighlighter::new(
//!     RuleSet::builtin().unwrap(),
//!     WhitespaceConfig::default(),
//!     ManualTimer::new(),
//! );
//!
//! highlighter.on_text_changed(&doc, DocumentId(1));
//! for handle in highlighter.timer_mut().advance(Duration::from_millis(250)) {
//!     let outcome = highlighter.fire(handle, &doc, &doc, &doc, &mut sink);
//!     assert!(matches!(outcome, ScanOutcome::Painted { spans: 1, .. }));
//! }
//!
//! let (_, trailing) = &sink.0[1];
//! assert_eq!((trailing[0].start, trailing[0].end), (10, 13));
//! ```

use crate::aggregate::{ScanContext, compute_decorations, glyph_spans};
use crate::config::WhitespaceConfig;
use crate::host::{
    ConfigProvider, CursorPosition, CursorProvider, DocumentId, DocumentProvider,
    HighlightCategory, HighlightLayer, RenderSink,
};
use crate::line_index::LineIndex;
use crate::rules::RuleSet;
use crate::scheduler::{ScanTarget, Scheduler, TriggerKind};
use crate::span::{FlaggedSpan, Span};
use crate::timer::{Timer, TimerHandle};

/// Result of reporting an expired timer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The handle was not the pending one; nothing happened.
    Ignored,
    /// No document is active; nothing was painted.
    NoDocument,
    /// The scan targeted a document that is no longer active (or was closed) and was dropped.
    Stale,
    /// A scan ran and every category was repainted.
    Painted {
        /// The scanned document.
        document: DocumentId,
        /// Number of rule spans painted (glyphs not included).
        spans: usize,
    },
}

/// Live whitespace highlighting for a host editor.
#[derive(Debug)]
pub struct WhitespaceHighlighter<T: Timer> {
    rules: RuleSet,
    config: WhitespaceConfig,
    show_highlights: bool,
    scheduler: Scheduler<T>,
}

impl<T: Timer> WhitespaceHighlighter<T> {
    /// Create an idle highlighter.
    pub fn new(rules: RuleSet, config: WhitespaceConfig, timer: T) -> Self {
        let scheduler = Scheduler::new(timer, config.debounce());
        Self {
            rules,
            show_highlights: config.show_highlights,
            config,
            scheduler,
        }
    }

    /// The configuration currently in effect.
    pub fn config(&self) -> &WhitespaceConfig {
        &self.config
    }

    /// The master show/hide flag.
    pub fn show_highlights(&self) -> bool {
        self.show_highlights
    }

    /// The debounce scheduler.
    pub fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }

    /// The timer driving the scheduler.
    pub fn timer(&self) -> &T {
        self.scheduler.timer()
    }

    /// Mutable access to the timer driving the scheduler.
    pub fn timer_mut(&mut self) -> &mut T {
        self.scheduler.timer_mut()
    }

    /// The text of `document` changed. Only the active document triggers a re-scan.
    pub fn on_text_changed(&mut self, docs: &impl DocumentProvider, document: DocumentId) {
        if docs.active_document() != Some(document) {
            return;
        }
        self.trigger(docs, TriggerKind::TextChanged);
    }

    /// The cursor moved; cursor suppression depends on it, so the active document is re-scanned.
    pub fn on_cursor_moved(&mut self, docs: &impl DocumentProvider) {
        self.trigger(docs, TriggerKind::CursorMoved);
    }

    /// The active document changed (or was cleared).
    ///
    /// Re-arming drops any scan still pending for the previous document.
    pub fn on_active_document_changed(&mut self, docs: &impl DocumentProvider) {
        self.trigger(docs, TriggerKind::ActiveDocumentChanged);
    }

    /// `document` was closed.
    pub fn on_document_closed(&mut self, document: DocumentId) {
        self.scheduler.invalidate(document);
    }

    /// The configuration changed; read it fresh and replace the current one.
    ///
    /// The master flag follows the configured value only when that value itself changed, so a
    /// toggled state survives unrelated setting changes.
    pub fn on_config_changed(
        &mut self,
        docs: &impl DocumentProvider,
        settings: &impl ConfigProvider,
    ) {
        let config = settings.config();
        if config.show_highlights != self.config.show_highlights {
            self.show_highlights = config.show_highlights;
        }
        self.scheduler.set_delay(config.debounce());
        self.config = config;
        self.trigger(docs, TriggerKind::ConfigurationChanged);
    }

    /// Flip the master flag, report the new state and schedule a repaint.
    ///
    /// Returns the new value of the flag.
    pub fn toggle(&mut self, docs: &impl DocumentProvider, sink: &mut impl RenderSink) -> bool {
        self.show_highlights = !self.show_highlights;
        let message = if self.show_highlights {
            "Whitespace highlighting enabled"
        } else {
            "Whitespace highlighting disabled"
        };
        tracing::debug!("{}", message);
        sink.notify(message);
        self.trigger(docs, TriggerKind::Toggled);
        self.show_highlights
    }

    /// Handle an expired timer: run one scan and repaint every category.
    pub fn fire(
        &mut self,
        handle: TimerHandle,
        docs: &impl DocumentProvider,
        cursor: &impl CursorProvider,
        settings: &impl ConfigProvider,
        sink: &mut impl RenderSink,
    ) -> ScanOutcome {
        let Some(target) = self.scheduler.fire(handle) else {
            return ScanOutcome::Ignored;
        };

        let Some(active) = docs.active_document() else {
            return ScanOutcome::NoDocument;
        };
        if active != target.document {
            tracing::debug!(
                "dropping scan for doc={}: active doc is {}",
                target.document.0,
                active.0
            );
            return ScanOutcome::Stale;
        }
        let (Some(revision), Some(text)) = (docs.revision(active), docs.text(active)) else {
            tracing::debug!("dropping scan for closed doc={}", active.0);
            return ScanOutcome::Stale;
        };
        if revision != target.revision {
            // A newer edit re-arms the timer itself, so this only happens when the host skipped
            // a notification; scanning the current text is still correct.
            tracing::debug!(
                "doc={} moved from rev {} to {} while pending",
                active.0,
                target.revision,
                revision
            );
        }

        let cursor = cursor.cursor().map(|position| resolve_cursor(&text, position));
        let ctx = ScanContext::new(&text, cursor, &self.config)
            .with_show_highlights(self.show_highlights);
        let flagged = compute_decorations(ctx, &self.rules);
        tracing::trace!("doc={} rev={}: {} spans", active.0, revision, flagged.len());

        let glyphs = if self.paints_glyphs(settings) {
            glyph_spans(&text, &flagged)
        } else {
            Vec::new()
        };
        self.paint(&flagged, &glyphs, sink);

        ScanOutcome::Painted {
            document: active,
            spans: flagged.len(),
        }
    }

    fn trigger(&mut self, docs: &impl DocumentProvider, kind: TriggerKind) {
        let Some(document) = docs.active_document() else {
            self.scheduler.cancel();
            return;
        };
        let Some(revision) = docs.revision(document) else {
            self.scheduler.cancel();
            return;
        };
        self.scheduler.trigger(kind, ScanTarget { document, revision });
    }

    fn paints_glyphs(&self, settings: &impl ConfigProvider) -> bool {
        self.config.show_whitespace_glyphs
            && !(self.config.defer_to_host_whitespace && settings.host_renders_whitespace())
    }

    fn paint(&self, flagged: &[FlaggedSpan], glyphs: &[Span], sink: &mut impl RenderSink) {
        for category in HighlightCategory::ALL {
            let (color, spans): (Option<String>, Vec<Span>) = match category {
                HighlightCategory::Rule(kind) => (
                    self.config.rule(kind).color.clone(),
                    flagged
                        .iter()
                        .filter(|f| f.rule == kind)
                        .map(|f| f.span)
                        .collect(),
                ),
                HighlightCategory::WhitespaceGlyphs => (None, glyphs.to_vec()),
            };
            sink.paint(&HighlightLayer { category, color }, &spans);
        }
    }
}

fn resolve_cursor(text: &str, position: CursorPosition) -> usize {
    match position {
        CursorPosition::Offset(offset) => offset,
        CursorPosition::LineColumn(position) => {
            LineIndex::from_text(text).position_to_char_offset(position)
        }
    }
}
