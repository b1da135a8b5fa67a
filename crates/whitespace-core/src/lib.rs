#![warn(missing_docs)]
//! Whitespace Core - Headless Trailing-Whitespace and Mixed-Indentation Highlighting
//!
//! # Overview
//!
//! `whitespace-core` finds unwanted whitespace in a document and tells a host editor which
//! character ranges to highlight, live, as the user types. It does no rendering and owns no
//! document; the host supplies text, cursor and settings through small traits and receives
//! spans through a [`RenderSink`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session (WhitespaceHighlighter)            │  ← Host notifications / toggle
//! ├─────────────────────────────────────────────┤
//! │  Scheduler + Timer (trailing debounce)      │  ← When to re-scan
//! ├─────────────────────────────────────────────┤
//! │  Aggregator (ScanContext → FlaggedSpan)     │  ← Suppression policy
//! ├─────────────────────────────────────────────┤
//! │  Rules (trailing / mixed indentation)       │  ← What is flagged
//! ├─────────────────────────────────────────────┤
//! │  Matcher (regex → char-offset Span)         │  ← Whole-document matching
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## One-off scan
//!
//! ```rust
//! use whitespace_core::{RuleKind, RuleSet, ScanContext, WhitespaceConfig, compute_decorations};
//!
//! let rules = RuleSet::builtin().unwrap();
//! let config = WhitespaceConfig::default();
//!
//! let text = "fn main() {  \n  \tlet x = 1;\n}\n";
//! let flagged = compute_decorations(ScanContext::new(text, None, &config), &rules);
//!
//! assert_eq!(flagged.len(), 2);
//! assert_eq!(flagged[0].rule, RuleKind::TrailingWhitespace);
//! assert_eq!((flagged[0].span.start, flagged[0].span.end), (11, 13));
//! assert_eq!(flagged[1].rule, RuleKind::MixedIndentation);
//! assert_eq!(flagged[1].span.annotation, Some("Mixed indentation."));
//! ```
//!
//! ## Live highlighting
//!
//! See [`session`] for wiring a [`WhitespaceHighlighter`] to a host.
//!
//! # Module Description
//!
//! - [`span`] - Flagged span data model
//! - [`line_index`] - Offset ↔ line/column conversion
//! - [`matcher`] - Whole-document pattern matching
//! - [`rules`] - Built-in whitespace rules
//! - [`config`] - User-facing options
//! - [`aggregate`] - Pure scan aggregation and suppression
//! - [`timer`] - One-shot timer capability
//! - [`scheduler`] - Trailing-debounce scheduler
//! - [`host`] - Collaborator traits implemented by the host
//! - [`session`] - The live highlighting controller

pub mod aggregate;
pub mod config;
mod error;
pub mod host;
pub mod line_index;
pub mod matcher;
pub mod rules;
pub mod scheduler;
pub mod session;
pub mod span;
pub mod timer;

pub use aggregate::{ScanContext, compute_decorations, glyph_spans};
pub use config::{DEFAULT_DEBOUNCE_MS, RuleConfig, WhitespaceConfig};
pub use error::WhitespaceError;
pub use host::{
    ConfigProvider, CursorPosition, CursorProvider, DocumentId, DocumentProvider,
    HighlightCategory, HighlightLayer, RenderSink,
};
pub use line_index::{LineIndex, Position};
pub use matcher::{Pattern, find_spans};
pub use rules::{Rule, RuleKind, RuleSet};
pub use scheduler::{ScanTarget, Scheduler, SchedulerState, TriggerKind};
pub use session::{ScanOutcome, WhitespaceHighlighter};
pub use span::{FlaggedSpan, Span};
pub use timer::{ManualTimer, PollTimer, Timer, TimerHandle};
