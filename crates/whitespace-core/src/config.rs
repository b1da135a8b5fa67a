//! User-facing options.
//!
//! Configuration is owned by the host. The engine reads a fresh [`WhitespaceConfig`] on every
//! change notification and replaces its copy wholesale; it never writes one back.
//!
//! The JSON form uses camelCase keys and every key is optional:
//!
//! ```rust
//! use whitespace_core::{RuleKind, WhitespaceConfig};
//!
//! let config = WhitespaceConfig::from_json_str(
//!     r#"{ "trailingWhitespace": { "enabled": false }, "debounceMs": 100 }"#,
//! ).unwrap();
//!
//! assert!(!config.is_rule_enabled(RuleKind::TrailingWhitespace));
//! assert!(config.is_rule_enabled(RuleKind::MixedIndentation));
//! assert_eq!(config.debounce_ms, 100);
//! ```

use crate::error::WhitespaceError;
use crate::rules::RuleKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default quiet window between the last edit and the re-scan.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Per-rule options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleConfig {
    /// Whether the rule runs at all.
    pub enabled: bool,
    /// Highlight color override, passed through to the rendering sink untouched.
    pub color: Option<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: None,
        }
    }
}

/// Resolved engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhitespaceConfig {
    /// Master switch. When `false`, scans produce no spans.
    pub show_highlights: bool,
    /// Mixed-indentation rule options.
    pub mixed_indentation: RuleConfig,
    /// Trailing-whitespace rule options.
    pub trailing_whitespace: RuleConfig,
    /// Drop spans ending exactly at the cursor.
    pub suppress_at_cursor: bool,
    /// Additionally paint each space/tab inside flagged spans as a glyph.
    pub show_whitespace_glyphs: bool,
    /// Skip glyphs when the host already renders whitespace itself.
    pub defer_to_host_whitespace: bool,
    /// Quiet window for the re-scan debounce, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WhitespaceConfig {
    fn default() -> Self {
        Self {
            show_highlights: true,
            mixed_indentation: RuleConfig::default(),
            trailing_whitespace: RuleConfig::default(),
            suppress_at_cursor: true,
            show_whitespace_glyphs: false,
            defer_to_host_whitespace: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl WhitespaceConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, WhitespaceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WhitespaceError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Options for a single rule.
    pub fn rule(&self, kind: RuleKind) -> &RuleConfig {
        match kind {
            RuleKind::MixedIndentation => &self.mixed_indentation,
            RuleKind::TrailingWhitespace => &self.trailing_whitespace,
        }
    }

    /// Mutable options for a single rule.
    pub fn rule_mut(&mut self, kind: RuleKind) -> &mut RuleConfig {
        match kind {
            RuleKind::MixedIndentation => &mut self.mixed_indentation,
            RuleKind::TrailingWhitespace => &mut self.trailing_whitespace,
        }
    }

    /// Whether `kind` is enabled.
    pub fn is_rule_enabled(&self, kind: RuleKind) -> bool {
        self.rule(kind).enabled
    }

    /// The debounce quiet window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
