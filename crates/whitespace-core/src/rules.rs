//! Built-in whitespace rules.
//!
//! Each rule is a fixed pattern plus an annotation. Rules have no state; classifying a document
//! is a pure function of its text.

use crate::error::WhitespaceError;
use crate::matcher::{Pattern, find_spans};
use crate::span::FlaggedSpan;
use serde::{Deserialize, Serialize};

/// Identifies a built-in rule.
///
/// The derived ordering is the order rules run in during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// Space(s) followed by tab(s) in a line's leading whitespace.
    MixedIndentation,
    /// Horizontal whitespace at the end of a line.
    TrailingWhitespace,
}

impl RuleKind {
    /// All built-in rules, in aggregation order.
    pub const ALL: [RuleKind; 2] = [RuleKind::MixedIndentation, RuleKind::TrailingWhitespace];

    /// Stable identifier, matching the configuration key.
    pub fn name(self) -> &'static str {
        match self {
            Self::MixedIndentation => "mixedIndentation",
            Self::TrailingWhitespace => "trailingWhitespace",
        }
    }

    /// Human-readable explanation attached to every span this rule flags.
    pub fn annotation(self) -> &'static str {
        match self {
            Self::MixedIndentation => "Mixed indentation.",
            Self::TrailingWhitespace => "Unnecessary trailing whitespace.",
        }
    }

    /// Pattern source; compiled in multi-line, CRLF-aware mode.
    pub fn pattern_source(self) -> &'static str {
        match self {
            // Tabs, then a space run, then tabs: a space before a later tab.
            Self::MixedIndentation => r"^\t* +\t+",
            // Space, tab, form feed, vertical tab.
            Self::TrailingWhitespace => r"[ \t\x0C\x0B]+$",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    pattern: Pattern,
}

impl Rule {
    /// Compile the pattern for `kind`.
    pub fn new(kind: RuleKind) -> Result<Self, WhitespaceError> {
        Ok(Self {
            kind,
            pattern: Pattern::new(kind.name(), kind.pattern_source())?,
        })
    }

    /// Which built-in rule this is.
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Flag every span of `text` that violates this rule, in document order.
    pub fn classify(&self, text: &str) -> Vec<FlaggedSpan> {
        find_spans(text, &self.pattern)
            .into_iter()
            .map(|span| FlaggedSpan::new(self.kind, span))
            .collect()
    }
}

/// The ordered set of compiled rules used for aggregation.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile all built-in rules.
    ///
    /// Call once at start-up; a failure here is a fatal configuration error.
    pub fn builtin() -> Result<Self, WhitespaceError> {
        Self::with_rules(&RuleKind::ALL)
    }

    /// Compile a subset of the built-in rules. Rules always run in [`RuleKind`] order.
    pub fn with_rules(kinds: &[RuleKind]) -> Result<Self, WhitespaceError> {
        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();

        let rules = kinds
            .into_iter()
            .map(Rule::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Compiled rules, in aggregation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a compiled rule.
    pub fn get(&self, kind: RuleKind) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.kind == kind)
    }
}
