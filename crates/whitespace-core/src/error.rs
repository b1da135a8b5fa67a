use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while compiling rules or loading configuration.
pub enum WhitespaceError {
    #[error("regex compile error for rule '{rule}': {source}")]
    /// A rule pattern failed to compile.
    Pattern {
        /// Name of the rule that owns the pattern.
        rule: &'static str,
        /// The compiler error.
        #[source]
        source: regex::Error,
    },

    #[error("configuration parse error: {0}")]
    /// The configuration document was not valid JSON for [`WhitespaceConfig`](crate::WhitespaceConfig).
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    /// Reading a configuration file failed.
    Io(#[from] std::io::Error),
}
