//! Error types for stylesheet object model operations.

use thiserror::Error;

/// Result type for stylesheet operations.
pub type Result<T> = std::result::Result<T, CssomError>;

/// Failures raised by rule insertion, deletion and rule-list access.
///
/// The variants mirror the DOM exceptions a browser raises for the same calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CssomError {
    /// Rule or selector text the host cannot parse or does not support.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Rule list of a cross-origin stylesheet was interrogated.
    #[error("access to stylesheet {} denied", .href.as_deref().unwrap_or("<inline>"))]
    Security { href: Option<String> },

    /// Insertion or deletion index outside the rule list.
    #[error("index {index} is out of range for a rule list of length {len}")]
    IndexSize { index: usize, len: usize },

    /// Rule placement that breaks sheet ordering constraints (`@import` first).
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),
}

impl CssomError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    /// True for the unsupported-syntax class of failures.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }

    /// True when a cross-origin rule list was accessed.
    pub fn is_security_error(&self) -> bool {
        matches!(self, Self::Security { .. })
    }
}
