//! Error types for keyframe index operations.

use rune_cssom::CssomError;
use thiserror::Error;

/// Result type for keyframe index operations.
pub type Result<T> = std::result::Result<T, KeyframesError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyframesError {
    /// Failure raised by the stylesheet host, passed through unchanged.
    #[error(transparent)]
    Cssom(#[from] CssomError),

    /// No unused generated name was found.
    #[error("no unused animation name after {attempts} attempts")]
    NameSpaceExhausted { attempts: u32 },

    /// The rule inserted for a new animation is not a keyframe-group rule.
    #[error("rule at index {index} is not a keyframes rule")]
    UnexpectedRule { index: usize },
}
