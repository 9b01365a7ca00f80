//! Error types for slide-animation-core.
//!
//! Engine operations never fail; errors only come from loading data
//! (slide animation manifests, JSON config).

/// Errors raised while loading slide animation data.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SlideAnimationError {
    /// Input is not valid JSON or does not match the schema
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// An element was declared without an id
    #[error("element #{index} in slide '{slide}' has an empty id")]
    EmptyElementId { slide: String, index: usize },

    /// The manifest has no slide id
    #[error("slide manifest has an empty slide id")]
    EmptySlideId,
}

impl From<serde_json::Error> for SlideAnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
