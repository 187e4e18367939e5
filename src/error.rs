//! Error types for the viewer core.

use thiserror::Error;

/// Result type alias using NaipError.
pub type NaipResult<T> = Result<T, NaipError>;

/// Errors raised by the codec, registry, style and location layers.
///
/// `MalformedHashField` and `UnknownEpoch` never escape the core: callers
/// recover by dropping the field or substituting the default epoch.
#[derive(Debug, Error)]
pub enum NaipError {
    #[error("Unknown mosaic epoch: {0}")]
    UnknownEpoch(String),

    #[error("Malformed hash field {index}: {value:?}")]
    MalformedHashField { index: usize, value: String },

    #[error("Invalid location '{href}': {source}")]
    InvalidLocation {
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to parse style document: {0}")]
    StyleParse(#[from] simd_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
