//! Error types for text_features
//!
//! Lookups of unknown tokens are not errors; they answer zero. Everything
//! below is a condition the caller has to deal with.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Main error type for text_features
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// A context with this name is already attached to the feature
    #[error("Duplicate context: {name}")]
    DuplicateContext { name: String },

    /// Context boundaries are empty, do not start at 0, or decrease
    #[error("Invalid boundaries for context {context}: {message}")]
    InvalidBoundaries { context: String, message: String },

    /// A boundary points past the end of the token stream
    #[error("Boundary {index} of context {context} is past the end of a {len}-token stream")]
    BoundaryOutOfRange {
        context: String,
        index: usize,
        len: usize,
    },

    /// Normalization of a feature whose counts sum to zero
    #[error("Cannot normalize: total occurrence count is zero")]
    ZeroTotal,

    /// Document id is not registered in the set
    #[error("Unknown document: {0}")]
    UnknownDocument(String),

    /// Strict subtraction would take a count below zero
    #[error("Count underflow for token {token}: have {have}, subtracting {requested}")]
    Underflow {
        token: String,
        have: u64,
        requested: u64,
    },

    /// Stored counts are zero, repeated, or overflow the total
    #[error("Invalid counts: {message}")]
    InvalidCounts { message: String },

    /// Count is not representable in the requested numeric type
    #[error("Count {value} does not fit the requested numeric type")]
    NumericCast { value: u64 },

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Snapshot serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl FeatureError {
    /// Create an invalid boundaries error
    pub fn invalid_boundaries(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBoundaries {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid counts error
    pub fn invalid_counts(message: impl Into<String>) -> Self {
        Self::InvalidCounts {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error came from context validation
    pub fn is_context_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateContext { .. }
                | Self::InvalidBoundaries { .. }
                | Self::BoundaryOutOfRange { .. }
        )
    }
}

impl From<serde_cbor::Error> for FeatureError {
    fn from(err: serde_cbor::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
