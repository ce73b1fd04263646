//! Error types for factcheck.
//!
//! Construction and transport failures are strongly typed using thiserror.
//! Verification itself never fails: every check ends in a
//! [`Verdict`](crate::verdict::Verdict), and boundary failures are folded
//! into `Verdict::Unverifiable`.

use thiserror::Error;

/// Validation errors raised while building configuration or queries.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A fuzzy threshold outside `[0.0, 1.0]`.
    #[error("Similarity threshold {value} is out of range [0.0, 1.0]")]
    ThresholdOutOfRange {
        /// The rejected threshold.
        value: f64,
    },

    /// A relation with an empty keyword.
    #[error("Relation keyword cannot be empty")]
    EmptyKeyword,

    /// The same relation keyword registered twice.
    #[error("Relation keyword '{keyword}' is registered twice")]
    DuplicateKeyword {
        /// The duplicated keyword.
        keyword: String,
    },

    /// A yes or no word list with no usable entries.
    #[error("Variant list '{list}' cannot be empty")]
    EmptyVariantList {
        /// Which list was empty.
        list: String,
    },

    /// A malformed knowledge-base identifier.
    #[error("Invalid {kind} identifier: '{value}'")]
    InvalidIdentifier {
        /// Identifier kind, e.g. `entity`.
        kind: String,
        /// The rejected value.
        value: String,
    },

    /// A count limit set to zero.
    #[error("Limit '{field}' must be at least 1")]
    ZeroLimit {
        /// Name of the limit.
        field: String,
    },

    /// A required field is missing or blank.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Name of the field.
        field: String,
    },
}

/// Transport errors for knowledge-base and completion calls.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint could not be reached.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Underlying error text.
        message: String,
    },

    /// The response body had an unexpected shape.
    #[error("Failed to deserialize response: {message}")]
    DeserializationFailed {
        /// Underlying error text.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("Server error (code {code}): {message}")]
    ServerError {
        /// HTTP status code.
        code: u16,
        /// Status reason.
        message: String,
    },

    /// The request exceeded its timeout.
    #[error("Request timed out after {duration_ms}ms")]
    Timeout {
        /// Configured timeout.
        duration_ms: u64,
    },
}

impl TransportError {
    /// Creates a deserialization error from anything printable.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::DeserializationFailed {
            message: message.into(),
        }
    }
}

/// Top-level error type for factcheck.
#[derive(Debug, Error)]
pub enum FactCheckError {
    /// Invalid input or configuration.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A knowledge-base or completion call failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong.
        message: String,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl FactCheckError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if the caller may reasonably retry.
    ///
    /// The crate itself never retries; this only informs callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Config { .. } | Self::Internal { .. } => false,
            Self::Transport(e) => match e {
                TransportError::ConnectionFailed { .. } | TransportError::Timeout { .. } => true,
                TransportError::ServerError { code, .. } => *code >= 500,
                TransportError::DeserializationFailed { .. } => false,
            },
        }
    }
}

impl From<serde_json::Error> for FactCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(err.to_string())
    }
}

/// Result type alias for factcheck operations.
pub type FactCheckResult<T> = Result<T, FactCheckError>;
