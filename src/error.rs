//! Error types for the telemetry sentinel.
//!
//! All fallible operations in this crate return [`SentinelResult`], built on
//! [`thiserror`] for automatic `Display` and `Error` implementations.
//!
//! The taxonomy is deliberately small: malformed caller input surfaces as one
//! of the invalid-input variants (see [`SentinelError::is_invalid_input`]),
//! and bad configuration surfaces as [`SentinelError::Config`]. An engine
//! that has not been trained yet is NOT an error condition: scoring an
//! untrained engine yields a safe-default verdict instead (see
//! [`crate::types::AnomalyVerdict::untrained`]).
//!
//! # Example
//!
//! ```rust
//! use telemetry_sentinel::error::SentinelError;
//!
//! fn check_corpus(corpus: &[Vec<f64>]) -> Result<(), SentinelError> {
//!     if corpus.is_empty() {
//!         return Err(SentinelError::invalid_input("reference corpus is empty"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// A specialized `Result` type for sentinel operations.
pub type SentinelResult<T> = Result<T, SentinelError>;

/// Unified error type for the telemetry sentinel.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SentinelError {
    /// Caller-supplied data failed validation
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what validation failed
        message: String,
    },

    /// A feature vector's length disagrees with the engine's input dimension
    #[error("Invalid input: dimension mismatch, expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Expected vector length
        expected: usize,
        /// Actual vector length received
        actual: usize,
    },

    /// Reference corpus is smaller than the training batch size
    #[error("Invalid input: insufficient samples, need at least {required}, got {available}")]
    InsufficientSamples {
        /// Minimum required samples
        required: usize,
        /// Available samples
        available: usize,
    },

    /// Configuration value rejected by validation
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },
}

impl SentinelError {
    /// Creates a new invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a new dimension-mismatch error.
    #[must_use]
    pub const fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a new insufficient-samples error.
    #[must_use]
    pub const fn insufficient_samples(required: usize, available: usize) -> Self {
        Self::InsufficientSamples {
            required,
            available,
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns `true` if this error belongs to the invalid-input class
    /// (empty or mismatched corpora, undersized batches, malformed vectors).
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::DimensionMismatch { .. }
                | Self::InsufficientSamples { .. }
        )
    }

    /// Returns `true` if this error is recoverable by the caller without
    /// code changes (e.g. by supplying more data).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientSamples { .. } => true,
            Self::InvalidInput { .. } | Self::DimensionMismatch { .. } | Self::Config { .. } => {
                false
            }
        }
    }
}
