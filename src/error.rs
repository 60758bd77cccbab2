//! Error types for idnoise.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! specific conditions. Noising itself never fails at runtime: every error
//! here is raised either at construction time (configuration), while loading
//! reference corpora, or by the strict phone parser.

use thiserror::Error;

/// Configuration errors, raised when a noiser or config is constructed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Probability '{field}' = {value} is out of range [0.0, 1.0]")]
    ProbabilityOutOfRange {
        field: String,
        value: f64,
    },

    #[error("Cumulative thresholds of '{chain}' sum to {total}, which exceeds 1.0")]
    ThresholdChainExceedsOne {
        chain: String,
        total: f64,
    },

    #[error("Invalid duplicate bounds: minimum {min} is greater than maximum {max}")]
    InvalidDuplicateBounds {
        min: usize,
        max: usize,
    },

    #[error("Invalid keyboard augmentation bounds: minimum {min} is greater than maximum {max}")]
    InvalidAugmentBounds {
        min: usize,
        max: usize,
    },

    #[error("Batch worker count must be at least 1")]
    InvalidWorkerCount,
}

/// Errors raised when parsing structured values.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid phone number: {input}")]
    InvalidPhoneNumber {
        input: String,
    },
}

/// Errors raised while reading reference corpora.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed corpus line {line}: {reason}")]
    Malformed {
        line: usize,
        reason: String,
    },

    #[error("Corpus header has no '{column}' column")]
    MissingColumn {
        column: String,
    },
}

/// Top-level error type for idnoise.
#[derive(Debug, Error)]
pub enum NoiseError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Configuration could not be decoded: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl NoiseError {
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

    /// Returns true if this is a parse error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true if this is a corpus error.
    #[must_use]
    pub const fn is_corpus(&self) -> bool {
        matches!(self, Self::Corpus(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for idnoise operations.
pub type NoiseResult<T> = Result<T, NoiseError>;
