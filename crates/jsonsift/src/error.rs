//! Error types for the sift crate.

use thiserror::Error;

/// Errors that can occur when parsing or compiling queries.
///
/// Data-shape problems in the records themselves (missing members, nulls,
/// wrong types) are never errors; they simply fail to match. Everything here
/// is a problem with the query description.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Field path could not be parsed.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A text pattern could not be turned into a regular expression.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Filter `type` tag outside the known vocabulary.
    #[error("unknown filter type '{0}'")]
    UnknownFilterType(String),

    /// Logical `operation` outside `and`, `or`, `nand`, `nor`.
    #[error("unknown logical operation '{0}'")]
    UnknownOperation(String),

    /// Sort field encoding without a field name.
    #[error("invalid sort field '{0}'")]
    InvalidSortField(String),

    /// Filter literal did not have the expected shape.
    #[error("invalid filter literal: {0}")]
    InvalidFilter(#[from] serde_json::Error),
}

impl SiftError {
    pub(crate) fn path(path: &str, reason: &'static str) -> Self {
        SiftError::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }
}

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
