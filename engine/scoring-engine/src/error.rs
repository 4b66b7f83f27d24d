//! Error types for the Scoring Engine

use thiserror::Error;

/// Result type for Scoring Engine operations
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors raised while building scoring rules
///
/// Scoring a projection never fails; these only come out of rule construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Unknown scoring preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid bucket table '{table}': {reason}")]
    InvalidBuckets { table: String, reason: String },
}
