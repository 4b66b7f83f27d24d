//! Error types for the VOR Engine

use scoring_engine::Position;
use thiserror::Error;

/// Result type for VOR Engine operations
pub type Result<T> = std::result::Result<T, VorError>;

/// Errors that can occur in the VOR Engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// A league configuration that cannot produce trustworthy replacement levels
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Team count must be greater than zero, got {0}")]
    InvalidTeamCount(u32),

    #[error("Position {0} appears in the player pool but has no starter count configured")]
    MissingPosition(Position),

    #[error("Flex slot '{slot}' lists {position}, which has no starter count configured")]
    UndefinedFlexPosition { slot: String, position: Position },

    #[error("Flex slot '{slot}' has invalid eligibility weights: {reason}")]
    InvalidFlexWeights { slot: String, reason: String },

    #[error("Scarcity multiplier for {position} must be finite and non-negative, got {value}")]
    InvalidScarcityMultiplier { position: Position, value: f64 },

    #[error("League '{0}' has no roster spots, so a draft has no rounds")]
    EmptyRoster(String),

    #[error("Unknown league preset: {0}")]
    UnknownPreset(String),

    #[error("Failed to load league configuration: {0}")]
    Load(String),
}

/// A request parameter outside its valid domain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Round {round} is outside 1..={max_rounds}")]
    InvalidRound { round: u32, max_rounds: u32 },

    #[error("Draft position {draft_position} is outside 1..={team_count}")]
    InvalidDraftPosition { draft_position: u32, team_count: u32 },

    #[error("Player comparison needs at least one player")]
    EmptyComparison,

    #[error("Player {0} is not in the ranked pool")]
    UnknownPlayer(u32),
}
