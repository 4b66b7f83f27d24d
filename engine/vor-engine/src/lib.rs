//! VOR Engine
//!
//! Ranks a pool of scored players by value over replacement (VOR). A league
//! configuration sets how many players per position are rostered league-wide;
//! the player at that depth defines the position's replacement level, and
//! every player is valued by how far they sit above it.
//!
//! Each ranking run is independent and holds no shared state, so engines can
//! be used from many threads at once.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod views;


pub use config::{
    FlexSlot, LeagueConfig, LeaguePreset, PositionSettings, DEFAULT_SCARCITY_MULTIPLIER,
};
pub use engine::{RankedPool, VorEngine};
pub use error::{ConfigurationError, Result, ValidationError, VorError};
pub use models::{PoolEntry, ReplacementLevel, ValueTier, VorResult};
pub use views::{
    snake_pick_number, DraftPick, DraftTargetQuery, DraftTargets, PlayerComparison, ValueTiers,
    VorGap,
};

/// Rank a pool against a league configuration in one call
pub fn rank(pool: &[PoolEntry], config: &LeagueConfig) -> Result<RankedPool> {
    VorEngine::new(config.clone())?.rank(pool)
}
