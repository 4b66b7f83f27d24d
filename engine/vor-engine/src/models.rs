use scoring_engine::{FantasyPoints, Player, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One player and their fantasy point total, as assembled by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub player: Player,
    pub fantasy_points: f64,
}

impl PoolEntry {
    pub fn new(player: Player, fantasy_points: f64) -> Self {
        Self { player, fantasy_points }
    }
}

impl From<&FantasyPoints> for PoolEntry {
    fn from(points: &FantasyPoints) -> Self {
        Self { player: points.player.clone(), fantasy_points: points.total }
    }
}

impl From<(Player, f64)> for PoolEntry {
    fn from((player, fantasy_points): (Player, f64)) -> Self {
        Self { player, fantasy_points }
    }
}

/// Value classification by VOR magnitude, ordered best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueTier {
    Elite,
    High,
    Medium,
    Low,
    #[serde(rename = "Below Replacement")]
    BelowReplacement,
}

impl ValueTier {
    pub const ALL: [ValueTier; 5] = [
        ValueTier::Elite,
        ValueTier::High,
        ValueTier::Medium,
        ValueTier::Low,
        ValueTier::BelowReplacement,
    ];

    /// Classify a VOR value, first matching threshold wins
    pub fn from_vor(vor: f64) -> Self {
        if vor >= 100.0 {
            ValueTier::Elite
        } else if vor >= 50.0 {
            ValueTier::High
        } else if vor >= 20.0 {
            ValueTier::Medium
        } else if vor >= 0.0 {
            ValueTier::Low
        } else {
            ValueTier::BelowReplacement
        }
    }

    /// Inclusive lower VOR bound, `None` for Below Replacement
    pub fn min_vor(&self) -> Option<f64> {
        match self {
            ValueTier::Elite => Some(100.0),
            ValueTier::High => Some(50.0),
            ValueTier::Medium => Some(20.0),
            ValueTier::Low => Some(0.0),
            ValueTier::BelowReplacement => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValueTier::Elite => "Elite",
            ValueTier::High => "High",
            ValueTier::Medium => "Medium",
            ValueTier::Low => "Low",
            ValueTier::BelowReplacement => "Below Replacement",
        }
    }
}

impl fmt::Display for ValueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Replacement baseline computed for one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementLevel {
    pub position: Position,

    /// 1-indexed rank derived from the league configuration
    pub replacement_rank: usize,

    /// Players at this position in the pool
    pub pool_size: usize,

    /// Fantasy points of the replacement player
    pub points: f64,

    /// True when the pool was smaller than the replacement rank
    pub thin_pool: bool,
}

/// Ranked value of one player within a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VorResult {
    pub player: Player,
    pub fantasy_points: f64,

    /// Replacement-level points for the player's position
    pub replacement_level: f64,

    /// `fantasy_points - replacement_level`
    pub raw_vor: f64,

    pub scarcity_multiplier: f64,

    /// `raw_vor * scarcity_multiplier`; drives overall rank and tier
    pub vor: f64,

    pub position_rank: usize,
    pub overall_rank: usize,
    pub tier: ValueTier,
}
