use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Stat category scored through the points-allowed bucket table
pub const POINTS_ALLOWED: &str = "points_allowed";

/// Flat field goal count, superseded by `field_goals_by_distance` when present
pub const FIELD_GOALS: &str = "field_goals";

/// Roster position of a fantasy football player
///
/// Serialized as its abbreviation; parsing is case-insensitive and accepts
/// "DEF" for team defenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
}

impl Position {
    pub const ALL: [Position; 6] =
        [Position::QB, Position::RB, Position::WR, Position::TE, Position::K, Position::DST];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DST => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a position string is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPosition(pub String);

impl fmt::Display for UnknownPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown position '{}'", self.0)
    }
}

impl std::error::Error for UnknownPosition {}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.as_str().to_string()
    }
}

impl TryFrom<String> for Position {
    type Error = UnknownPosition;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Position {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Ok(Position::QB),
            "RB" => Ok(Position::RB),
            "WR" => Ok(Position::WR),
            "TE" => Ok(Position::TE),
            "K" => Ok(Position::K),
            "DST" | "DEF" | "D/ST" => Ok(Position::DST),
            _ => Err(UnknownPosition(s.to_string())),
        }
    }
}

/// Player identity shared by projections, scores and rankings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable player ID assigned by the ingestion side
    pub id: u32,

    /// Player name (e.g., "Lamar Jackson")
    pub name: String,

    pub position: Position,

    /// Team abbreviation (e.g., "BAL")
    pub team: String,
}

impl Player {
    pub fn new(id: u32, name: impl Into<String>, position: Position, team: impl Into<String>) -> Self {
        Self { id, name: name.into(), position, team: team.into() }
    }
}

/// Statistical forecast for one player over a season or a single week
///
/// Categories are sparse: anything absent from `stats` counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProjection {
    #[serde(flatten)]
    pub player: Player,

    /// Week number for weekly projections, `None` for season totals
    #[serde(default)]
    pub week: Option<u32>,

    /// Category name (e.g., "passing_yards") to projected value
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,

    /// Kick distance in yards to projected made field goals
    #[serde(default)]
    pub field_goals_by_distance: BTreeMap<u32, f64>,
}

impl PlayerProjection {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            week: None,
            stats: BTreeMap::new(),
            field_goals_by_distance: BTreeMap::new(),
        }
    }

    pub fn with_stat(mut self, category: impl Into<String>, value: f64) -> Self {
        self.stats.insert(category.into(), value);
        self
    }

    pub fn with_field_goals_at(mut self, distance_yards: u32, made: f64) -> Self {
        self.field_goals_by_distance.insert(distance_yards, made);
        self
    }

    /// Projected value for a category, zero when absent
    pub fn stat(&self, category: &str) -> f64 {
        self.stats.get(category).copied().unwrap_or(0.0)
    }
}

/// How a single category's contribution was resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringBasis {
    /// Flat multiplier: stat value × points per unit
    Linear { rule: String, points_per_unit: f64 },

    /// Value fell into the bucket `[lower, upper)` of a tiered table
    Bucketed { rule: String, lower: f64, upper: Option<f64>, bucket_points: f64 },

    /// No rule resolved for the category; contributes zero
    Unscored,
}

/// Contribution of one stat category to a fantasy point total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub stat_value: f64,
    pub points: f64,
    pub basis: ScoringBasis,
}

impl CategoryScore {
    pub fn is_unscored(&self) -> bool {
        matches!(self.basis, ScoringBasis::Unscored)
    }
}

/// Fantasy points for one projection under one rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FantasyPoints {
    pub player: Player,

    /// Name of the rule set that produced this result
    pub rules: String,

    /// Total rounded to one decimal
    pub total: f64,

    /// Per-category contributions at full precision
    pub breakdown: BTreeMap<String, CategoryScore>,
}

impl FantasyPoints {
    /// Unrounded sum of the breakdown
    pub fn raw_total(&self) -> f64 {
        self.breakdown.values().map(|score| score.points).sum()
    }

    /// Points contributed by a category, zero when absent
    pub fn points_for(&self, category: &str) -> f64 {
        self.breakdown.get(category).map(|score| score.points).unwrap_or(0.0)
    }

    /// Categories that had no resolvable scoring rule
    pub fn unscored_categories(&self) -> impl Iterator<Item = &str> {
        self.breakdown
            .iter()
            .filter(|(_, score)| score.is_unscored())
            .map(|(category, _)| category.as_str())
    }
}
