//! League configuration for VOR calculations

use crate::error::ConfigurationError;
use scoring_engine::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Scarcity multiplier applied when a position does not configure one
pub const DEFAULT_SCARCITY_MULTIPLIER: f64 = 1.0;

/// Backup depths observed in a 14-team league; other league sizes scale from these
const DEEP_LEAGUE_TEAMS: u32 = 14;
const DEEP_LEAGUE_BACKUP_DEPTH: [(Position, u32); 6] = [
    (Position::QB, 10),
    (Position::RB, 20),
    (Position::WR, 25),
    (Position::TE, 15),
    (Position::K, 6),
    (Position::DST, 6),
];

fn default_scarcity_multiplier() -> f64 {
    DEFAULT_SCARCITY_MULTIPLIER
}

fn default_flex_count() -> u32 {
    1
}

/// Roster settings for one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSettings {
    /// Dedicated starting slots per team
    pub starters: u32,

    /// Players drafted beyond starters league-wide before replacement level
    #[serde(default)]
    pub backup_depth: u32,

    /// Multiplier applied to raw VOR
    #[serde(default = "default_scarcity_multiplier")]
    pub scarcity_multiplier: f64,
}

impl PositionSettings {
    pub fn new(starters: u32, backup_depth: u32) -> Self {
        Self { starters, backup_depth, scarcity_multiplier: DEFAULT_SCARCITY_MULTIPLIER }
    }

    pub fn with_scarcity(mut self, multiplier: f64) -> Self {
        self.scarcity_multiplier = multiplier;
        self
    }
}

/// A roster slot that several positions may fill
///
/// Each slot is apportioned across its eligible positions in proportion to
/// their weights, so `eligible = { RB = 1, WR = 1 }` credits half a starter to
/// each per team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexSlot {
    pub name: String,

    /// Slots of this kind per team
    #[serde(default = "default_flex_count")]
    pub count: u32,

    /// Eligible position to apportionment weight
    pub eligible: BTreeMap<Position, f64>,
}

impl FlexSlot {
    pub fn new(
        name: impl Into<String>,
        count: u32,
        eligible: impl IntoIterator<Item = (Position, f64)>,
    ) -> Self {
        Self { name: name.into(), count, eligible: eligible.into_iter().collect() }
    }

    /// Per-team starters this slot credits to `position`
    pub fn share(&self, position: Position) -> f64 {
        let Some(weight) = self.eligible.get(&position) else {
            return 0.0;
        };
        let total: f64 = self.eligible.values().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.count as f64 * weight / total
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidFlexWeights {
            slot: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.eligible.is_empty() {
            return Err(invalid("no eligible positions"));
        }
        if self.eligible.values().any(|weight| !weight.is_finite() || *weight < 0.0) {
            return Err(invalid("weights must be finite and non-negative"));
        }
        if self.count > 0 && self.eligible.values().sum::<f64>() <= 0.0 {
            return Err(invalid("weights sum to zero"));
        }
        Ok(())
    }
}

/// Named league configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaguePreset {
    /// 10 teams, 1QB/2RB/2WR/1TE/1FLEX/1K/1DST
    Standard10,
    /// 12 teams, 1QB/2RB/2WR/1TE/1FLEX/1K/1DST
    Standard12,
    /// 14 teams with observed backup depths and scarcity multipliers
    Deep14,
}

impl LeaguePreset {
    pub const ALL: [LeaguePreset; 3] =
        [LeaguePreset::Standard10, LeaguePreset::Standard12, LeaguePreset::Deep14];

    pub fn name(&self) -> &'static str {
        match self {
            LeaguePreset::Standard10 => "standard_10",
            LeaguePreset::Standard12 => "standard_12",
            LeaguePreset::Deep14 => "deep_14",
        }
    }
}

impl fmt::Display for LeaguePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LeaguePreset {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.trim().to_lowercase().chars().filter(|c| *c != '_' && *c != '-').collect();
        match normalized.as_str() {
            "standard10" => Ok(LeaguePreset::Standard10),
            "standard12" | "standard" => Ok(LeaguePreset::Standard12),
            "deep14" | "deep" => Ok(LeaguePreset::Deep14),
            _ => Err(ConfigurationError::UnknownPreset(s.to_string())),
        }
    }
}

/// League size and roster construction driving replacement levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub name: String,

    pub team_count: u32,

    /// Starter count, backup depth and scarcity per position
    pub positions: BTreeMap<Position, PositionSettings>,

    #[serde(default)]
    pub flex_slots: Vec<FlexSlot>,

    /// Bench slots per team, counted toward draft length
    #[serde(default)]
    pub bench_slots: u32,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self::preset(LeaguePreset::Standard12)
    }
}

impl LeagueConfig {
    /// One-QB league of `team_count` teams with a W/R/T flex and six bench spots
    pub fn standard(team_count: u32) -> Self {
        let starters = [
            (Position::QB, 1),
            (Position::RB, 2),
            (Position::WR, 2),
            (Position::TE, 1),
            (Position::K, 1),
            (Position::DST, 1),
        ];

        let positions = starters
            .iter()
            .zip(DEEP_LEAGUE_BACKUP_DEPTH.iter())
            .map(|((position, starters), (_, deep_depth))| {
                let depth = (*deep_depth as f64 * team_count as f64 / DEEP_LEAGUE_TEAMS as f64)
                    .round() as u32;
                (*position, PositionSettings::new(*starters, depth))
            })
            .collect();

        Self {
            name: format!("standard_{team_count}"),
            team_count,
            positions,
            flex_slots: vec![FlexSlot::new(
                "FLEX",
                1,
                [(Position::RB, 0.45), (Position::WR, 0.45), (Position::TE, 0.10)],
            )],
            bench_slots: 6,
        }
    }

    pub fn preset(preset: LeaguePreset) -> Self {
        match preset {
            LeaguePreset::Standard10 => Self::standard(10),
            LeaguePreset::Standard12 => Self::standard(12),
            LeaguePreset::Deep14 => {
                let mut config = Self::standard(DEEP_LEAGUE_TEAMS);
                config.name = preset.name().to_string();
                config.flex_slots = vec![FlexSlot::new(
                    "FLEX",
                    1,
                    [(Position::RB, 1.0), (Position::WR, 1.0), (Position::TE, 1.0)],
                )];
                for (position, multiplier) in [
                    (Position::QB, 1.0),
                    (Position::RB, 1.2),
                    (Position::WR, 1.2),
                    (Position::TE, 1.1),
                    (Position::K, 0.8),
                    (Position::DST, 0.8),
                ] {
                    if let Some(settings) = config.positions.get_mut(&position) {
                        settings.scarcity_multiplier = multiplier;
                    }
                }
                config
            }
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Load(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(content).map_err(|e| ConfigurationError::Load(e.to_string()))
    }

    /// Check internal consistency independent of any player pool
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.team_count == 0 {
            return Err(ConfigurationError::InvalidTeamCount(self.team_count));
        }
        if self.roster_size() == 0 {
            return Err(ConfigurationError::EmptyRoster(self.name.clone()));
        }

        for (position, settings) in &self.positions {
            let multiplier = settings.scarcity_multiplier;
            if !multiplier.is_finite() || multiplier < 0.0 {
                return Err(ConfigurationError::InvalidScarcityMultiplier {
                    position: *position,
                    value: multiplier,
                });
            }
        }

        for slot in &self.flex_slots {
            slot.validate()?;
            if let Some(position) =
                slot.eligible.keys().find(|position| !self.positions.contains_key(position))
            {
                return Err(ConfigurationError::UndefinedFlexPosition {
                    slot: slot.name.clone(),
                    position: *position,
                });
            }
        }

        Ok(())
    }

    pub fn settings(&self, position: Position) -> Result<&PositionSettings, ConfigurationError> {
        self.positions.get(&position).ok_or(ConfigurationError::MissingPosition(position))
    }

    /// Per-team flex starters credited to `position` across every flex slot
    pub fn flex_share(&self, position: Position) -> f64 {
        self.flex_slots.iter().map(|slot| slot.share(position)).sum()
    }

    /// Per-team starters at `position`, dedicated plus flex share
    pub fn starters_at(&self, position: Position) -> Result<f64, ConfigurationError> {
        let settings = self.settings(position)?;
        Ok(settings.starters as f64 + self.flex_share(position))
    }

    /// 1-indexed rank within the position whose points set replacement level
    pub fn replacement_rank(&self, position: Position) -> Result<usize, ConfigurationError> {
        let settings = self.settings(position)?;
        let starters = self.starters_at(position)? * self.team_count as f64;
        let rank = starters.round() as usize + settings.backup_depth as usize;
        Ok(rank.max(1))
    }

    pub fn scarcity_multiplier(&self, position: Position) -> Result<f64, ConfigurationError> {
        Ok(self.settings(position)?.scarcity_multiplier)
    }

    /// Roster spots per team: starters, flex and bench
    pub fn roster_size(&self) -> u32 {
        let starters = self.positions.values().map(|settings| settings.starters);
        let flex = self.flex_slots.iter().map(|slot| slot.count);
        starters.chain(flex).fold(self.bench_slots, u32::saturating_add)
    }

    /// Rounds in a draft that fills every roster
    pub fn draft_rounds(&self) -> u32 {
        self.roster_size()
    }
}
