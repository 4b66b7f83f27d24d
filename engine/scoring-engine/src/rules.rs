//! Scoring rule sets: linear per-unit values plus bucketed tables for
//! points allowed and field goal distance.

use crate::error::{Result, ScoringError};
use crate::models::POINTS_ALLOWED;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Rule key for points per reception, the only value that differs between presets
pub const RECEPTION: &str = "reception";

/// Name of the field goal distance bucket table
pub const FIELD_GOAL_DISTANCE: &str = "field_goal_distance";

/// Linear defaults shared by every preset (reception is set per preset)
const DEFAULT_LINEAR_RULES: &[(&str, f64)] = &[
    // Passing: 1 point per 25 yards
    ("pass_yd", 0.04),
    ("pass_td", 4.0),
    ("interception", -2.0),
    ("pass_2pt", 2.0),
    // Rushing: 1 point per 10 yards
    ("rush_yd", 0.1),
    ("rush_td", 6.0),
    ("rush_2pt", 2.0),
    ("fumble_lost", -2.0),
    // Receiving
    (RECEPTION, 0.0),
    ("rec_yd", 0.1),
    ("rec_td", 6.0),
    ("rec_2pt", 2.0),
    ("return_td", 6.0),
    // Kicking
    ("fg_made", 3.0),
    ("fg_miss", -1.0),
    ("xp_made", 1.0),
    // Defense / special teams
    ("def_td", 6.0),
    ("def_int", 2.0),
    ("def_fumble", 2.0),
    ("def_sack", 1.0),
    ("def_safety", 2.0),
    ("def_block_kick", 2.0),
    ("def_return_td", 6.0),
    ("def_xp_return", 2.0),
];

/// Projection category name to rule key
const STAT_RULE_KEYS: &[(&str, &str)] = &[
    ("passing_yards", "pass_yd"),
    ("passing_tds", "pass_td"),
    ("interceptions", "interception"),
    ("passing_2pt", "pass_2pt"),
    ("rushing_yards", "rush_yd"),
    ("rushing_tds", "rush_td"),
    ("rushing_2pt", "rush_2pt"),
    ("fumbles_lost", "fumble_lost"),
    ("receptions", RECEPTION),
    ("receiving_yards", "rec_yd"),
    ("receiving_tds", "rec_td"),
    ("receiving_2pt", "rec_2pt"),
    ("return_tds", "return_td"),
    ("field_goals", "fg_made"),
    ("field_goals_missed", "fg_miss"),
    ("extra_points", "xp_made"),
    ("def_touchdowns", "def_td"),
    ("def_interceptions", "def_int"),
    ("def_fumbles", "def_fumble"),
    ("def_sacks", "def_sack"),
    ("def_safeties", "def_safety"),
    ("def_blocked_kicks", "def_block_kick"),
    ("def_return_tds", "def_return_td"),
    ("def_xp_returns", "def_xp_return"),
];

/// Rules checked for presence by [`ScoringRules::validate`]
const REQUIRED_RULES: &[&str] =
    &["pass_yd", "pass_td", "rush_yd", "rush_td", RECEPTION, "rec_yd", "rec_td"];

const TOUCHDOWN_RULES: &[&str] = &["pass_td", "rush_td", "rec_td"];

/// Map a projection category to the rule key that scores it.
///
/// Categories without a known mapping are looked up under their own name, so a
/// custom rule set can score any category by naming it directly.
pub fn rule_key_for(category: &str) -> &str {
    STAT_RULE_KEYS
        .iter()
        .find(|(stat, _)| *stat == category)
        .map(|(_, rule)| *rule)
        .unwrap_or(category)
}

fn default_linear_value(rule: &str) -> Option<f64> {
    DEFAULT_LINEAR_RULES.iter().find(|(key, _)| *key == rule).map(|(_, value)| *value)
}

/// Built-in scoring systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPreset {
    #[default]
    Standard,
    Ppr,
    #[serde(alias = "half-ppr")]
    HalfPpr,
}

impl ScoringPreset {
    pub const ALL: [ScoringPreset; 3] =
        [ScoringPreset::Standard, ScoringPreset::Ppr, ScoringPreset::HalfPpr];

    pub fn name(&self) -> &'static str {
        match self {
            ScoringPreset::Standard => "standard",
            ScoringPreset::Ppr => "ppr",
            ScoringPreset::HalfPpr => "half_ppr",
        }
    }

    /// Points per reception
    pub fn reception_points(&self) -> f64 {
        match self {
            ScoringPreset::Standard => 0.0,
            ScoringPreset::Ppr => 1.0,
            ScoringPreset::HalfPpr => 0.5,
        }
    }
}

impl fmt::Display for ScoringPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoringPreset {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "std" => Ok(ScoringPreset::Standard),
            "ppr" | "full_ppr" => Ok(ScoringPreset::Ppr),
            "half_ppr" | "half-ppr" | "half" => Ok(ScoringPreset::HalfPpr),
            other => Err(ScoringError::UnknownPreset(other.to_string())),
        }
    }
}

/// One bucket of a tiered rule, covering `[lower, upper)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBucket {
    /// Rule key used for overrides and in score breakdowns
    pub key: String,
    pub lower: f64,
    /// `None` for the top bucket, which is unbounded above
    #[serde(default)]
    pub upper: Option<f64>,
    pub points: f64,
}

impl ScoreBucket {
    pub fn new(key: impl Into<String>, lower: f64, upper: Option<f64>, points: f64) -> Self {
        Self { key: key.into(), lower, upper, points }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && self.upper.map_or(true, |upper| value < upper)
    }
}

/// Ordered bucket list evaluated first-match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketTable(Vec<ScoreBucket>);

impl BucketTable {
    pub fn new(buckets: Vec<ScoreBucket>) -> Self {
        Self(buckets)
    }

    pub fn buckets(&self) -> &[ScoreBucket] {
        &self.0
    }

    /// Bucket containing `value`, if any
    pub fn lookup(&self, value: f64) -> Option<&ScoreBucket> {
        self.0.iter().find(|bucket| bucket.contains(value))
    }

    fn bucket_mut(&mut self, key: &str) -> Option<&mut ScoreBucket> {
        self.0.iter_mut().find(|bucket| bucket.key == key)
    }

    /// Check the table is sorted, contiguous and unbounded only at the top
    pub fn validate(&self, table: &str) -> Result<()> {
        let invalid =
            |reason: String| ScoringError::InvalidBuckets { table: table.to_string(), reason };

        if self.0.is_empty() {
            return Err(invalid("table has no buckets".to_string()));
        }

        for (index, bucket) in self.0.iter().enumerate() {
            if !bucket.lower.is_finite() || !bucket.points.is_finite() {
                return Err(invalid(format!("bucket '{}' has a non-finite value", bucket.key)));
            }

            match (bucket.upper, self.0.get(index + 1)) {
                (None, None) => {}
                (None, Some(_)) => {
                    return Err(invalid(format!(
                        "bucket '{}' is unbounded but is not the top bucket",
                        bucket.key
                    )));
                }
                (Some(_), None) => {
                    return Err(invalid(format!(
                        "top bucket '{}' must be unbounded above",
                        bucket.key
                    )));
                }
                (Some(upper), Some(next)) => {
                    if !(upper > bucket.lower) {
                        return Err(invalid(format!(
                            "bucket '{}' has upper bound {} not above lower bound {}",
                            bucket.key, upper, bucket.lower
                        )));
                    }
                    if next.lower != upper {
                        return Err(invalid(format!(
                            "bucket '{}' ends at {} but '{}' starts at {}",
                            bucket.key, upper, next.key, next.lower
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn default_points_allowed() -> Self {
        Self(vec![
            ScoreBucket::new("points_allowed_0", 0.0, Some(1.0), 10.0),
            ScoreBucket::new("points_allowed_1_6", 1.0, Some(7.0), 7.0),
            ScoreBucket::new("points_allowed_7_13", 7.0, Some(14.0), 4.0),
            ScoreBucket::new("points_allowed_14_20", 14.0, Some(21.0), 1.0),
            ScoreBucket::new("points_allowed_21_27", 21.0, Some(28.0), 0.0),
            ScoreBucket::new("points_allowed_28_34", 28.0, Some(35.0), -1.0),
            ScoreBucket::new("points_allowed_35_plus", 35.0, None, -4.0),
        ])
    }

    fn default_field_goal_distance() -> Self {
        Self(vec![
            ScoreBucket::new("fg_0_19", 0.0, Some(20.0), 3.0),
            ScoreBucket::new("fg_20_29", 20.0, Some(30.0), 3.0),
            ScoreBucket::new("fg_30_39", 30.0, Some(40.0), 3.0),
            ScoreBucket::new("fg_40_49", 40.0, Some(50.0), 4.0),
            ScoreBucket::new("fg_50_plus", 50.0, None, 5.0),
        ])
    }
}

/// A complete, resolved scoring rule set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringRules {
    pub name: String,

    /// Rule key to points per unit
    pub linear: BTreeMap<String, f64>,

    /// Defensive points-allowed buckets
    pub points_allowed: BucketTable,

    /// Field goal buckets by kick distance in yards
    pub field_goal_distance: BucketTable,
}

impl ScoringRules {
    pub fn preset(preset: ScoringPreset) -> Self {
        let mut linear: BTreeMap<String, f64> =
            DEFAULT_LINEAR_RULES.iter().map(|(key, value)| (key.to_string(), *value)).collect();
        linear.insert(RECEPTION.to_string(), preset.reception_points());

        Self {
            name: preset.name().to_string(),
            linear,
            points_allowed: BucketTable::default_points_allowed(),
            field_goal_distance: BucketTable::default_field_goal_distance(),
        }
    }

    pub fn standard() -> Self {
        Self::preset(ScoringPreset::Standard)
    }

    pub fn ppr() -> Self {
        Self::preset(ScoringPreset::Ppr)
    }

    pub fn half_ppr() -> Self {
        Self::preset(ScoringPreset::HalfPpr)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override any subset of rules.
    ///
    /// Keys naming a bucket (e.g. `points_allowed_0`, `fg_50_plus`) replace that
    /// bucket's points; every other key sets a linear per-unit value.
    pub fn with_overrides<I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        for (key, points) in overrides {
            let key = key.into();
            if let Some(bucket) = self.points_allowed.bucket_mut(&key) {
                bucket.points = points;
            } else if let Some(bucket) = self.field_goal_distance.bucket_mut(&key) {
                bucket.points = points;
            } else {
                self.linear.insert(key, points);
            }
        }
        self
    }

    /// Points per unit for a rule key, falling back to the standard defaults
    pub fn point_value(&self, rule: &str) -> Option<f64> {
        self.linear.get(rule).copied().or_else(|| default_linear_value(rule))
    }

    /// Advisory checks; never blocks scoring
    pub fn validate(&self) -> Vec<RuleWarning> {
        let mut warnings: Vec<RuleWarning> = REQUIRED_RULES
            .iter()
            .filter(|rule| !self.linear.contains_key(**rule))
            .map(|rule| RuleWarning::MissingRule(rule.to_string()))
            .collect();

        for rule in TOUCHDOWN_RULES {
            let value = self.point_value(rule).unwrap_or(0.0);
            if value < 1.0 {
                warnings.push(RuleWarning::LowTouchdownValue { rule: rule.to_string(), value });
            }
        }

        warnings
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// A user-supplied rule set layered over a preset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomScoringRules {
    #[serde(default)]
    pub name: String,

    /// Preset supplying every value not overridden here
    #[serde(default)]
    pub base: ScoringPreset,

    /// Linear or bucket-key overrides
    #[serde(default)]
    pub rules: BTreeMap<String, f64>,

    /// Replacement points-allowed table
    #[serde(default)]
    pub points_allowed: Option<Vec<ScoreBucket>>,

    /// Replacement field goal distance table
    #[serde(default)]
    pub field_goal_distance: Option<Vec<ScoreBucket>>,
}

impl CustomScoringRules {
    pub fn resolve(&self) -> Result<ScoringRules> {
        let name = if self.name.trim().is_empty() { "custom" } else { self.name.as_str() };
        let mut rules = ScoringRules::preset(self.base).with_name(name);

        if let Some(buckets) = &self.points_allowed {
            rules.points_allowed = BucketTable::new(buckets.clone());
        }
        if let Some(buckets) = &self.field_goal_distance {
            rules.field_goal_distance = BucketTable::new(buckets.clone());
        }

        let rules = rules.with_overrides(self.rules.iter().map(|(key, value)| (key.clone(), *value)));
        rules.points_allowed.validate(POINTS_ALLOWED)?;
        rules.field_goal_distance.validate(FIELD_GOAL_DISTANCE)?;

        debug!(
            "Resolved custom scoring rules '{}' over {} with {} overrides",
            rules.name,
            self.base,
            self.rules.len()
        );

        Ok(rules)
    }
}

/// Advisory finding about a rule set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RuleWarning {
    MissingRule(String),
    LowTouchdownValue { rule: String, value: f64 },
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleWarning::MissingRule(rule) => write!(f, "Missing scoring rule: {rule}"),
            RuleWarning::LowTouchdownValue { rule, value } => {
                write!(f, "Touchdown value for {rule} seems low ({value} < 1)")
            }
        }
    }
}
