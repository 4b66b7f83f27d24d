//! Scoring Engine
//!
//! Converts a player's statistical projection into a fantasy point total for a
//! given set of scoring rules. Scoring is a pure function: the same projection
//! and rules always produce the same points and breakdown.

pub mod calculator;
pub mod error;
pub mod models;
pub mod rules;

pub use calculator::{calculate, compare, compare_presets, ScoringCalculator};
pub use error::{Result, ScoringError};
pub use models::*;
pub use rules::{
    rule_key_for, BucketTable, CustomScoringRules, RuleWarning, ScoreBucket, ScoringPreset,
    ScoringRules,
};

/// Score one projection under one rule set
pub fn score(projection: &PlayerProjection, rules: &ScoringRules) -> FantasyPoints {
    calculate(projection, rules)
}
