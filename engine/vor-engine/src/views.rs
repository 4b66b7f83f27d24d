//! Derived views over a ranked pool: draft targets, value tiers and player
//! comparison. None of these re-rank; they only slice and regroup.

use crate::engine::RankedPool;
use crate::error::{Result, ValidationError};
use crate::models::{ValueTier, VorResult};
use scoring_engine::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Overall pick number in a snake draft.
///
/// Odd rounds pick in draft order; even rounds reverse it. `None` when the
/// round or draft position is zero, the draft position exceeds the team
/// count, or the pick number does not fit in a `u32`.
pub fn snake_pick_number(round: u32, draft_position: u32, team_count: u32) -> Option<u32> {
    if round == 0 || draft_position == 0 || draft_position > team_count {
        return None;
    }
    let position_in_round =
        if round % 2 == 1 { draft_position } else { team_count - draft_position + 1 };
    (round - 1).checked_mul(team_count)?.checked_add(position_in_round)
}

/// A pick slot in a snake draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    pub round: u32,
    pub draft_position: u32,
    pub overall_pick: u32,
}

/// Parameters for a draft target lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTargetQuery {
    pub round: u32,
    pub draft_position: u32,

    /// Maximum players in the overall target list
    pub limit: usize,

    /// Maximum players per position in the grouped lists
    pub per_position_limit: usize,

    /// Picks before the current one whose players are still considered
    pub lookback: u32,
}

impl DraftTargetQuery {
    pub fn new(round: u32, draft_position: u32) -> Self {
        Self { round, draft_position, limit: 10, per_position_limit: 5, lookback: 5 }
    }
}

/// Most valuable players at a draft slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTargets {
    pub pick: DraftPick,
    pub top_targets: Vec<VorResult>,
    pub targets_by_position: BTreeMap<Position, Vec<VorResult>>,
}

/// Full pool partitioned into the five value tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTiers {
    /// Every tier is present, possibly empty, in best-first order
    pub tiers: BTreeMap<ValueTier, Vec<VorResult>>,
}

impl ValueTiers {
    pub fn get(&self, tier: ValueTier) -> &[VorResult] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn counts(&self) -> BTreeMap<ValueTier, usize> {
        self.tiers.iter().map(|(tier, players)| (*tier, players.len())).collect()
    }
}

/// Gap between the best value in a comparison and another player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VorGap {
    pub player_id: u32,
    pub name: String,
    pub vor_difference: f64,
    pub raw_vor_difference: f64,
    pub points_difference: f64,
}

/// Side-by-side VOR for a chosen set of players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerComparison {
    /// Results in the order requested
    pub players: Vec<VorResult>,

    /// Highest VOR in the set, first requested wins ties
    pub best_value: VorResult,

    pub gaps: Vec<VorGap>,
}

impl RankedPool {
    /// Validate a draft slot against the league and compute its pick number
    pub fn draft_pick(&self, round: u32, draft_position: u32) -> Result<DraftPick> {
        let invalid_round = ValidationError::InvalidRound { round, max_rounds: self.draft_rounds };
        if round == 0 || round > self.draft_rounds {
            return Err(invalid_round.into());
        }
        if draft_position == 0 || draft_position > self.team_count {
            return Err(ValidationError::InvalidDraftPosition {
                draft_position,
                team_count: self.team_count,
            }
            .into());
        }

        let overall_pick =
            snake_pick_number(round, draft_position, self.team_count).ok_or(invalid_round)?;
        Ok(DraftPick { round, draft_position, overall_pick })
    }

    /// Top players by VOR still above replacement at a draft slot.
    ///
    /// Assumes the pool is drafted in VOR order, so players ranked well ahead
    /// of the pick (beyond `lookback`) are treated as gone. This is a static
    /// slice of the ranking, not a simulation of other drafters.
    pub fn draft_targets(&self, query: &DraftTargetQuery) -> Result<DraftTargets> {
        let pick = self.draft_pick(query.round, query.draft_position)?;
        let first_rank = pick.overall_pick.saturating_sub(query.lookback).max(1) as usize;

        let candidates: Vec<&VorResult> = self
            .results
            .iter()
            .filter(|result| result.overall_rank >= first_rank && result.vor > 0.0)
            .collect();

        let top_targets = candidates.iter().take(query.limit).map(|r| (*r).clone()).collect();

        let mut targets_by_position: BTreeMap<Position, Vec<VorResult>> = BTreeMap::new();
        for result in &candidates {
            let players = targets_by_position.entry(result.player.position).or_default();
            if players.len() < query.per_position_limit {
                players.push((*result).clone());
            }
        }

        debug!(
            "Draft targets for round {} pick {} (overall {}): {} candidates from rank {}",
            pick.round,
            pick.draft_position,
            pick.overall_pick,
            candidates.len(),
            first_rank
        );

        Ok(DraftTargets { pick, top_targets, targets_by_position })
    }

    /// Regroup the ranking by value tier
    pub fn value_tiers(&self) -> ValueTiers {
        let mut tiers: BTreeMap<ValueTier, Vec<VorResult>> =
            ValueTier::ALL.iter().map(|tier| (*tier, Vec::new())).collect();
        for result in &self.results {
            tiers.entry(result.tier).or_default().push(result.clone());
        }
        ValueTiers { tiers }
    }

    /// Compare players side by side and pick the best value
    pub fn compare_players(&self, player_ids: &[u32]) -> Result<PlayerComparison> {
        let mut players: Vec<VorResult> = Vec::with_capacity(player_ids.len());
        for id in player_ids {
            if players.iter().any(|result| result.player.id == *id) {
                continue;
            }
            let result = self.get(*id).ok_or(ValidationError::UnknownPlayer(*id))?;
            players.push(result.clone());
        }

        let best_value = players
            .iter()
            .fold(None::<&VorResult>, |best, result| match best {
                Some(best) if best.vor >= result.vor => Some(best),
                _ => Some(result),
            })
            .cloned()
            .ok_or(ValidationError::EmptyComparison)?;

        let gaps = players
            .iter()
            .filter(|result| result.player.id != best_value.player.id)
            .map(|result| VorGap {
                player_id: result.player.id,
                name: result.player.name.clone(),
                vor_difference: best_value.vor - result.vor,
                raw_vor_difference: best_value.raw_vor - result.raw_vor,
                points_difference: best_value.fantasy_points - result.fantasy_points,
            })
            .collect();

        Ok(PlayerComparison { players, best_value, gaps })
    }
}
