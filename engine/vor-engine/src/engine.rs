use crate::config::LeagueConfig;
use crate::error::Result;
use crate::models::{PoolEntry, ReplacementLevel, ValueTier, VorResult};
use scoring_engine::Position;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// VOR Engine - ranks a player pool against one league configuration
///
/// Holds only the validated configuration; every call to [`VorEngine::rank`]
/// is independent.
#[derive(Debug, Clone)]
pub struct VorEngine {
    config: LeagueConfig,
}

impl VorEngine {
    /// Create an engine, rejecting internally inconsistent configurations
    pub fn new(config: LeagueConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Created VOR engine for '{}' ({} teams, {} positions, {} flex slots)",
            config.name,
            config.team_count,
            config.positions.len(),
            config.flex_slots.len()
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    /// Rank a pool of scored players.
    ///
    /// Position ranks sort by fantasy points and overall ranks by VOR, both
    /// descending with ties kept in input order. NaN points or VOR rank after
    /// every number and never set a replacement level. Fails if any position
    /// in the pool has no starter count configured.
    pub fn rank(&self, pool: &[PoolEntry]) -> Result<RankedPool> {
        let mut ranked = RankedPool::empty(&self.config);
        if pool.is_empty() {
            info!("Empty player pool for '{}', nothing to rank", self.config.name);
            return Ok(ranked);
        }

        let mut by_position: BTreeMap<Position, Vec<usize>> = BTreeMap::new();
        for (index, entry) in pool.iter().enumerate() {
            by_position.entry(entry.player.position).or_default().push(index);
        }

        // Every position must resolve before any VOR is computed
        for position in by_position.keys() {
            self.config.settings(*position)?;
        }

        let mut position_ranks = vec![0usize; pool.len()];
        for (position, indices) in by_position.iter_mut() {
            indices.sort_by(|&a, &b| descending(pool[a].fantasy_points, pool[b].fantasy_points));
            for (rank, &index) in indices.iter().enumerate() {
                position_ranks[index] = rank + 1;
            }

            let level = self.replacement_level(*position, indices, pool)?;
            ranked.replacement_levels.insert(*position, level);
        }

        let mut results: Vec<VorResult> = Vec::with_capacity(pool.len());
        for (index, entry) in pool.iter().enumerate() {
            let position = entry.player.position;
            let replacement_level = ranked.replacement_levels[&position].points;
            let scarcity_multiplier = self.config.scarcity_multiplier(position)?;
            let raw_vor = entry.fantasy_points - replacement_level;
            let vor = raw_vor * scarcity_multiplier;

            results.push(VorResult {
                player: entry.player.clone(),
                fantasy_points: entry.fantasy_points,
                replacement_level,
                raw_vor,
                scarcity_multiplier,
                vor,
                position_rank: position_ranks[index],
                overall_rank: 0,
                tier: ValueTier::from_vor(vor),
            });
        }

        // Stable sort keeps input order among equal VOR
        results.sort_by(|a, b| descending(a.vor, b.vor));
        for (rank, result) in results.iter_mut().enumerate() {
            result.overall_rank = rank + 1;
        }
        ranked.results = results;

        info!(
            "Ranked {} players across {} positions for '{}'",
            ranked.results.len(),
            ranked.replacement_levels.len(),
            self.config.name
        );

        Ok(ranked)
    }

    /// Replacement level from a position's indices sorted best first
    fn replacement_level(
        &self,
        position: Position,
        sorted: &[usize],
        pool: &[PoolEntry],
    ) -> Result<ReplacementLevel> {
        let replacement_rank = self.config.replacement_rank(position)?;
        // NaN entries sort last; only players with real points are candidates
        let scored = sorted
            .iter()
            .take_while(|&&index| !pool[index].fantasy_points.is_nan())
            .count()
            .max(1);
        let thin_pool = scored < replacement_rank;
        let index = if thin_pool { scored - 1 } else { replacement_rank - 1 };
        let points = pool[sorted[index]].fantasy_points;

        if thin_pool {
            warn!(
                "Only {} {} players for replacement rank {}, using lowest available ({:.1} pts)",
                scored,
                position,
                replacement_rank,
                points
            );
        } else {
            debug!(
                "{} replacement level: rank {} at {:.1} pts ({})",
                position, replacement_rank, points, pool[sorted[index]].player.name
            );
        }

        Ok(ReplacementLevel {
            position,
            replacement_rank,
            pool_size: sorted.len(),
            points,
            thin_pool,
        })
    }
}

/// Descending order with NaN after every number
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}

/// Ranked output of one VOR run
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPool {
    pub(crate) results: Vec<VorResult>,
    pub(crate) replacement_levels: BTreeMap<Position, ReplacementLevel>,
    pub(crate) team_count: u32,
    pub(crate) draft_rounds: u32,
}

impl RankedPool {
    fn empty(config: &LeagueConfig) -> Self {
        Self {
            results: Vec::new(),
            replacement_levels: BTreeMap::new(),
            team_count: config.team_count,
            draft_rounds: config.draft_rounds(),
        }
    }

    /// Results in overall rank order
    pub fn results(&self) -> &[VorResult] {
        &self.results
    }

    pub fn replacement_levels(&self) -> &BTreeMap<Position, ReplacementLevel> {
        &self.replacement_levels
    }

    pub fn team_count(&self) -> u32 {
        self.team_count
    }

    pub fn draft_rounds(&self) -> u32 {
        self.draft_rounds
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Look up a player's result by ID
    pub fn get(&self, player_id: u32) -> Option<&VorResult> {
        self.results.iter().find(|result| result.player.id == player_id)
    }

    /// Players at one position in position rank order
    pub fn position_rankings(&self, position: Position, limit: Option<usize>) -> Vec<&VorResult> {
        let mut players: Vec<&VorResult> =
            self.results.iter().filter(|result| result.player.position == position).collect();
        players.sort_by_key(|result| result.position_rank);
        if let Some(limit) = limit {
            players.truncate(limit);
        }
        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PositionSettings;
    use crate::error::{ConfigurationError, VorError};
    use scoring_engine::Player;

    fn entry(id: u32, position: Position, points: f64) -> PoolEntry {
        PoolEntry::new(Player::new(id, format!("Player {id}"), position, "FA"), points)
    }

    fn two_team_config() -> LeagueConfig {
        LeagueConfig {
            name: "test".to_string(),
            team_count: 2,
            positions: [
                (Position::QB, PositionSettings::new(1, 0)),
                (Position::RB, PositionSettings::new(1, 1)),
            ]
            .into_iter()
            .collect(),
            flex_slots: Vec::new(),
            bench_slots: 0,
        }
    }

    #[test]
    fn test_replacement_level_at_exact_rank() {
        let engine = VorEngine::new(two_team_config()).unwrap();
        let pool = vec![
            entry(1, Position::QB, 300.0),
            entry(2, Position::QB, 250.0),
            entry(3, Position::QB, 200.0),
            entry(4, Position::RB, 220.0),
            entry(5, Position::RB, 180.0),
            entry(6, Position::RB, 150.0),
            entry(7, Position::RB, 90.0),
        ];

        let ranked = engine.rank(&pool).unwrap();
        let qb = &ranked.replacement_levels()[&Position::QB];
        assert_eq!(qb.replacement_rank, 2);
        assert_eq!(qb.points, 250.0);
        assert!(!qb.thin_pool);

        let rb = &ranked.replacement_levels()[&Position::RB];
        assert_eq!(rb.replacement_rank, 3);
        assert_eq!(rb.points, 150.0);

        assert_eq!(ranked.get(1).unwrap().vor, 50.0);
        assert_eq!(ranked.get(4).unwrap().vor, 70.0);
        assert_eq!(ranked.get(7).unwrap().vor, -60.0);
        assert_eq!(ranked.get(4).unwrap().overall_rank, 1);
    }

    #[test]
    fn test_thin_pool_uses_lowest_player() {
        let engine = VorEngine::new(two_team_config()).unwrap();
        let pool = vec![entry(1, Position::RB, 200.0), entry(2, Position::RB, 120.0)];

        let ranked = engine.rank(&pool).unwrap();
        let rb = &ranked.replacement_levels()[&Position::RB];
        assert!(rb.thin_pool);
        assert_eq!(rb.pool_size, 2);
        assert_eq!(rb.points, 120.0);
        assert_eq!(ranked.get(2).unwrap().vor, 0.0);
    }

    #[test]
    fn test_missing_position_is_configuration_error() {
        let engine = VorEngine::new(two_team_config()).unwrap();
        let pool = vec![entry(1, Position::QB, 300.0), entry(2, Position::TE, 150.0)];

        assert_eq!(
            engine.rank(&pool),
            Err(VorError::Configuration(ConfigurationError::MissingPosition(Position::TE)))
        );
    }

    #[test]
    fn test_empty_pool_is_not_an_error() {
        let engine = VorEngine::new(two_team_config()).unwrap();
        let ranked = engine.rank(&[]).unwrap();

        assert!(ranked.is_empty());
        assert!(ranked.replacement_levels().is_empty());
        assert_eq!(ranked.team_count(), 2);
    }

    #[test]
    fn test_nan_points_rank_last_and_skip_replacement() {
        let engine = VorEngine::new(two_team_config()).unwrap();
        let pool = vec![
            entry(1, Position::RB, 200.0),
            entry(2, Position::RB, f64::NAN),
            entry(3, Position::RB, 150.0),
            entry(4, Position::QB, 300.0),
        ];

        let ranked = engine.rank(&pool).unwrap();
        let rb = &ranked.replacement_levels()[&Position::RB];
        assert!(rb.thin_pool);
        assert_eq!(rb.pool_size, 3);
        assert_eq!(rb.points, 150.0);

        let malformed = ranked.get(2).unwrap();
        assert_eq!(malformed.position_rank, 3);
        assert_eq!(malformed.overall_rank, 4);
        assert_eq!(malformed.tier, ValueTier::BelowReplacement);
        assert_eq!(ranked.get(1).unwrap().vor, 50.0);
        assert_eq!(ranked.get(3).unwrap().position_rank, 2);
    }

    #[test]
    fn test_descending_orders_nan_last() {
        let mut values = vec![1.0, f64::NAN, 3.0, -2.0, f64::NAN];
        values.sort_by(|a, b| descending(*a, *b));

        assert_eq!(&values[..3], &[3.0, 1.0, -2.0]);
        assert!(values[3..].iter().all(|value| value.is_nan()));
    }

    #[test]
    fn test_position_rankings_view() {
        let engine = VorEngine::new(two_team_config()).unwrap();
        let pool = vec![
            entry(1, Position::RB, 100.0),
            entry(2, Position::QB, 300.0),
            entry(3, Position::RB, 140.0),
            entry(4, Position::RB, 120.0),
        ];

        let ranked = engine.rank(&pool).unwrap();
        let rbs: Vec<u32> =
            ranked.position_rankings(Position::RB, None).iter().map(|r| r.player.id).collect();
        assert_eq!(rbs, vec![3, 4, 1]);

        let top: Vec<u32> =
            ranked.position_rankings(Position::RB, Some(2)).iter().map(|r| r.player.id).collect();
        assert_eq!(top, vec![3, 4]);
    }
}
