use crate::models::*;
use crate::rules::{rule_key_for, BucketTable, ScoringPreset, ScoringRules};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Fantasy point calculator bound to one rule set
#[derive(Debug, Clone)]
pub struct ScoringCalculator {
    rules: ScoringRules,
}

impl ScoringCalculator {
    /// Create a new calculator for a rule set
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Score a single projection
    pub fn calculate(&self, projection: &PlayerProjection) -> FantasyPoints {
        calculate(projection, &self.rules)
    }

    /// Score a batch of projections in parallel, preserving input order
    pub fn calculate_all(&self, projections: &[PlayerProjection]) -> Vec<FantasyPoints> {
        let scored: Vec<FantasyPoints> =
            projections.par_iter().map(|projection| calculate(projection, &self.rules)).collect();

        let unscored = scored.iter().filter(|points| points.unscored_categories().next().is_some());
        info!(
            "Scored {} projections under '{}' ({} with unscored categories)",
            scored.len(),
            self.rules.name,
            unscored.count()
        );

        scored
    }
}

/// Convert one projection into fantasy points under `rules`.
///
/// Linear categories are skipped when zero. Points allowed is bucketed and is
/// scored whenever present, since zero points allowed is a shutout. When the
/// projection carries `field_goals_by_distance` it replaces the flat
/// `field_goals` count.
pub fn calculate(projection: &PlayerProjection, rules: &ScoringRules) -> FantasyPoints {
    let mut breakdown = BTreeMap::new();
    let by_distance = !projection.field_goals_by_distance.is_empty();

    for (category, &value) in &projection.stats {
        if category == POINTS_ALLOWED {
            breakdown.insert(category.clone(), bucketed(value, 1.0, &rules.points_allowed));
            continue;
        }
        if value == 0.0 || (by_distance && category == FIELD_GOALS) {
            continue;
        }

        let rule = rule_key_for(category);
        let score = match rules.point_value(rule) {
            Some(points_per_unit) => CategoryScore {
                stat_value: value,
                points: value * points_per_unit,
                basis: ScoringBasis::Linear { rule: rule.to_string(), points_per_unit },
            },
            None => {
                debug!(
                    "No scoring rule for '{}' (player {}), contributing zero",
                    category, projection.player.id
                );
                CategoryScore { stat_value: value, points: 0.0, basis: ScoringBasis::Unscored }
            }
        };
        breakdown.insert(category.clone(), score);
    }

    for (&distance, &made) in &projection.field_goals_by_distance {
        if made == 0.0 {
            continue;
        }
        let mut score = bucketed(distance as f64, made, &rules.field_goal_distance);
        score.stat_value = made;
        breakdown.insert(format!("{FIELD_GOALS}_{distance}yd"), score);
    }

    let raw_total: f64 = breakdown.values().map(|score: &CategoryScore| score.points).sum();

    FantasyPoints {
        player: projection.player.clone(),
        rules: rules.name.clone(),
        total: round_to_tenth(raw_total),
        breakdown,
    }
}

/// Score `value` against a bucket table, multiplying the bucket's points by `count`
fn bucketed(value: f64, count: f64, table: &BucketTable) -> CategoryScore {
    match table.lookup(value) {
        Some(bucket) => CategoryScore {
            stat_value: value,
            points: count * bucket.points,
            basis: ScoringBasis::Bucketed {
                rule: bucket.key.clone(),
                lower: bucket.lower,
                upper: bucket.upper,
                bucket_points: bucket.points,
            },
        },
        None => {
            warn!("Value {} falls outside every bucket, contributing zero", value);
            CategoryScore { stat_value: value, points: 0.0, basis: ScoringBasis::Unscored }
        }
    }
}

/// Score one projection under several rule sets, keyed by rule set name
pub fn compare(
    projection: &PlayerProjection,
    rule_sets: &[ScoringRules],
) -> BTreeMap<String, FantasyPoints> {
    rule_sets
        .par_iter()
        .map(|rules| (rules.name.clone(), calculate(projection, rules)))
        .collect()
}

/// Score one projection under every built-in preset
pub fn compare_presets(projection: &PlayerProjection) -> BTreeMap<String, FantasyPoints> {
    let presets: Vec<ScoringRules> =
        ScoringPreset::ALL.iter().map(|preset| ScoringRules::preset(*preset)).collect();
    compare(projection, &presets)
}

fn round_to_tenth(points: f64) -> f64 {
    (points * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn quarterback() -> PlayerProjection {
        PlayerProjection::new(Player::new(1, "Josh Allen", Position::QB, "BUF"))
            .with_stat("passing_yards", 4500.0)
            .with_stat("passing_tds", 35.0)
            .with_stat("interceptions", 12.0)
            .with_stat("rushing_yards", 500.0)
            .with_stat("rushing_tds", 6.0)
    }

    fn receiver(receptions: f64) -> PlayerProjection {
        PlayerProjection::new(Player::new(2, "Ja'Marr Chase", Position::WR, "CIN"))
            .with_stat("receptions", receptions)
            .with_stat("receiving_yards", 1400.0)
            .with_stat("receiving_tds", 11.0)
    }

    #[test]
    fn test_quarterback_standard_scenario() {
        let points = calculate(&quarterback(), &ScoringRules::standard());

        assert_eq!(points.total, 382.0);
        assert_eq!(points.rules, "standard");
        assert!(approx(points.points_for("passing_yards"), 180.0));
        assert!(approx(points.points_for("passing_tds"), 140.0));
        assert!(approx(points.points_for("interceptions"), -24.0));
        assert!(approx(points.points_for("rushing_yards"), 50.0));
        assert!(approx(points.points_for("rushing_tds"), 36.0));
        assert_eq!(points.breakdown.len(), 5);
    }

    #[test]
    fn test_breakdown_records_rule_and_rate() {
        let points = calculate(&quarterback(), &ScoringRules::standard());

        match &points.breakdown["interceptions"].basis {
            ScoringBasis::Linear { rule, points_per_unit } => {
                assert_eq!(rule, "interception");
                assert_eq!(*points_per_unit, -2.0);
            }
            other => panic!("Expected linear basis, got {other:?}"),
        }
        assert_eq!(points.breakdown["interceptions"].stat_value, 12.0);
    }

    #[test]
    fn test_reception_value_by_preset() {
        let wr = receiver(100.0);
        let standard = calculate(&wr, &ScoringRules::standard());
        let half = calculate(&wr, &ScoringRules::half_ppr());
        let ppr = calculate(&wr, &ScoringRules::ppr());

        assert_eq!(standard.total, 206.0);
        assert_eq!(half.total, 256.0);
        assert_eq!(ppr.total, 306.0);
        assert_eq!(standard.points_for("receptions"), 0.0);
    }

    #[test]
    fn test_unknown_category_is_flagged_not_fatal() {
        let projection = quarterback().with_stat("first_downs", 120.0);
        let points = calculate(&projection, &ScoringRules::standard());

        assert_eq!(points.total, 382.0);
        assert_eq!(points.unscored_categories().collect::<Vec<_>>(), vec!["first_downs"]);
        assert_eq!(points.breakdown["first_downs"].stat_value, 120.0);
        assert_eq!(points.breakdown["first_downs"].points, 0.0);
    }

    #[test]
    fn test_custom_rule_scores_named_category() {
        let projection = quarterback().with_stat("first_downs", 120.0);
        let rules = ScoringRules::standard().with_overrides([("first_downs", 0.5)]);
        let points = calculate(&projection, &rules);

        assert_eq!(points.total, 442.0);
        assert_eq!(points.unscored_categories().count(), 0);
    }

    #[test]
    fn test_zero_and_negative_values() {
        let projection = PlayerProjection::new(Player::new(3, "Backup", Position::RB, "NYJ"))
            .with_stat("rushing_yards", 0.0)
            .with_stat("fumbles_lost", -1.0);
        let points = calculate(&projection, &ScoringRules::standard());

        // Zero linear categories are omitted, negatives are taken as-is
        assert!(!points.breakdown.contains_key("rushing_yards"));
        assert_eq!(points.points_for("fumbles_lost"), 2.0);
        assert_eq!(points.total, 2.0);
    }

    #[test]
    fn test_points_allowed_buckets() {
        let defense = |allowed: f64| {
            PlayerProjection::new(Player::new(4, "Ravens", Position::DST, "BAL"))
                .with_stat("def_sacks", 3.0)
                .with_stat(POINTS_ALLOWED, allowed)
        };
        let rules = ScoringRules::standard();

        assert_eq!(calculate(&defense(0.0), &rules).total, 13.0);
        assert_eq!(calculate(&defense(6.0), &rules).total, 10.0);
        assert_eq!(calculate(&defense(7.0), &rules).total, 7.0);
        assert_eq!(calculate(&defense(20.9), &rules).total, 4.0);
        assert_eq!(calculate(&defense(21.0), &rules).total, 3.0);
        assert_eq!(calculate(&defense(35.0), &rules).total, -1.0);

        let points = calculate(&defense(17.5), &rules);
        match &points.breakdown[POINTS_ALLOWED].basis {
            ScoringBasis::Bucketed { rule, lower, upper, bucket_points } => {
                assert_eq!(rule, "points_allowed_14_20");
                assert_eq!(*lower, 14.0);
                assert_eq!(*upper, Some(21.0));
                assert_eq!(*bucket_points, 1.0);
            }
            other => panic!("Expected bucketed basis, got {other:?}"),
        }
    }

    #[test]
    fn test_points_allowed_below_every_bucket_is_unscored() {
        let projection = PlayerProjection::new(Player::new(5, "Bears", Position::DST, "CHI"))
            .with_stat(POINTS_ALLOWED, -2.0);
        let points = calculate(&projection, &ScoringRules::standard());

        assert_eq!(points.total, 0.0);
        assert_eq!(points.unscored_categories().collect::<Vec<_>>(), vec![POINTS_ALLOWED]);
    }

    #[test]
    fn test_field_goals_by_distance_replace_flat_count() {
        let kicker = PlayerProjection::new(Player::new(6, "Justin Tucker", Position::K, "BAL"))
            .with_stat(FIELD_GOALS, 30.0)
            .with_stat("extra_points", 40.0)
            .with_field_goals_at(19, 2.0)
            .with_field_goals_at(35, 10.0)
            .with_field_goals_at(49, 8.0)
            .with_field_goals_at(50, 4.0);
        let points = calculate(&kicker, &ScoringRules::standard());

        // 2*3 + 10*3 + 8*4 + 4*5 + 40
        assert_eq!(points.total, 128.0);
        assert!(!points.breakdown.contains_key(FIELD_GOALS));
        assert_eq!(points.points_for("field_goals_50yd"), 20.0);
        assert_eq!(points.breakdown["field_goals_49yd"].stat_value, 8.0);
    }

    #[test]
    fn test_flat_field_goals_without_distance() {
        let kicker = PlayerProjection::new(Player::new(7, "Harrison Butker", Position::K, "KC"))
            .with_stat(FIELD_GOALS, 30.0)
            .with_stat("field_goals_missed", 4.0)
            .with_stat("extra_points", 45.0);
        let points = calculate(&kicker, &ScoringRules::standard());

        assert_eq!(points.total, 131.0);
    }

    #[test]
    fn test_total_rounds_to_one_decimal_breakdown_keeps_precision() {
        let projection = PlayerProjection::new(Player::new(8, "Tight End", Position::TE, "DET"))
            .with_stat("receptions", 3.0)
            .with_stat("receiving_yards", 33.0);
        let points = calculate(&projection, &ScoringRules::half_ppr());

        assert!(approx(points.raw_total(), 4.8));
        assert_eq!(points.total, 4.8);

        let projection = projection.with_stat("passing_yards", 1.0);
        let points = calculate(&projection, &ScoringRules::half_ppr());
        assert!(approx(points.points_for("passing_yards"), 0.04));
        assert!(approx(points.raw_total(), 4.84));
        assert_eq!(points.total, 4.8);
    }

    #[test]
    fn test_compare_presets() {
        let comparison = compare_presets(&receiver(90.0));

        assert_eq!(comparison.len(), 3);
        assert_eq!(comparison["standard"].total, 206.0);
        assert_eq!(comparison["half_ppr"].total, 251.0);
        assert_eq!(comparison["ppr"].total, 296.0);
    }

    #[test]
    fn test_compare_matches_calculate() {
        let custom = ScoringRules::standard().with_name("six_pt_pass").with_overrides([("pass_td", 6.0)]);
        let rule_sets = vec![ScoringRules::standard(), custom.clone()];
        let comparison = compare(&quarterback(), &rule_sets);

        assert_eq!(comparison["standard"], calculate(&quarterback(), &ScoringRules::standard()));
        assert_eq!(comparison["six_pt_pass"], calculate(&quarterback(), &custom));
        assert_eq!(comparison["six_pt_pass"].total, 452.0);
    }

    #[test]
    fn test_calculate_all_preserves_order() {
        let calculator = ScoringCalculator::new(ScoringRules::ppr());
        let projections = vec![receiver(80.0), quarterback(), receiver(120.0)];
        let scored = calculator.calculate_all(&projections);

        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].total, 286.0);
        assert_eq!(scored[1].player.name, "Josh Allen");
        assert_eq!(scored[2].total, 326.0);
        assert_eq!(calculator.rules().name, "ppr");
    }

    fn arb_stat_line() -> impl Strategy<Value = Vec<(&'static str, f64)>> {
        let categories = prop::sample::subsequence(
            vec![
                "passing_yards",
                "passing_tds",
                "interceptions",
                "rushing_yards",
                "rushing_tds",
                "receiving_yards",
                "receiving_tds",
                "fumbles_lost",
                "first_downs",
            ],
            0..9,
        );
        categories.prop_flat_map(|names| {
            let len = names.len();
            (Just(names), prop::collection::vec(0.0f64..2000.0, len))
                .prop_map(|(names, values)| names.into_iter().zip(values).collect())
        })
    }

    proptest! {
        #[test]
        fn prop_scoring_is_deterministic(stats in arb_stat_line(), receptions in 0.0f64..150.0) {
            let mut projection = receiver(receptions);
            for (category, value) in stats {
                projection = projection.with_stat(category, value);
            }
            let rules = ScoringRules::half_ppr();

            let first = calculate(&projection, &rules);
            let second = calculate(&projection, &rules);
            prop_assert_eq!(first.total.to_bits(), second.total.to_bits());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_ppr_ordering(stats in arb_stat_line(), receptions in 1u32..150) {
            let mut projection = PlayerProjection::new(Player::new(9, "Flex", Position::RB, "SF"))
                .with_stat("receptions", receptions as f64);
            for (category, value) in stats {
                projection = projection.with_stat(category, value);
            }

            let ppr = calculate(&projection, &ScoringRules::ppr()).total;
            let half = calculate(&projection, &ScoringRules::half_ppr()).total;
            let standard = calculate(&projection, &ScoringRules::standard()).total;
            prop_assert!(ppr > half);
            prop_assert!(half > standard);
        }

        #[test]
        fn prop_no_receptions_means_equal_presets(stats in arb_stat_line()) {
            let mut projection = PlayerProjection::new(Player::new(10, "Runner", Position::RB, "ATL"));
            for (category, value) in stats {
                projection = projection.with_stat(category, value);
            }

            let ppr = calculate(&projection, &ScoringRules::ppr()).total;
            let half = calculate(&projection, &ScoringRules::half_ppr()).total;
            let standard = calculate(&projection, &ScoringRules::standard()).total;
            prop_assert_eq!(ppr, half);
            prop_assert_eq!(half, standard);
        }
    }
}
