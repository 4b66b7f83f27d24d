//! # Command Line Interface
//!
//! Scores a projection file and prints rankings, tiers and draft targets.

use crate::projections::ProjectionFile;
use crate::settings::BoardSettings;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use scoring_engine::{compare_presets, FantasyPoints, Position, ScoringCalculator, ScoringRules};
use serde::Serialize;
use std::path::PathBuf;
use vor_engine::{
    DraftTargetQuery, LeagueConfig, PoolEntry, RankedPool, ValueTier, VorResult,
};

/// Draft board CLI
#[derive(Parser, Debug)]
#[command(name = "draft-board")]
#[command(about = "Fantasy football draft board - scoring, VOR rankings and draft targets")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Projection file (JSON)
    #[arg(short, long, default_value = "./projections.json")]
    pub projections: PathBuf,

    /// Settings file (TOML)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Scoring preset, overrides settings
    #[arg(long)]
    pub scoring: Option<String>,

    /// League preset, overrides settings
    #[arg(long)]
    pub league: Option<String>,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Show fantasy points for every player or one player
    Score {
        /// Player ID
        #[arg(long)]
        player: Option<u32>,

        /// Include the per-category breakdown
        #[arg(long)]
        breakdown: bool,
    },
    /// Score one player under every built-in preset
    CompareScoring {
        /// Player ID
        player: u32,
    },
    /// Show the VOR ranking
    Rank {
        /// Restrict to one position
        #[arg(long)]
        position: Option<String>,

        /// Maximum rows
        #[arg(long, default_value = "25")]
        limit: usize,
    },
    /// Show replacement levels per position
    Replacement,
    /// Show players grouped by value tier
    Tiers,
    /// Show the best available players at a draft slot
    Targets {
        /// Draft round (1-based)
        #[arg(long)]
        round: u32,

        /// Draft position within the round (1-based)
        #[arg(long)]
        pick: u32,

        /// Maximum players in the overall list
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Picks before this one whose players are still considered
        #[arg(long, default_value = "5")]
        lookback: u32,
    },
    /// Compare players side by side
    Compare {
        /// Comma-separated player IDs
        #[arg(value_delimiter = ',', required = true)]
        players: Vec<u32>,
    },
    /// Show the resolved scoring rules and any warnings
    Rules,
}

/// CLI handler
pub struct CliHandler {
    projections: ProjectionFile,
    rules: ScoringRules,
    league: LeagueConfig,
    json: bool,
}

impl CliHandler {
    /// Load settings and projections for a parsed command line
    pub async fn new(cli: &Cli) -> Result<Self> {
        let settings = BoardSettings::load(cli.settings.as_deref())?;
        let rules = settings.scoring_rules(cli.scoring.as_deref())?;
        let league = settings.league_config(cli.league.as_deref())?;
        let projections = ProjectionFile::load(&cli.projections).await?;

        Ok(Self::with_parts(projections, rules, league, cli.json))
    }

    pub fn with_parts(
        projections: ProjectionFile,
        rules: ScoringRules,
        league: LeagueConfig,
        json: bool,
    ) -> Self {
        Self { projections, rules, league, json }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Score { player, breakdown } => self.show_scores(player, breakdown),
            Commands::CompareScoring { player } => self.show_scoring_comparison(player),
            Commands::Rank { position, limit } => self.show_ranking(position.as_deref(), limit),
            Commands::Replacement => self.show_replacement_levels(),
            Commands::Tiers => self.show_tiers(),
            Commands::Targets { round, pick, limit, lookback } => {
                let query = DraftTargetQuery { limit, lookback, ..DraftTargetQuery::new(round, pick) };
                self.show_targets(&query)
            }
            Commands::Compare { players } => self.show_comparison(&players),
            Commands::Rules => self.show_rules(),
        }
    }

    fn scores(&self) -> Vec<FantasyPoints> {
        ScoringCalculator::new(self.rules.clone()).calculate_all(&self.projections.players)
    }

    /// Score the whole projection file and rank it
    pub fn ranked(&self) -> Result<RankedPool> {
        let pool: Vec<PoolEntry> = self.scores().iter().map(PoolEntry::from).collect();
        vor_engine::rank(&pool, &self.league).context("Failed to rank player pool")
    }

    fn show_scores(&self, player: Option<u32>, breakdown: bool) -> Result<()> {
        let mut scores = match player {
            Some(id) => {
                let projection = self
                    .projections
                    .find(id)
                    .with_context(|| format!("Player {id} is not in the projection file"))?;
                vec![scoring_engine::score(projection, &self.rules)]
            }
            None => self.scores(),
        };
        scores.sort_by(|a, b| b.total.total_cmp(&a.total));

        if self.json {
            return print_json(&scores);
        }

        self.print_header(&format!("Fantasy Points ({})", self.rules.name));
        for points in &scores {
            println!(
                "{:<28} {:<4} {:<4} {:>8.1}",
                points.player.name,
                points.player.position,
                points.player.team,
                points.total
            );
            if breakdown {
                for (category, score) in &points.breakdown {
                    let line = format!(
                        "    {:<24} {:>10.1} -> {:>8.2}",
                        category, score.stat_value, score.points
                    );
                    if score.is_unscored() {
                        println!("{} {}", line.dimmed(), "(unscored)".yellow());
                    } else {
                        println!("{line}");
                    }
                }
            }
        }
        Ok(())
    }

    fn show_scoring_comparison(&self, player: u32) -> Result<()> {
        let projection = self
            .projections
            .find(player)
            .with_context(|| format!("Player {player} is not in the projection file"))?;
        let by_preset = compare_presets(projection);

        if self.json {
            return print_json(&by_preset);
        }

        self.print_header(&format!("Scoring Comparison: {}", projection.player.name));
        for (preset, points) in &by_preset {
            println!("{:<12} {:>8.1}", preset, points.total);
        }
        Ok(())
    }

    fn show_ranking(&self, position: Option<&str>, limit: usize) -> Result<()> {
        let ranked = self.ranked()?;
        let rows: Vec<&VorResult> = match position {
            Some(position) => {
                let position: Position = position.parse()?;
                ranked.position_rankings(position, Some(limit))
            }
            None => ranked.results().iter().take(limit).collect(),
        };

        if self.json {
            return print_json(&rows);
        }

        self.print_header(&format!(
            "VOR Rankings ({}, {})",
            self.rules.name, self.league.name
        ));
        println!(
            "{:>4} {:<28} {:<4} {:>4} {:>8} {:>8} {:>8}  {}",
            "#", "Player", "Pos", "Pos#", "Points", "Repl", "VOR", "Tier"
        );
        for result in rows {
            print_vor_row(result);
        }
        Ok(())
    }

    fn show_replacement_levels(&self) -> Result<()> {
        let ranked = self.ranked()?;

        if self.json {
            return print_json(ranked.replacement_levels());
        }

        self.print_header(&format!("Replacement Levels ({})", self.league.name));
        for level in ranked.replacement_levels().values() {
            let line = format!(
                "{:<4} rank {:>3} of {:>3} players  {:>8.1} pts",
                level.position, level.replacement_rank, level.pool_size, level.points
            );
            if level.thin_pool {
                println!("{} {}", line, "(thin pool)".yellow());
            } else {
                println!("{line}");
            }
        }
        Ok(())
    }

    fn show_tiers(&self) -> Result<()> {
        let tiers = self.ranked()?.value_tiers();

        if self.json {
            return print_json(&tiers);
        }

        for tier in ValueTier::ALL {
            let players = tiers.get(tier);
            println!("\n{} ({})", tier_label(tier), players.len());
            for result in players {
                println!(
                    "  {:<28} {:<4} {:>8.1}",
                    result.player.name, result.player.position, result.vor
                );
            }
        }
        Ok(())
    }

    fn show_targets(&self, query: &DraftTargetQuery) -> Result<()> {
        let targets = self.ranked()?.draft_targets(query)?;

        if self.json {
            return print_json(&targets);
        }

        self.print_header(&format!(
            "Draft Targets: round {}, pick {} (overall {})",
            targets.pick.round, targets.pick.draft_position, targets.pick.overall_pick
        ));
        for result in &targets.top_targets {
            print_vor_row(result);
        }
        for (position, players) in &targets.targets_by_position {
            let names: Vec<&str> = players.iter().map(|r| r.player.name.as_str()).collect();
            println!("{:<4} {}", position.to_string().bold(), names.join(", "));
        }
        Ok(())
    }

    fn show_comparison(&self, players: &[u32]) -> Result<()> {
        let comparison = self.ranked()?.compare_players(players)?;

        if self.json {
            return print_json(&comparison);
        }

        self.print_header("Player Comparison");
        for result in &comparison.players {
            print_vor_row(result);
        }
        println!(
            "\nBest value: {}",
            comparison.best_value.player.name.green().bold()
        );
        for gap in &comparison.gaps {
            println!(
                "  {:<28} -{:.1} VOR (-{:.1} raw, -{:.1} pts)",
                gap.name, gap.vor_difference, gap.raw_vor_difference, gap.points_difference
            );
        }
        Ok(())
    }

    fn show_rules(&self) -> Result<()> {
        let warnings = self.rules.validate();

        if self.json {
            return print_json(&serde_json::json!({ "rules": self.rules, "warnings": warnings }));
        }

        self.print_header(&format!("Scoring Rules ({})", self.rules.name));
        for (rule, value) in &self.rules.linear {
            println!("{:<20} {:>6}", rule, value);
        }
        for warning in warnings {
            println!("{} {}", "warning:".yellow().bold(), warning);
        }
        Ok(())
    }

    fn print_header(&self, title: &str) {
        println!("{}", title.bold());
        println!("{}", "=".repeat(50));
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_vor_row(result: &VorResult) {
    println!(
        "{:>4} {:<28} {:<4} {:>4} {:>8.1} {:>8.1} {:>8.1}  {}",
        result.overall_rank,
        result.player.name,
        result.player.position,
        result.position_rank,
        result.fantasy_points,
        result.replacement_level,
        result.vor,
        tier_label(result.tier)
    );
}

fn tier_label(tier: ValueTier) -> ColoredString {
    match tier {
        ValueTier::Elite => tier.label().green().bold(),
        ValueTier::High => tier.label().green(),
        ValueTier::Medium => tier.label().yellow(),
        ValueTier::Low => tier.label().normal(),
        ValueTier::BelowReplacement => tier.label().red(),
    }
}
