//! Layered settings for the draft board
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! settings file, then `DRAFT_BOARD__*` environment variables. Command-line
//! flags override all three.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use scoring_engine::{CustomScoringRules, ScoringPreset, ScoringRules};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vor_engine::{LeagueConfig, LeaguePreset};

const ENV_PREFIX: &str = "DRAFT_BOARD";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Scoring preset name ("standard", "ppr", "half_ppr")
    #[serde(default)]
    pub scoring: Option<String>,

    /// Custom rule set; takes precedence over `scoring`
    #[serde(default)]
    pub custom_scoring: Option<CustomScoringRules>,

    /// League preset name ("standard_10", "standard_12", "deep_14")
    #[serde(default)]
    pub league_preset: Option<String>,

    /// TOML league configuration file; takes precedence over `league_preset`
    #[serde(default)]
    pub league_file: Option<PathBuf>,

    /// Inline league configuration; takes precedence over both of the above
    #[serde(default)]
    pub league: Option<LeagueConfig>,
}

impl BoardSettings {
    /// Load settings from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR),
        );

        let settings: BoardSettings = builder
            .build()
            .context("Failed to read draft board settings")?
            .try_deserialize()
            .context("Invalid draft board settings")?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Resolve the scoring rule set, with `preset_override` winning over settings
    pub fn scoring_rules(&self, preset_override: Option<&str>) -> Result<ScoringRules> {
        let rules = match (preset_override, &self.custom_scoring, &self.scoring) {
            (Some(name), _, _) => ScoringRules::preset(parse_scoring_preset(name)?),
            (None, Some(custom), _) => {
                custom.resolve().context("Invalid custom scoring rules")?
            }
            (None, None, Some(name)) => ScoringRules::preset(parse_scoring_preset(name)?),
            (None, None, None) => ScoringRules::default(),
        };

        for warning in rules.validate() {
            warn!("Scoring rules '{}': {}", rules.name, warning);
        }
        Ok(rules)
    }

    /// Resolve the league configuration, with `preset_override` winning over settings
    pub fn league_config(&self, preset_override: Option<&str>) -> Result<LeagueConfig> {
        if let Some(name) = preset_override {
            return Ok(LeagueConfig::preset(parse_league_preset(name)?));
        }
        if let Some(league) = &self.league {
            return Ok(league.clone());
        }
        if let Some(path) = &self.league_file {
            return LeagueConfig::from_file(path)
                .with_context(|| format!("Failed to load league file {}", path.display()));
        }
        match &self.league_preset {
            Some(name) => Ok(LeagueConfig::preset(parse_league_preset(name)?)),
            None => Ok(LeagueConfig::default()),
        }
    }
}

fn parse_scoring_preset(name: &str) -> Result<ScoringPreset> {
    name.parse().with_context(|| {
        let known: Vec<&str> = ScoringPreset::ALL.iter().map(|preset| preset.name()).collect();
        format!("Expected one of: {}", known.join(", "))
    })
}

fn parse_league_preset(name: &str) -> Result<LeaguePreset> {
    name.parse().with_context(|| {
        let known: Vec<&str> = LeaguePreset::ALL.iter().map(|preset| preset.name()).collect();
        format!("Expected one of: {}", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Serialises tests that read the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let settings = BoardSettings::default();

        assert_eq!(settings.scoring_rules(None).unwrap().name, "standard");
        assert_eq!(settings.league_config(None).unwrap(), LeagueConfig::default());
    }

    #[test]
    fn test_override_wins() {
        let settings = BoardSettings {
            scoring: Some("standard".to_string()),
            league_preset: Some("standard_10".to_string()),
            ..Default::default()
        };

        assert_eq!(settings.scoring_rules(Some("half-ppr")).unwrap().name, "half_ppr");
        assert_eq!(settings.league_config(Some("deep14")).unwrap().team_count, 14);
        assert_eq!(settings.league_config(None).unwrap().team_count, 10);
    }

    #[test]
    fn test_custom_scoring_over_preset_name() {
        let settings = BoardSettings {
            scoring: Some("standard".to_string()),
            custom_scoring: Some(CustomScoringRules {
                name: "six point passing".to_string(),
                base: ScoringPreset::Ppr,
                rules: [("pass_td".to_string(), 6.0)].into_iter().collect(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let rules = settings.scoring_rules(None).unwrap();
        assert_eq!(rules.name, "six point passing");
        assert_eq!(rules.point_value("pass_td"), Some(6.0));
        assert_eq!(rules.point_value("reception"), Some(1.0));
    }

    #[test]
    fn test_unknown_presets_are_errors() {
        let settings = BoardSettings::default();

        assert!(settings.scoring_rules(Some("superflex")).is_err());
        assert!(settings.league_config(Some("dynasty_16")).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
scoring = "ppr"

[league]
name = "home league"
team_count = 8

[league.positions.QB]
starters = 1

[league.positions.RB]
starters = 2
backup_depth = 4
"#
        )
        .unwrap();

        let settings = BoardSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.scoring.as_deref(), Some("ppr"));

        let league = settings.league_config(None).unwrap();
        assert_eq!(league.name, "home league");
        assert_eq!(league.team_count, 8);
        assert_eq!(league.replacement_rank(scoring_engine::Position::RB).unwrap(), 20);
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "scoring = \"standard\"\nleague_preset = \"standard_10\"").unwrap();

        std::env::set_var("DRAFT_BOARD__SCORING", "ppr");
        std::env::set_var("DRAFT_BOARD__LEAGUE_PRESET", "deep14");
        let loaded = BoardSettings::load(Some(file.path()));
        std::env::remove_var("DRAFT_BOARD__SCORING");
        std::env::remove_var("DRAFT_BOARD__LEAGUE_PRESET");

        let settings = loaded.unwrap();
        assert_eq!(settings.scoring.as_deref(), Some("ppr"));
        assert_eq!(settings.league_preset.as_deref(), Some("deep14"));
        assert_eq!(settings.scoring_rules(None).unwrap().name, "ppr");
        assert_eq!(settings.league_config(None).unwrap().team_count, 14);
    }
}
