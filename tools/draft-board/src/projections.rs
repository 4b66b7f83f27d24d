//! Canonical projection file written by the ingestion side

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use scoring_engine::PlayerProjection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionFile {
    pub season: u32,

    /// Week for weekly projections, absent for season-long files
    #[serde(default)]
    pub week: Option<u32>,

    pub last_updated: DateTime<Utc>,

    pub players: Vec<PlayerProjection>,
}

impl ProjectionFile {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read projections from {}", path.display()))?;

        let file = Self::from_json_str(&content)
            .with_context(|| format!("Invalid projection file {}", path.display()))?;

        info!(
            "Loaded {} projections for season {} (updated {})",
            file.players.len(),
            file.season,
            file.last_updated.format("%Y-%m-%d %H:%M UTC")
        );
        Ok(file)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn find(&self, player_id: u32) -> Option<&PlayerProjection> {
        self.players.iter().find(|projection| projection.player.id == player_id)
    }
}
