//! Settings file bundling game, opponent and storage configuration

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::GameConfig;
use crate::rl::QLearningConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameConfig,
    pub agent: QLearningConfig,
    /// Leaderboard file
    pub scores_path: PathBuf,
    /// Tuning parameter file
    pub parameters_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            agent: QLearningConfig::default(),
            scores_path: PathBuf::from("scores.json"),
            parameters_path: PathBuf::from("parameters.json"),
        }
    }
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = ?path, "No settings file, using defaults");
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings from {:?}", path))?;
        settings.validate()?;

        info!(path = ?path, "Loaded settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.game
            .validate()
            .map_err(|e| anyhow!("Invalid game settings: {}", e))?;
        self.agent
            .validate()
            .map_err(|e| anyhow!("Invalid agent settings: {}", e))?;
        Ok(())
    }
}
