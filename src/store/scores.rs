use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::write_json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub username: String,
    pub score: f64,
}

impl ScoreRecord {
    pub fn new(username: impl Into<String>, score: f64) -> Self {
        Self {
            username: username.into(),
            score,
        }
    }
}

/// Where finished race scores go
pub trait ScoreStore {
    /// Append one record
    fn save(&mut self, username: &str, score: f64) -> Result<()>;

    /// Every stored record, empty if the store is absent or unreadable
    fn load_all(&self) -> Vec<ScoreRecord>;
}

/// Scores kept as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonScoreStore {
    fn save(&mut self, username: &str, score: f64) -> Result<()> {
        let mut records = self.load_all();
        records.push(ScoreRecord::new(username, score));
        write_json(&self.path, &records)?;

        info!(username, score, path = ?self.path, "Saved score");
        Ok(())
    }

    fn load_all(&self) -> Vec<ScoreRecord> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&json) {
            Ok(records) => records,
            Err(err) => {
                warn!(path = ?self.path, %err, "Ignoring unreadable score file");
                Vec::new()
            }
        }
    }
}

/// Highest score first; equal scores keep their stored order
pub fn leaderboard(mut records: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
    records
}
