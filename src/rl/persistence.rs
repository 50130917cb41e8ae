//! Saving and loading learned opponent values
//!
//! A snapshot is a single JSON document holding the Q-table rows together
//! with the configuration and training progress that produced them.

use super::{QEntry, QLearningAgent, QLearningConfig, QTable};
use crate::store::write_json;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata saved with a Q-table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Configuration used while learning
    pub config: QLearningConfig,

    /// Loop length the gap buckets were computed against
    pub track_length: f64,

    /// Agent ticks completed
    pub training_ticks: u64,

    /// Exploration rate when the snapshot was taken, restored on resume
    pub epsilon: f64,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl SnapshotMetadata {
    pub fn new(config: QLearningConfig, track_length: f64, training_ticks: u64, epsilon: f64) -> Self {
        Self {
            config,
            track_length,
            training_ticks,
            epsilon,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// On-disk form of a learned table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTableSnapshot {
    pub metadata: SnapshotMetadata,
    pub entries: Vec<QEntry>,
}

impl QTableSnapshot {
    pub fn from_agent(agent: &QLearningAgent) -> Self {
        Self {
            metadata: SnapshotMetadata::new(
                agent.config().clone(),
                agent.track_length(),
                agent.ticks,
                agent.epsilon,
            ),
            entries: agent.q_table().to_entries(),
        }
    }

    pub fn q_table(&self) -> QTable {
        QTable::from_entries(self.entries.iter().cloned())
    }
}

/// Save an agent's learned values to `path`
///
/// Creates parent directories if they don't exist.
///
/// # Arguments
///
/// * `agent` - The agent to snapshot
/// * `path` - Destination JSON file
pub fn save_q_table(agent: &QLearningAgent, path: &Path) -> Result<()> {
    write_json(path, &QTableSnapshot::from_agent(agent)).context("Failed to save Q-table")
}

/// Load a snapshot written by [`save_q_table`]
pub fn load_q_table(path: &Path) -> Result<QTableSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Q-table from {:?}", path))?;
    let snapshot: QTableSnapshot = serde_json::from_str(&json)
        .with_context(|| format!("Failed to deserialize Q-table from {:?}", path))?;

    Ok(snapshot)
}
