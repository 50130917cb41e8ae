//! Headless training mode for the Q-learning opponent
//!
//! Runs the agent against a scripted player that moves a fixed distance
//! every tick. No terminal is involved, so thousands of ticks per second
//! can be simulated, then the table is saved for a race to warm-start
//! from.
//!
//! # Example
//!
//! ```rust,no_run
//! use pseudo_racer::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(100_000, PathBuf::from("models/qtable.json"));
//! let mut train_mode = TrainMode::new(config);
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::game::{wrap_position, GameConfig};
use crate::metrics::TrainingStats;
use crate::rl::{save_q_table, QLearningAgent, QLearningConfig, QTable, QTableSnapshot};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of opponent ticks to simulate
    pub ticks: u64,

    /// Where the final Q-table snapshot is written
    pub save_path: PathBuf,

    /// Save a checkpoint every N ticks
    pub checkpoint_frequency: u64,

    /// Print progress every N ticks
    pub log_frequency: u64,

    /// Distance the scripted player covers per tick
    pub player_advance: f64,

    /// Track layout and road width
    pub game_config: GameConfig,

    /// Learning hyperparameters
    pub agent_config: QLearningConfig,
}

impl TrainConfig {
    /// Create a training configuration with defaults
    ///
    /// # Example
    ///
    /// ```rust
    /// use pseudo_racer::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(50_000, PathBuf::from("models/qtable.json"));
    /// assert_eq!(config.log_frequency, 10_000);
    /// ```
    pub fn new(ticks: u64, save_path: PathBuf) -> Self {
        Self {
            ticks,
            save_path,
            checkpoint_frequency: 50_000,
            log_frequency: 10_000,
            player_advance: 400.0,
            game_config: GameConfig::default(),
            agent_config: QLearningConfig::default(),
        }
    }
}

pub struct TrainMode {
    agent: QLearningAgent,
    stats: TrainingStats,
    config: TrainConfig,
    player_position: f64,
    current_tick: u64,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Self {
        Self::build(config, None)
    }

    /// Continue training from a saved snapshot: its table and its
    /// exploration rate
    pub fn resume(config: TrainConfig, snapshot: &QTableSnapshot) -> Self {
        let mut train_mode = Self::build(config, Some(snapshot.q_table()));
        train_mode.agent.resume_exploration(snapshot.metadata.epsilon);
        train_mode
    }

    fn build(config: TrainConfig, q_table: Option<QTable>) -> Self {
        let track_length = config.game_config.track_length();
        let start = track_length * config.game_config.ai_start_fraction;
        let agent_config = config
            .agent_config
            .clone()
            .for_road(config.game_config.road_half_width());

        let agent = match q_table {
            Some(table) => QLearningAgent::with_q_table(agent_config, track_length, start, table),
            None => QLearningAgent::new(agent_config, track_length, start),
        };

        Self {
            agent,
            stats: TrainingStats::new(1000),
            config,
            player_position: 0.0,
            current_tick: 0,
        }
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Run the training loop, printing progress and saving checkpoints
    pub fn run(&mut self) -> Result<()> {
        self.print_header();
        info!(ticks = self.config.ticks, "Training started");

        for tick in 0..self.config.ticks {
            self.current_tick = tick + 1;
            self.step();

            if self.config.log_frequency > 0 && self.current_tick % self.config.log_frequency == 0 {
                self.print_progress();
            }

            if self.config.checkpoint_frequency > 0
                && self.current_tick % self.config.checkpoint_frequency == 0
            {
                self.save_checkpoint()?;
            }
        }

        self.save_final()?;

        println!("\nTraining complete!");
        println!("Final Q-table saved to: {:?}", self.config.save_path);
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// One tick: move the scripted player, then let the agent act and learn
    fn step(&mut self) {
        let track_length = self.config.game_config.track_length();
        self.player_position =
            wrap_position(self.player_position + self.config.player_advance, track_length);

        let before = self.agent.position;
        let forward = self
            .agent
            .update(self.player_position, self.config.game_config.road_half_width());

        if self.agent.position < before {
            self.stats.record_lap();
            debug!(laps = self.stats.laps(), "Opponent completed a lap");
        }
        self.stats.record_tick(self.agent.last_reward, forward);
        self.stats
            .record_agent(self.agent.epsilon, self.agent.q_table().len());
    }

    fn save_checkpoint(&self) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_tick{}.json", self.current_tick));

        save_q_table(&self.agent, &checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        println!("  Checkpoint saved: {:?}", checkpoint_path);
        Ok(())
    }

    fn save_final(&self) -> Result<()> {
        save_q_table(&self.agent, &self.config.save_path).with_context(|| {
            format!(
                "Failed to save final Q-table to {:?}",
                self.config.save_path
            )
        })
    }

    fn print_header(&self) {
        let agent = &self.config.agent_config;
        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Pseudo Racer");
        println!("{}", "=".repeat(70));
        println!("Ticks: {}", self.config.ticks);
        println!(
            "Track: {} segments x {} units",
            self.config.game_config.total_segments, self.config.game_config.segment_length
        );
        println!("Player advance: {} per tick", self.config.player_advance);
        println!("Q-Learning Config:");
        println!("  Alpha: {}", agent.alpha);
        println!("  Gamma: {}", agent.gamma);
        println!(
            "  Epsilon: {} -> {} (x{} per tick)",
            agent.epsilon_start, agent.epsilon_min, agent.epsilon_decay
        );
        println!("  Buckets: {}", agent.buckets);
        println!("Checkpoints: Every {} ticks", self.config.checkpoint_frequency);
        println!("Logging: Every {} ticks", self.config.log_frequency);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self) {
        println!(
            "[Tick {}/{}] {}",
            self.current_tick,
            self.config.ticks,
            self.stats.format_summary()
        );
    }
}
