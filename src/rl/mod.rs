//! Reinforcement learning for the opponent car
//!
//! Provides:
//! - 5×5×5 state discretisation (speed, lane, gap to the player)
//! - Sparse Q-table with lazy zero rows
//! - Epsilon-greedy agent driving a kinematic car
//! - JSON snapshots of learned values

pub mod action;
pub mod agent;
pub mod config;
pub mod observation;
pub mod persistence;
pub mod qtable;

pub use action::{AiAction, ACTION_COUNT};
pub use agent::QLearningAgent;
pub use config::QLearningConfig;
pub use observation::{bucket, compute_reward, make_state, signed_gap, DiscreteState};
pub use persistence::{load_q_table, save_q_table, QTableSnapshot, SnapshotMetadata};
pub use qtable::{ActionValues, QEntry, QTable};
