//! File-backed collaborators: the score list and the tuning parameters
//!
//! Both stores keep plain JSON documents. They sit outside the simulation:
//! a failing store is reported to the caller and never touches race state.

pub mod parameters;
pub mod scores;

pub use parameters::{
    adjusted_value, parameter_description, speed_multiplier, standard_average,
    standard_parameters, JsonParameterStore, Parameter, ParameterStore, ADJUST_RANGE,
};
pub use scores::{leaderboard, JsonScoreStore, ScoreRecord, ScoreStore};

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Write `value` as pretty JSON, creating parent directories
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
