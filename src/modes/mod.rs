pub mod leaderboard;
pub mod params;
pub mod race;
pub mod train;

pub use leaderboard::{format_leaderboard, print_leaderboard};
pub use params::{format_parameters, parse_assignment, run_params, ParamsCommand};
pub use race::{RaceMode, RaceOptions};
pub use train::{TrainConfig, TrainMode};
