use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pseudo_racer::modes::{
    parse_assignment, print_leaderboard, run_params, ParamsCommand, RaceMode, RaceOptions,
    TrainConfig, TrainMode,
};
use pseudo_racer::rl::load_q_table;
use pseudo_racer::settings::Settings;
use pseudo_racer::store::{JsonParameterStore, JsonScoreStore};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pseudo_racer")]
#[command(version, about = "Pseudo-3D racer against a Q-learning opponent")]
struct Cli {
    /// What to run
    #[arg(long, default_value = "race")]
    mode: Mode,

    /// JSON settings file; missing means defaults
    #[arg(long, default_value = "settings.json")]
    config: PathBuf,

    /// Name scores are saved under
    #[arg(long)]
    username: Option<String>,

    /// Q-table snapshot to warm-start from (race, train) and save to
    #[arg(long)]
    qtable: Option<PathBuf>,

    /// Log file used while the race owns the terminal
    #[arg(long, default_value = "pseudo_racer.log")]
    log_file: PathBuf,

    /// Ticks to simulate in train mode
    #[arg(long, default_value = "100000")]
    ticks: u64,

    /// Set or create a parameter: NAME=VALUE (params mode)
    #[arg(long, value_parser = parse_assignment)]
    set: Vec<(String, f64)>,

    /// Move a standard parameter by a percentage in -50..=50: NAME=PERCENT (params mode)
    #[arg(long, value_parser = parse_assignment)]
    adjust: Vec<(String, f64)>,

    /// Delete a parameter (params mode)
    #[arg(long)]
    remove: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Race the opponent in the terminal
    Race,
    /// Train the opponent headless
    Train,
    /// Print saved scores
    Leaderboard,
    /// List and edit tuning parameters
    Params,
}

fn init_logging(mode: Mode, log_file: &Path) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pseudo_racer=info"));

    if mode == Mode::Race {
        // The terminal belongs to the race view
        let file = File::create(log_file)
            .with_context(|| format!("Failed to create log file {:?}", log_file))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.mode, &cli.log_file)?;

    let settings = Settings::load(&cli.config)?;

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Race => {
            let options = RaceOptions {
                username: cli.username,
                qtable_path: cli.qtable,
            };
            let mut race_mode = RaceMode::new(&settings, options);
            race_mode.run().await?;
        }
        Mode::Train => {
            let save_path = cli
                .qtable
                .unwrap_or_else(|| PathBuf::from("models/qtable.json"));
            let mut config = TrainConfig::new(cli.ticks, save_path.clone());
            config.game_config = settings.game;
            config.agent_config = settings.agent;

            let mut train_mode = if save_path.exists() {
                let snapshot = load_q_table(&save_path)?;
                println!("Resuming from {:?} ({} states)", save_path, snapshot.entries.len());
                TrainMode::resume(config, &snapshot)
            } else {
                TrainMode::new(config)
            };
            train_mode.run()?;
        }
        Mode::Leaderboard => {
            let store = JsonScoreStore::new(settings.scores_path);
            print_leaderboard(&store);
        }
        Mode::Params => {
            let mut store = JsonParameterStore::open(settings.parameters_path)?;
            let command = ParamsCommand {
                set: cli.set,
                adjust: cli.adjust,
                remove: cli.remove,
            };
            run_params(&mut store, &command)?;
        }
    }

    Ok(())
}
