//! Command-line replay rescoring.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rvsrg_scoring::database::load_replay_from_path;
use rvsrg_scoring::{MapInfo, ReplayEngine, ScoringConfig};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rvsrg-score")]
#[command(about = "Rescore rvsrg replays", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a replay and print its final state.
    Simulate {
        /// .osu map the replay was recorded on.
        map: PathBuf,
        /// Compressed replay file.
        replay: PathBuf,
        /// Scoring config (TOML). Defaults to the standard ruleset.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Precomputed map difficulty.
        #[arg(short, long, default_value_t = 0.0)]
        difficulty: f64,
        /// Write the rating, health and max possible series as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the default scoring config as TOML.
    DefaultConfig {
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            map,
            replay,
            config,
            difficulty,
            output,
        } => {
            let map_info = MapInfo::load(&map)
                .with_context(|| format!("failed to load map: {}", map.display()))?;
            let replay_data = load_replay_from_path(&replay)
                .with_context(|| format!("failed to load replay: {}", replay.display()))?;
            let config = match config {
                Some(path) => ScoringConfig::load(&path)
                    .with_context(|| format!("failed to load config: {}", path.display()))?,
                None => ScoringConfig::default(),
            };

            let engine = ReplayEngine::for_replay(&map_info, &replay_data, config, difficulty);
            let result = engine
                .simulate(&replay_data.events)
                .context("simulation failed")?;

            let s = &result.snapshot;
            log::info!(
                "Score {} | Acc {:.2}% | Combo {}x | Health {:.1} | Rating {:.2}{}",
                s.score,
                s.accuracy,
                s.max_combo,
                s.health,
                result.final_rating,
                if s.failed { " | FAILED" } else { "" }
            );
            if let Some(best) = &result.max_possible_snapshot {
                log::info!("Best possible from here: {:.2}%", best.accuracy);
            }

            if let Some(out_path) = output {
                let json =
                    serde_json::to_string_pretty(&result).context("failed to serialize result")?;
                fs::write(&out_path, json)
                    .with_context(|| format!("failed to write: {}", out_path.display()))?;
            }
        }
        Command::DefaultConfig { output } => {
            let toml = ScoringConfig::default().to_toml_string()?;
            match output {
                Some(path) => fs::write(&path, toml)
                    .with_context(|| format!("failed to write: {}", path.display()))?,
                None => println!("{toml}"),
            }
        }
    }

    Ok(())
}
