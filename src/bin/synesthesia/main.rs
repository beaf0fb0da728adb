//! synesthesia - draw shapes on a looping timeline and hear them
//!
//! Run with: cargo run -- --loop-duration 4

mod app;
mod sketch;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use synesthesia::{EngineConfig, LoopDuration};

#[derive(Parser)]
#[command(name = "synesthesia")]
#[command(about = "Draw shapes on a timeline and hear them as a loop", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Loop length in seconds (2 to 6, half-second steps)
    #[arg(short, long)]
    loop_duration: Option<f64>,

    /// Percussive sample used by low ellipses (WAV)
    #[arg(short, long)]
    sample: Option<PathBuf>,

    /// Log file; the terminal is taken by the interface
    #[arg(long, default_value = "synesthesia.log")]
    log_file: PathBuf,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(&cli.log_file, &config.log_level)?;

    app::run(config)
}

fn load_config(cli: &Cli) -> EyreResult<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = EngineConfig::load(path)
                .wrap_err_with(|| format!("failed to load config {}", path.display()))?;
            if let Some(dir) = path.parent() {
                config.resolve_sample_path(dir);
            }
            config
        }
        None => EngineConfig::default(),
    };

    if let Some(seconds) = cli.loop_duration {
        config.loop_duration = LoopDuration::try_new(seconds)?;
    }
    if let Some(sample) = &cli.sample {
        config.percussion_sample = Some(sample.clone());
    }
    Ok(config)
}

fn init_logging(path: &Path, level: &str) -> EyreResult<()> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| eyre!("unknown log level {level:?}"))?;
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
