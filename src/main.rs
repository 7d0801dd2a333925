use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, info};
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use wormy::game::GameConfig;
use wormy::modes::HumanMode;

#[derive(Parser)]
#[command(name = "wormy")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Simulation steps per second
    #[arg(long)]
    tps: Option<u32>,

    /// JSON file with game settings; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the diagnostic log
    #[arg(long, default_value = "wormy.log")]
    log_file: PathBuf,

    /// Log verbosity (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(tps) = self.tps {
            config.ticks_per_second = tps;
        }

        config
            .validate()
            .map_err(|err| anyhow!("Invalid game configuration: {err}"))?;

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the UI, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)
        .context("Failed to initialize logger")?;

    let config = cli.game_config()?;
    info!(
        "starting wormy: {}x{} grid at {} ticks/s",
        config.grid_width, config.grid_height, config.ticks_per_second
    );

    let mut human_mode = HumanMode::new(config);
    human_mode.run().await?;

    Ok(())
}
