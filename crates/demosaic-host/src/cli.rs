use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "demosaic")]
#[command(version, about = "Replay scene scripts against the demosaic sweep scheduler")]
pub struct Cli {
    /// Path to demosaic.toml
    #[arg(
        long,
        global = true,
        env = "DEMOSAIC_CONFIG",
        default_value = "demosaic.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scene script and print the final report as JSON
    Run(RunArgs),
    /// Print the method suppression plan for a scene
    Plan(PlanArgs),
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scene script (JSON)
    #[arg(long, env = "DEMOSAIC_SCENE")]
    pub scene: PathBuf,

    /// Logical milliseconds per tick
    #[arg(long, env = "DEMOSAIC_TICK_MS", default_value = "100")]
    pub tick_ms: u64,

    /// Ticks to run before reporting
    #[arg(long, env = "DEMOSAIC_MAX_TICKS", default_value = "100")]
    pub max_ticks: u64,

    /// Do not wait between ticks
    #[arg(long, env = "DEMOSAIC_FAST")]
    pub fast: bool,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Scene script (JSON)
    #[arg(long, env = "DEMOSAIC_SCENE")]
    pub scene: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Check the config file for errors
    Validate,
    /// Print the effective config
    Show,
}
