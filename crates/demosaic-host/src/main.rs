mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands};
use demosaic_core::SuppressionPlanner;
use demosaic_host::{HostConfig, RunOptions, Scene};
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = HostConfig::load_or_default(&cli.config)?;
            let scene = Scene::load(&args.scene)?;
            let options = RunOptions {
                tick: Duration::from_millis(args.tick_ms.max(1)),
                max_ticks: args.max_ticks,
                pace: if args.fast {
                    None
                } else {
                    Some(Duration::from_millis(args.tick_ms.max(1)))
                },
            };

            info!("Starting demosaic v{}", env!("CARGO_PKG_VERSION"));
            let report = demosaic_host::run(&config, scene, &options).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Plan(args) => {
            let config = HostConfig::load_or_default(&cli.config)?;
            let scene = Scene::load(&args.scene)?;
            let plan = SuppressionPlanner::new(config.suppression_config()).plan(&scene.methods);
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Config(ConfigCommands::Validate) => validate(&cli.config)?,
        Commands::Config(ConfigCommands::Show) => {
            let config = HostConfig::load_or_default(&cli.config)?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn validate(config_path: &Path) -> Result<()> {
    let config = HostConfig::load(config_path)?;
    let errors = config.validate();
    if errors.is_empty() {
        println!("{} is valid.", config_path.display());
        return Ok(());
    }

    println!("Validation errors in {}:", config_path.display());
    for e in &errors {
        println!("  - {}", e);
    }
    std::process::exit(1);
}
