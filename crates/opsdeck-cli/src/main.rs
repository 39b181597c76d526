use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opsdeck_infrastructure::{ConfigService, OpsdeckPaths};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "opsdeck", version)]
#[command(about = "OPSDECK - operations dashboard state in your terminal", long_about = None)]
struct Cli {
    /// Use this directory instead of the platform config directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard shell
    Shell,
    /// Run one simulated deploy and print its progress
    Deploy {
        /// Seed for the progress generator, for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the initial store snapshot as JSON
    Snapshot,
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Change one setting, e.g. `deploy.tick_interval_ms 100`
    Set {
        /// Dotted key as shown by `config show`
        key: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = OpsdeckPaths::new(cli.config_dir);
    let logging = logging::init(&paths, matches!(cli.command, Commands::Shell))?;
    let config = ConfigService::new(paths);

    match cli.command {
        Commands::Shell => {
            let activity = logging
                .activity
                .context("activity capture is not enabled")?;
            commands::shell::run(&config, activity).await?
        }
        Commands::Deploy { seed } => commands::deploy::run(&config, seed).await?,
        Commands::Snapshot => commands::snapshot::print(&config)?,
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(&config)?,
            ConfigAction::Show => commands::config::show(&config)?,
            ConfigAction::Init { force } => commands::config::init(&config, force)?,
            ConfigAction::Set { key, value } => commands::config::set(&config, &key, &value)?,
        },
    }

    Ok(())
}
