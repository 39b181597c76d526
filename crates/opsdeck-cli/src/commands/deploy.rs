use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use opsdeck_application::{DeployRunner, SharedStore, SimulatedProgress};
use opsdeck_core::AppStore;
use opsdeck_core::config::StoreConfig;
use opsdeck_core::deploy::{DeployPhase, DeployStatus};
use opsdeck_infrastructure::ConfigService;
use std::io::Write;

const BAR_WIDTH: usize = 30;

/// Runs a single simulated deploy in the foreground. Ctrl-C cancels it.
pub async fn run(config: &ConfigService, seed: Option<u64>) -> Result<()> {
    let deploy = config.get_config().deploy;
    let store = SharedStore::new(AppStore::new(StoreConfig::empty()));
    let runner = DeployRunner::new(&deploy).with_store(store.clone());

    let source = match seed {
        Some(seed) => SimulatedProgress::seeded(deploy.tick_interval(), deploy.max_increment, seed),
        None => SimulatedProgress::from_config(&deploy),
    };
    let mut status = runner.subscribe();
    let mut handle = runner
        .trigger(source)
        .ok_or_else(|| anyhow!("a deploy is already running"))?;

    loop {
        tokio::select! {
            joined = &mut handle => {
                joined.context("deploy task failed")?;
                break;
            }
            Ok(()) = status.changed() => {
                let current = *status.borrow_and_update();
                render(current)?;
            }
            _ = tokio::signal::ctrl_c() => {
                runner.cancel();
            }
        }
    }
    println!();

    let completed = !store.snapshot().await.notifications.is_empty();
    if completed {
        println!("{}", "Deployment complete".bright_green().bold());
    } else {
        println!("{}", "Deployment aborted".yellow());
    }
    Ok(())
}

fn render(status: DeployStatus) -> Result<()> {
    let filled = ((status.progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
    let label = match status.phase {
        DeployPhase::Idle => "idle".bright_black(),
        DeployPhase::Deploying => "deploying".cyan(),
        DeployPhase::Success => "success".green(),
    };

    let mut out = std::io::stdout();
    write!(out, "\r[{}] {:>5.1}% {:<10}", bar, status.progress, label)?;
    out.flush()?;
    Ok(())
}
