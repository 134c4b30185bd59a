mod cli;
mod commands;
mod config;
mod error;
mod io;
mod logging;
mod ui;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::ui::UiManager;
use clap::Parser;
use ljmc::engine::cancel::StopSignal;
use tokio::task;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn install_interrupt_handler(stop: StopSignal) {
    task::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current Monte Carlo step.");
            stop.request_stop();
        }
    });
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Defaults = cli.command {
        return commands::defaults::run();
    }

    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new();
    let ui_handle = task::spawn(ui_manager.run());

    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file, Some(ui_sender.clone()))?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    let stop = StopSignal::new();
    install_interrupt_handler(stop.clone());

    let command_result = async {
        info!("🚀 LJMC CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
        debug!("Full CLI arguments parsed: {:?}", &cli);

        if let Some(num_threads) = cli.threads {
            info!(
                "Setting Rayon global thread pool to {} threads.",
                num_threads
            );
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
                })?;
        }

        match cli.command {
            Commands::Run(args) => {
                info!("Dispatching to 'run' command.");
                commands::run::run(args, ui_sender, stop).await
            }
            Commands::Ensemble(args) => {
                info!("Dispatching to 'ensemble' command.");
                commands::ensemble::run(args, ui_sender, stop).await
            }
            Commands::Defaults => commands::defaults::run(),
        }
    }
    .await;

    match &command_result {
        Ok(_) => {
            info!("✅ Command completed successfully.");
        }
        Err(e) => {
            error!("❌ Command failed: {}", e);
        }
    }

    if shutdown_sender.send(true).is_err() {
        warn!("UI manager may have already exited before shutdown signal.");
    }

    ui_handle
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI manager task failed: {}", e)))?;

    command_result
}
