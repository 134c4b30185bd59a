use super::write_run_outputs;
use crate::cli::EnsembleArgs;
use crate::config::PartialSimulationConfig;
use crate::error::{CliError, Result};
use crate::io::report::{EnsembleSummary, write_toml};
use crate::ui::{CliProgressHandler, UiEvent};
use ljmc::engine::cancel::StopSignal;
use ljmc::engine::progress::ProgressReporter;
use ljmc::workflows::ensemble;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info};

pub const ENSEMBLE_SUMMARY_FILE: &str = "ensemble_summary.toml";

pub fn run_directory(output: &Path, seed: u64) -> PathBuf {
    output.join(format!("seed-{}", seed))
}

pub async fn run(
    args: EnsembleArgs,
    ui_sender: mpsc::Sender<UiEvent>,
    stop: StopSignal,
) -> Result<()> {
    let mut seen = HashSet::new();
    if let Some(dup) = args.seeds.iter().find(|s| !seen.insert(**s)) {
        return Err(CliError::Argument(format!(
            "Seed {} appears more than once in --seeds.",
            dup
        )));
    }

    let partial_config = PartialSimulationConfig::load(&args.simulation)?;
    info!("Merging configuration from file and CLI arguments...");
    let base = partial_config.merge_with_cli(&args.simulation, None)?;
    let configs = ensemble::with_seeds(&base, &args.seeds);

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting {} independent runs of {} particles for {} steps each...",
        configs.len(),
        base.particle_count(),
        base.n_steps
    );

    let results = tokio::task::block_in_place(|| ensemble::run(&configs, &reporter, &stop));

    let output = &args.simulation.output;
    let mut summaries = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for (seed, result) in args.seeds.iter().zip(&results) {
        match result {
            Ok(result) => {
                let summary = write_run_outputs(&run_directory(output, *seed), result, None)?;
                info!(
                    "seed {:>10}  acceptance {:.4}  final energy {:>14.6}  mean energy {}",
                    seed,
                    summary.acceptance_ratio,
                    summary.final_energy,
                    summary
                        .mean_energy
                        .map_or_else(|| "n/a".to_string(), |e| format!("{:.6}", e))
                );
                summaries.push(summary);
            }
            Err(e) => {
                error!("Run with seed {} failed: {}", seed, e);
                println!("  Run with seed {} failed: {}", seed, e);
                failed += 1;
            }
        }
    }

    if summaries.is_empty() {
        return Err(CliError::Other(anyhow::anyhow!(
            "All {} runs failed; no results were written.",
            failed
        )));
    }

    let summary = EnsembleSummary::new(summaries, failed);
    let summary_path = output.join(ENSEMBLE_SUMMARY_FILE);
    write_toml(&summary_path, &summary).map_err(|e| CliError::FileWriting {
        path: summary_path.clone(),
        source: e.into(),
    })?;

    println!(
        "✓ {} run(s) completed, {} failed; mean acceptance ratio {:.4}",
        summary.completed_runs,
        summary.failed_runs,
        summary.mean_acceptance_ratio.unwrap_or(0.0)
    );
    println!("  Summary written to: {}", summary_path.display());
    Ok(())
}
