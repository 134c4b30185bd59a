use super::{SUMMARY_FILE, write_run_outputs};
use crate::cli::RunArgs;
use crate::config::PartialSimulationConfig;
use crate::error::{CliError, Result};
use crate::io::xyz::XyzFile;
use crate::ui::{CliProgressHandler, UiEvent};
use ljmc::engine::cancel::StopSignal;
use ljmc::engine::progress::ProgressReporter;
use ljmc::workflows::simulate;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn run(args: RunArgs, ui_sender: mpsc::Sender<UiEvent>, stop: StopSignal) -> Result<()> {
    let partial_config = PartialSimulationConfig::load(&args.simulation)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args.simulation, args.seed)?;
    debug!("Resolved configuration: {:?}", config);

    let initial_system = match &args.initial_config {
        Some(path) => {
            info!("Loading initial configuration from {:?}", path);
            let frame = XyzFile::read_last_frame_from_path(path, Some(config.box_length))
                .map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?;
            Some(frame.system)
        }
        None => None,
    };

    let progress_handler = CliProgressHandler::new(ui_sender);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting Metropolis sampling of {} particles for {} steps...",
        config.particle_count(),
        config.n_steps
    );
    info!("Invoking the core simulation workflow...");

    let result = tokio::task::block_in_place(|| match initial_system {
        Some(system) => simulate::run_from(config, system, &reporter, &stop),
        None => simulate::run(config, &reporter, &stop),
    })?;

    if result.cancelled {
        warn!(
            "Run was interrupted after {} of {} steps; writing partial results.",
            result.steps_completed, result.config.n_steps
        );
        println!(
            "Interrupted after {} step(s); writing partial results.",
            result.steps_completed
        );
    }

    let summary = write_run_outputs(&args.simulation.output, &result, args.rdf_bins)?;

    println!(
        "✓ Acceptance ratio {:.4} ({} / {} moves), final energy {:.6}",
        summary.acceptance_ratio,
        summary.accepted_moves,
        summary.attempted_moves,
        summary.final_energy
    );
    println!(
        "  Results written to: {}",
        args.simulation.output.join(SUMMARY_FILE).display()
    );
    Ok(())
}
