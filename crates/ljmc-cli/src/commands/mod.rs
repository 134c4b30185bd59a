pub mod defaults;
pub mod ensemble;
pub mod run;

use crate::error::{CliError, Result};
use crate::io::report::{ConfigReport, RunSummary, write_toml};
use crate::io::tables;
use crate::io::xyz::XyzFile;
use ljmc::core::analysis::radial_distribution;
use ljmc::workflows::simulate::SimulationResult;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TRAJECTORY_FILE: &str = "trajectory.xyz";
pub const ENERGIES_FILE: &str = "energies.csv";
pub const CONFIG_FILE: &str = "config_used.toml";
pub const SUMMARY_FILE: &str = "summary.toml";
pub const RDF_FILE: &str = "rdf.csv";

fn write_error(path: PathBuf, source: impl Into<anyhow::Error>) -> CliError {
    CliError::FileWriting {
        path,
        source: source.into(),
    }
}

/// Writes every artifact of a finished (or cancelled) run into `dir`.
pub(crate) fn write_run_outputs(
    dir: &Path,
    result: &SimulationResult,
    rdf_bins: Option<usize>,
) -> Result<RunSummary> {
    std::fs::create_dir_all(dir)?;

    let trajectory_path = dir.join(TRAJECTORY_FILE);
    XyzFile::write_samples_to_path(&result.samples, &trajectory_path)
        .map_err(|e| write_error(trajectory_path.clone(), e))?;

    let energies_path = dir.join(ENERGIES_FILE);
    tables::write_energies(&energies_path, &result.samples)
        .map_err(|e| write_error(energies_path.clone(), e))?;

    let config_path = dir.join(CONFIG_FILE);
    write_toml(&config_path, &ConfigReport::new(&result.config))
        .map_err(|e| write_error(config_path.clone(), e))?;

    let summary = RunSummary::from(result);
    let summary_path = dir.join(SUMMARY_FILE);
    write_toml(&summary_path, &summary).map_err(|e| write_error(summary_path.clone(), e))?;

    if let Some(bins) = rdf_bins {
        if result.samples.is_empty() {
            warn!("No samples were recorded; skipping the radial distribution function.");
        } else {
            let r_max = 0.5 * result.config.box_length;
            let rdf = radial_distribution(result.samples.iter().map(|s| &s.system), bins, r_max)
                .map_err(|e| CliError::Argument(e.to_string()))?;
            let rdf_path = dir.join(RDF_FILE);
            tables::write_rdf(&rdf_path, &rdf).map_err(|e| write_error(rdf_path.clone(), e))?;
        }
    }

    info!(
        "Wrote {} sample(s) and run summary to {:?}",
        result.samples.len(),
        dir
    );
    Ok(summary)
}
