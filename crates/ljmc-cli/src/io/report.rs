use ljmc::engine::config::SimulationConfig;
use ljmc::workflows::simulate::SimulationResult;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("TOML serialization error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::ser::Error,
    },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// The resolved run parameters together with the quantities derived from them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigReport<'a> {
    pub particle_count: usize,
    pub beta: f64,
    pub parameters: &'a SimulationConfig,
}

impl<'a> ConfigReport<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self {
            particle_count: config.particle_count(),
            beta: config.beta(),
            parameters: config,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RunSummary {
    pub seed: u64,
    pub particles: usize,
    pub steps_completed: u64,
    pub cancelled: bool,
    pub accepted_moves: u64,
    pub attempted_moves: u64,
    pub acceptance_ratio: f64,
    pub samples: usize,
    pub final_energy: f64,
    pub recomputed_energy: f64,
    pub energy_drift: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_energy_per_particle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat_capacity_per_particle: Option<f64>,
}

impl From<&SimulationResult> for RunSummary {
    fn from(result: &SimulationResult) -> Self {
        let stats = result.energy_statistics();
        Self {
            seed: result.config.seed,
            particles: result.final_system.len(),
            steps_completed: result.steps_completed,
            cancelled: result.cancelled,
            accepted_moves: result.acceptance.accepted,
            attempted_moves: result.acceptance.attempted,
            acceptance_ratio: result.acceptance_ratio(),
            samples: result.samples.len(),
            final_energy: result.final_energy,
            recomputed_energy: result.recomputed_energy,
            energy_drift: result.energy_drift(),
            mean_energy: stats.map(|s| s.mean),
            mean_energy_per_particle: stats.map(|s| s.mean_per_particle),
            heat_capacity_per_particle: stats.map(|s| s.heat_capacity_per_particle),
        }
    }
}

/// Summary of an ensemble; serialized as one `[[runs]]` table per seed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnsembleSummary {
    pub completed_runs: usize,
    pub failed_runs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_acceptance_ratio: Option<f64>,
    pub runs: Vec<RunSummary>,
}

impl EnsembleSummary {
    pub fn new(runs: Vec<RunSummary>, failed_runs: usize) -> Self {
        let mean_acceptance_ratio = (!runs.is_empty())
            .then(|| runs.iter().map(|r| r.acceptance_ratio).sum::<f64>() / runs.len() as f64);
        Self {
            completed_runs: runs.len(),
            failed_runs,
            mean_acceptance_ratio,
            runs,
        }
    }
}

pub fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let content = toml::to_string_pretty(value).map_err(|e| ReportError::Toml {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    std::fs::write(path, content).map_err(|e| ReportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
