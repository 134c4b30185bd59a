use ljmc::core::analysis::RadialDistribution;
use ljmc::engine::state::TrajectorySample;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EnergyRecord {
    pub step: u64,
    pub energy: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RdfRecord {
    pub r: f64,
    pub g: f64,
}

fn write_records<T: Serialize>(
    path: &Path,
    records: impl IntoIterator<Item = T>,
) -> Result<(), TableError> {
    let csv_err = |e| TableError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| TableError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Writes `step,energy` rows, one per trajectory sample.
pub fn write_energies(path: &Path, samples: &[TrajectorySample]) -> Result<(), TableError> {
    write_records(
        path,
        samples.iter().map(|s| EnergyRecord {
            step: s.step,
            energy: s.energy,
        }),
    )
}

/// Writes `r,g` rows for a radial distribution function.
pub fn write_rdf(path: &Path, rdf: &RadialDistribution) -> Result<(), TableError> {
    write_records(
        path,
        rdf.radii
            .iter()
            .zip(&rdf.values)
            .map(|(&r, &g)| RdfRecord { r, g }),
    )
}
