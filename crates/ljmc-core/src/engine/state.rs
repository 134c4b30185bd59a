use crate::core::models::system::ParticleSystem;
use serde::Serialize;

/// Snapshot of the chain taken after a given step.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    pub step: u64,
    pub energy: f64,
    pub system: ParticleSystem,
}

impl TrajectorySample {
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.system.to_arrays()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AcceptanceStats {
    pub accepted: u64,
    pub attempted: u64,
}

impl AcceptanceStats {
    #[inline]
    pub fn record(&mut self, accepted: bool) {
        self.attempted += 1;
        if accepted {
            self.accepted += 1;
        }
    }

    /// Fraction of accepted moves; zero before any move was attempted.
    pub fn ratio(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }
}
