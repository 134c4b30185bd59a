use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PotentialError {
    #[error("Cutoff radius must be positive and finite, got {0}")]
    InvalidCutoff(f64),
    #[error("Coincident particles: squared pair distance is zero")]
    CoincidentParticles,
}

/// Lennard-Jones 12-6 interaction in reduced units, truncated (not shifted) at `cutoff`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    cutoff: f64,
    cutoff_squared: f64,
}

impl LennardJones {
    pub fn new(cutoff: f64) -> Result<Self, PotentialError> {
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(PotentialError::InvalidCutoff(cutoff));
        }
        Ok(Self {
            cutoff,
            cutoff_squared: cutoff * cutoff,
        })
    }

    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    #[inline]
    pub fn cutoff_squared(&self) -> f64 {
        self.cutoff_squared
    }

    /// Pair energy as a function of the squared separation.
    ///
    /// Returns exactly zero at and beyond the cutoff. A zero separation is reported as
    /// [`PotentialError::CoincidentParticles`] instead of an infinite energy.
    #[inline]
    pub fn pair_energy(&self, squared_distance: f64) -> Result<f64, PotentialError> {
        if squared_distance >= self.cutoff_squared {
            return Ok(0.0);
        }
        if squared_distance <= 0.0 {
            return Err(PotentialError::CoincidentParticles);
        }
        let inv_r6 = (1.0 / squared_distance).powi(3);
        Ok(4.0 * (inv_r6 * inv_r6 - inv_r6))
    }

    /// Energy jump at `r = rc` introduced by the unshifted truncation.
    pub fn tail_discontinuity(&self) -> f64 {
        let inv_r6 = (1.0 / self.cutoff_squared).powi(3);
        4.0 * (inv_r6 * inv_r6 - inv_r6)
    }
}

/// Truncated Lennard-Jones pair energy for a squared distance and cutoff radius.
///
/// # Errors
///
/// [`PotentialError::InvalidCutoff`] for a non-positive cutoff and
/// [`PotentialError::CoincidentParticles`] when `squared_distance` is zero.
#[inline]
pub fn pair_energy(squared_distance: f64, cutoff: f64) -> Result<f64, PotentialError> {
    LennardJones::new(cutoff)?.pair_energy(squared_distance)
}
