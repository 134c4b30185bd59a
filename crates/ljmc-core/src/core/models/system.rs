use crate::core::geometry::SimulationBox;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SystemError {
    #[error("Particle index {index} is out of range for a system of {len} particles")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Positions of `N` point particles in a periodic cubic box.
///
/// The particle count is fixed at construction. Every stored position lies in
/// `[0, L)` on each axis; positions handed in from outside are wrapped first.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystem {
    simulation_box: SimulationBox,
    positions: Vec<Point3<f64>>,
}

impl ParticleSystem {
    pub fn new(simulation_box: SimulationBox, positions: Vec<Point3<f64>>) -> Self {
        let positions = positions
            .iter()
            .map(|p| simulation_box.wrap(p))
            .collect();
        Self {
            simulation_box,
            positions,
        }
    }

    pub fn from_arrays(simulation_box: SimulationBox, coordinates: &[[f64; 3]]) -> Self {
        let positions = coordinates.iter().map(|&c| Point3::from(c)).collect();
        Self::new(simulation_box, positions)
    }

    #[inline]
    pub fn simulation_box(&self) -> &SimulationBox {
        &self.simulation_box
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    #[inline]
    pub fn position(&self, index: usize) -> Option<&Point3<f64>> {
        self.positions.get(index)
    }

    /// Moves particle `index` to `position`, wrapping it into the box.
    pub fn set_position(&mut self, index: usize, position: Point3<f64>) -> Result<(), SystemError> {
        let len = self.positions.len();
        let slot = self
            .positions
            .get_mut(index)
            .ok_or(SystemError::IndexOutOfRange { index, len })?;
        *slot = self.simulation_box.wrap(&position);
        Ok(())
    }

    /// Particle number density `N / L³`.
    pub fn density(&self) -> f64 {
        self.positions.len() as f64 / self.simulation_box.volume()
    }

    /// Positions as plain `[x, y, z]` triples, in particle order.
    pub fn to_arrays(&self) -> Vec<[f64; 3]> {
        self.positions.iter().map(|p| [p.x, p.y, p.z]).collect()
    }
}
