use crate::core::geometry::{GeometryError, SimulationBox};
use crate::core::initializer::{DEFAULT_MAX_PLACEMENT_ATTEMPTS, DEFAULT_MIN_DISTANCE};
use crate::core::potentials::{LennardJones, PotentialError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter '{name}' must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("Parameter 'save_every' must be at least 1")]
    InvalidSaveInterval,

    #[error("System would contain no particles ({0:?})")]
    EmptySystem(ParticleCount),

    #[error("Density {density} in a box of length {box_length} gives more particles than can be counted")]
    TooManyParticles { density: f64, box_length: f64 },

    #[error(
        "Initial configuration does not match the run parameters: expected {expected}, found {found}"
    )]
    InitialSystemMismatch { expected: String, found: String },

    #[error("Invalid simulation box: {0}")]
    Box(#[from] GeometryError),

    #[error("Invalid potential: {0}")]
    Potential(#[from] PotentialError),
}

/// How the number of particles is specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticleCount {
    /// Number density `ρ`; the count is `floor(ρ L³)`.
    Density(f64),
    Explicit(usize),
}

impl ParticleCount {
    pub fn resolve(&self, box_length: f64) -> usize {
        match *self {
            ParticleCount::Density(rho) => (rho * box_length.powi(3)).floor() as usize,
            ParticleCount::Explicit(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlacementConfig {
    pub min_distance: f64,
    pub max_attempts: u64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
            max_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

/// Parameters of a single NVT Metropolis run, in reduced Lennard-Jones units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimulationConfig {
    pub box_length: f64,
    pub particles: ParticleCount,
    pub temperature: f64,
    pub cutoff: f64,
    pub n_steps: u64,
    pub max_displacement: f64,
    pub save_every: u64,
    pub seed: u64,
    pub placement: PlacementConfig,
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation_box()?;
        self.potential()?;
        require_positive("temperature", self.temperature)?;
        require_positive("max_displacement", self.max_displacement)?;
        require_positive("min_distance", self.placement.min_distance)?;
        if let ParticleCount::Density(rho) = self.particles {
            require_positive("density", rho)?;
            // `as usize` saturates; anything at or past the limit is not a real count.
            if (rho * self.box_length.powi(3)).floor() >= usize::MAX as f64 {
                return Err(ConfigError::TooManyParticles {
                    density: rho,
                    box_length: self.box_length,
                });
            }
        }
        if self.save_every < 1 {
            return Err(ConfigError::InvalidSaveInterval);
        }
        if self.particle_count() == 0 {
            return Err(ConfigError::EmptySystem(self.particles));
        }
        Ok(())
    }

    pub fn particle_count(&self) -> usize {
        self.particles.resolve(self.box_length)
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        1.0 / self.temperature
    }

    pub fn simulation_box(&self) -> Result<SimulationBox, ConfigError> {
        Ok(SimulationBox::new(self.box_length)?)
    }

    pub fn potential(&self) -> Result<LennardJones, ConfigError> {
        Ok(LennardJones::new(self.cutoff)?)
    }

    /// Same run with a different random stream.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    box_length: Option<f64>,
    particles: Option<ParticleCount>,
    temperature: Option<f64>,
    cutoff: Option<f64>,
    n_steps: Option<u64>,
    max_displacement: Option<f64>,
    save_every: Option<u64>,
    seed: Option<u64>,
    min_distance: Option<f64>,
    max_placement_attempts: Option<u64>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn box_length(mut self, length: f64) -> Self {
        self.box_length = Some(length);
        self
    }
    pub fn density(mut self, rho: f64) -> Self {
        self.particles = Some(ParticleCount::Density(rho));
        self
    }
    pub fn particle_count(mut self, n: usize) -> Self {
        self.particles = Some(ParticleCount::Explicit(n));
        self
    }
    pub fn particles(mut self, particles: ParticleCount) -> Self {
        self.particles = Some(particles);
        self
    }
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }
    pub fn n_steps(mut self, steps: u64) -> Self {
        self.n_steps = Some(steps);
        self
    }
    pub fn max_displacement(mut self, max_disp: f64) -> Self {
        self.max_displacement = Some(max_disp);
        self
    }
    pub fn save_every(mut self, stride: u64) -> Self {
        self.save_every = Some(stride);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = Some(min_distance);
        self
    }
    pub fn max_placement_attempts(mut self, attempts: u64) -> Self {
        self.max_placement_attempts = Some(attempts);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let defaults = PlacementConfig::default();
        let config = SimulationConfig {
            box_length: self
                .box_length
                .ok_or(ConfigError::MissingParameter("box_length"))?,
            particles: self
                .particles
                .ok_or(ConfigError::MissingParameter("density or particle_count"))?,
            temperature: self
                .temperature
                .ok_or(ConfigError::MissingParameter("temperature"))?,
            cutoff: self.cutoff.ok_or(ConfigError::MissingParameter("cutoff"))?,
            n_steps: self
                .n_steps
                .ok_or(ConfigError::MissingParameter("n_steps"))?,
            max_displacement: self
                .max_displacement
                .ok_or(ConfigError::MissingParameter("max_displacement"))?,
            save_every: self
                .save_every
                .ok_or(ConfigError::MissingParameter("save_every"))?,
            seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
            placement: PlacementConfig {
                min_distance: self.min_distance.unwrap_or(defaults.min_distance),
                max_attempts: self.max_placement_attempts.unwrap_or(defaults.max_attempts),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::new()
            .box_length(10.0)
            .density(0.1)
            .temperature(0.4)
            .cutoff(2.5)
            .n_steps(20_000)
            .max_displacement(0.4)
            .save_every(10)
            .seed(42)
    }

    #[test]
    fn builder_produces_config_with_derived_quantities() {
        let config = reference_builder().build().unwrap();
        assert_eq!(config.particle_count(), 100);
        assert!((config.beta() - 2.5).abs() < 1e-12);
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn density_resolution_truncates_like_integer_cast() {
        assert_eq!(ParticleCount::Density(0.0999).resolve(10.0), 99);
        assert_eq!(ParticleCount::Explicit(7).resolve(10.0), 7);
    }

    #[test]
    fn builder_reports_first_missing_parameter() {
        let result = SimulationConfigBuilder::new().box_length(10.0).build();
        assert_eq!(
            result,
            Err(ConfigError::MissingParameter("density or particle_count"))
        );
    }

    #[test]
    fn non_positive_physical_parameters_are_rejected() {
        assert!(matches!(
            reference_builder().box_length(0.0).build(),
            Err(ConfigError::Box(GeometryError::InvalidBoxLength(_)))
        ));
        assert!(matches!(
            reference_builder().cutoff(-1.0).build(),
            Err(ConfigError::Potential(PotentialError::InvalidCutoff(_)))
        ));
        assert_eq!(
            reference_builder().temperature(0.0).build(),
            Err(ConfigError::NotPositive {
                name: "temperature",
                value: 0.0
            })
        );
        assert!(matches!(
            reference_builder().max_displacement(-0.1).build(),
            Err(ConfigError::NotPositive {
                name: "max_displacement",
                ..
            })
        ));
    }

    #[test]
    fn zero_save_interval_is_rejected() {
        assert_eq!(
            reference_builder().save_every(0).build(),
            Err(ConfigError::InvalidSaveInterval)
        );
    }

    #[test]
    fn empty_system_is_rejected() {
        assert!(matches!(
            reference_builder().density(0.0001).build(),
            Err(ConfigError::EmptySystem(_))
        ));
        assert!(matches!(
            reference_builder().particle_count(0).build(),
            Err(ConfigError::EmptySystem(_))
        ));
    }

    #[test]
    fn density_beyond_countable_particles_is_rejected() {
        assert_eq!(
            reference_builder().density(1e20).build(),
            Err(ConfigError::TooManyParticles {
                density: 1e20,
                box_length: 10.0
            })
        );
        assert!(matches!(
            reference_builder().density(f64::MAX).build(),
            Err(ConfigError::TooManyParticles { .. })
        ));
    }

    #[test]
    fn zero_steps_is_a_valid_run_length() {
        assert!(reference_builder().n_steps(0).build().is_ok());
    }

    #[test]
    fn with_seed_changes_only_the_seed() {
        let config = reference_builder().build().unwrap();
        let reseeded = config.with_seed(7);
        assert_eq!(reseeded.seed, 7);
        assert_eq!(reseeded.box_length, config.box_length);
        assert_eq!(reseeded.particles, config.particles);
    }
}
