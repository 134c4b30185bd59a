use crate::core::analysis::{EnergyStatistics, energy_statistics};
use crate::core::energy::total_energy;
use crate::core::initializer::place_non_overlapping;
use crate::core::models::system::ParticleSystem;
use crate::engine::cancel::StopSignal;
use crate::engine::config::{ConfigError, SimulationConfig};
use crate::engine::error::EngineError;
use crate::engine::metropolis::{MetropolisEngine, MetropolisParams, MoveOutcome};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{AcceptanceStats, TrajectorySample};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

const PROGRESS_UPDATES_PER_RUN: u64 = 100;

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub config: SimulationConfig,
    pub samples: Vec<TrajectorySample>,
    pub acceptance: AcceptanceStats,
    pub final_system: ParticleSystem,
    /// Energy tracked through incremental updates.
    pub final_energy: f64,
    /// Energy of `final_system` evaluated from scratch.
    pub recomputed_energy: f64,
    pub steps_completed: u64,
    pub cancelled: bool,
}

impl SimulationResult {
    pub fn acceptance_ratio(&self) -> f64 {
        self.acceptance.ratio()
    }

    pub fn energies(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.energy).collect()
    }

    pub fn energy_drift(&self) -> f64 {
        (self.final_energy - self.recomputed_energy).abs()
    }

    /// Statistics over the sampled energies, or `None` when nothing was sampled.
    pub fn energy_statistics(&self) -> Option<EnergyStatistics> {
        energy_statistics(
            &self.energies(),
            self.final_system.len(),
            self.config.beta(),
        )
        .ok()
    }
}

/// One NVT Markov chain: the particle system, its tracked energy and a private random stream.
///
/// The stream is seeded once from the configuration and drawn first by the initializer
/// (when no starting system is supplied) and then by every step in sequence.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    engine: MetropolisEngine,
    system: ParticleSystem,
    energy: f64,
    rng: StdRng,
    acceptance: AcceptanceStats,
    samples: Vec<TrajectorySample>,
    steps_completed: u64,
}

impl Simulation {
    /// Validates `config` and places the initial particles without overlaps.
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let system = place_non_overlapping(
            config.particle_count(),
            config.simulation_box()?,
            config.placement.min_distance,
            config.placement.max_attempts,
            &mut rng,
        )?;
        Self::assemble(config, system, rng)
    }

    /// Starts the chain from a given configuration instead of a random placement.
    ///
    /// The system's box and particle count must agree with `config`.
    pub fn with_initial_system(
        config: SimulationConfig,
        system: ParticleSystem,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if system.simulation_box().length() != config.box_length {
            return Err(ConfigError::InitialSystemMismatch {
                expected: format!("box length {}", config.box_length),
                found: format!("box length {}", system.simulation_box().length()),
            }
            .into());
        }
        if system.len() != config.particle_count() {
            return Err(ConfigError::InitialSystemMismatch {
                expected: format!("{} particles", config.particle_count()),
                found: format!("{} particles", system.len()),
            }
            .into());
        }
        let rng = StdRng::seed_from_u64(config.seed);
        Self::assemble(config, system, rng)
    }

    fn assemble(
        config: SimulationConfig,
        system: ParticleSystem,
        rng: StdRng,
    ) -> Result<Self, EngineError> {
        let potential = config.potential()?;
        let engine = MetropolisEngine::new(
            potential,
            MetropolisParams {
                beta: config.beta(),
                max_displacement: config.max_displacement,
            },
        );
        let energy = total_energy(&system, &potential)?;

        Ok(Self {
            engine,
            system,
            energy,
            rng,
            acceptance: AcceptanceStats::default(),
            samples: Vec::new(),
            steps_completed: 0,
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    /// Incrementally tracked total energy.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn acceptance(&self) -> AcceptanceStats {
        self.acceptance
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn steps_completed(&self) -> u64 {
        self.steps_completed
    }

    pub fn is_finished(&self) -> bool {
        self.steps_completed >= self.config.n_steps
    }

    /// Total energy evaluated from scratch for the current positions.
    pub fn recompute_energy(&self) -> Result<f64, EngineError> {
        Ok(total_energy(&self.system, self.engine.potential())?)
    }

    /// Absolute disagreement between tracked and recomputed energy.
    pub fn energy_drift(&self) -> Result<f64, EngineError> {
        Ok((self.energy - self.recompute_energy()?).abs())
    }

    /// Advances the chain by one Monte Carlo step and records a sample when the
    /// step index is a multiple of `save_every`.
    pub fn step(&mut self) -> Result<MoveOutcome, EngineError> {
        let outcome = self
            .engine
            .step(&mut self.system, &mut self.energy, &mut self.rng)?;
        self.acceptance.record(outcome.is_accepted());

        if self.steps_completed % self.config.save_every == 0 {
            self.samples.push(TrajectorySample {
                step: self.steps_completed,
                energy: self.energy,
                system: self.system.clone(),
            });
        }
        self.steps_completed += 1;
        Ok(outcome)
    }

    /// Runs the remaining steps, stopping early once `stop` is raised.
    #[instrument(skip_all, name = "simulation_run", fields(seed = self.config.seed))]
    pub fn run(
        mut self,
        reporter: &ProgressReporter,
        stop: &StopSignal,
    ) -> Result<SimulationResult, EngineError> {
        let n_steps = self.config.n_steps;
        let report_every = (n_steps / PROGRESS_UPDATES_PER_RUN).max(1);

        reporter.report(Progress::PhaseStart {
            name: "Metropolis Sampling",
        });
        reporter.report(Progress::TaskStart {
            total_steps: n_steps,
        });
        info!(
            particles = self.system.len(),
            n_steps,
            initial_energy = self.energy,
            "Starting Metropolis sampling."
        );

        let mut cancelled = false;
        while !self.is_finished() {
            if stop.is_stop_requested() {
                cancelled = true;
                warn!(
                    steps_completed = self.steps_completed,
                    "Stop requested, ending run early."
                );
                break;
            }
            self.step()?;

            if self.steps_completed % report_every == 0 || self.is_finished() {
                reporter.report(Progress::TaskProgress {
                    completed: self.steps_completed,
                });
                if !reporter.is_silent() {
                    reporter.report(Progress::StatusUpdate {
                        text: format!(
                            "E = {:.4}, acceptance = {:.3}",
                            self.energy,
                            self.acceptance.ratio()
                        ),
                    });
                }
            }
        }
        reporter.report(Progress::TaskFinish);

        let recomputed_energy = self.recompute_energy()?;
        let drift = (self.energy - recomputed_energy).abs();
        debug!(
            tracked = self.energy,
            recomputed = recomputed_energy,
            drift,
            "Energy bookkeeping check."
        );
        info!(
            acceptance_ratio = self.acceptance.ratio(),
            steps_completed = self.steps_completed,
            samples = self.samples.len(),
            "Metropolis sampling finished."
        );
        reporter.report(Progress::Message(format!(
            "Acceptance ratio: {:.3}",
            self.acceptance.ratio()
        )));
        reporter.report(Progress::PhaseFinish);

        Ok(SimulationResult {
            config: self.config,
            samples: self.samples,
            acceptance: self.acceptance,
            final_system: self.system,
            final_energy: self.energy,
            recomputed_energy,
            steps_completed: self.steps_completed,
            cancelled,
        })
    }
}

/// Builds the initial configuration from `config` and runs the full chain.
#[instrument(skip_all, name = "simulate_workflow")]
pub fn run(
    config: SimulationConfig,
    reporter: &ProgressReporter,
    stop: &StopSignal,
) -> Result<SimulationResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Initialization",
    });
    warn_on_long_cutoff(&config);
    info!(
        particles = config.particle_count(),
        box_length = config.box_length,
        temperature = config.temperature,
        "Placing initial configuration."
    );
    let simulation = Simulation::new(config)?;
    reporter.report(Progress::PhaseFinish);

    simulation.run(reporter, stop)
}

/// Runs the chain starting from `initial_system`.
#[instrument(skip_all, name = "simulate_workflow")]
pub fn run_from(
    config: SimulationConfig,
    initial_system: ParticleSystem,
    reporter: &ProgressReporter,
    stop: &StopSignal,
) -> Result<SimulationResult, EngineError> {
    warn_on_long_cutoff(&config);
    Simulation::with_initial_system(config, initial_system)?.run(reporter, stop)
}

fn warn_on_long_cutoff(config: &SimulationConfig) {
    if config.cutoff >= 0.5 * config.box_length {
        warn!(
            cutoff = config.cutoff,
            box_length = config.box_length,
            "Cutoff radius reaches half the box length; the minimum-image convention will miss periodic neighbours."
        );
    }
}
