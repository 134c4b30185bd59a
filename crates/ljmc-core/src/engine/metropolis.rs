//! Single-particle displacement moves under the Metropolis acceptance rule.
//!
//! One Monte Carlo step walks the cycle
//! `Idle → ProposalPending → {Accepted, Rejected} → Idle`:
//!
//! 1. [`MetropolisEngine::propose`] selects a particle, draws a trial displacement and
//!    evaluates the energy change, producing a pending [`MoveProposal`].
//! 2. [`MetropolisEngine::decide`] applies the acceptance criterion and turns the
//!    proposal into a [`MoveOutcome`].
//! 3. [`MetropolisEngine::commit`] writes an accepted move back into the system and the
//!    tracked energy; a rejected move leaves both untouched.
//!
//! Random numbers are consumed in a fixed order per step: the particle index, the
//! three displacement components, then (only when `ΔE ≥ 0`) one acceptance draw.

use super::error::EngineError;
use crate::core::energy::single_particle_delta;
use crate::core::models::system::ParticleSystem;
use crate::core::potentials::LennardJones;
use nalgebra::{Point3, Vector3};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetropolisParams {
    /// Inverse temperature `1 / T`.
    pub beta: f64,
    /// Full width of the per-axis trial displacement window.
    pub max_displacement: f64,
}

/// A trial move that has been evaluated but not yet accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveProposal {
    pub index: usize,
    pub old_position: Point3<f64>,
    pub new_position: Point3<f64>,
    pub delta_energy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Accepted(MoveProposal),
    Rejected(MoveProposal),
}

impl MoveOutcome {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveOutcome::Accepted(_))
    }

    #[inline]
    pub fn proposal(&self) -> &MoveProposal {
        match self {
            MoveOutcome::Accepted(p) | MoveOutcome::Rejected(p) => p,
        }
    }

    /// Change applied to the tracked energy: `ΔE` if accepted, zero otherwise.
    #[inline]
    pub fn applied_delta(&self) -> f64 {
        match self {
            MoveOutcome::Accepted(p) => p.delta_energy,
            MoveOutcome::Rejected(_) => 0.0,
        }
    }
}

/// Metropolis acceptance test for an energy change `delta_energy` at inverse temperature `beta`.
///
/// Downhill moves are accepted without touching the random stream, which also keeps
/// `exp(-βΔE)` from overflowing for large negative `ΔE`.
#[inline]
pub fn metropolis_accept(delta_energy: f64, beta: f64, rng: &mut impl Rng) -> bool {
    if delta_energy < 0.0 {
        return true;
    }
    rng.r#gen::<f64>() < (-beta * delta_energy).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetropolisEngine {
    potential: LennardJones,
    params: MetropolisParams,
}

impl MetropolisEngine {
    pub fn new(potential: LennardJones, params: MetropolisParams) -> Self {
        Self { potential, params }
    }

    #[inline]
    pub fn potential(&self) -> &LennardJones {
        &self.potential
    }

    #[inline]
    pub fn params(&self) -> &MetropolisParams {
        &self.params
    }

    /// Selects a particle uniformly, displaces it by up to `±max_displacement / 2` per axis,
    /// wraps the result into the box and evaluates `ΔE`.
    pub fn propose(
        &self,
        system: &ParticleSystem,
        rng: &mut impl Rng,
    ) -> Result<MoveProposal, EngineError> {
        if system.is_empty() {
            return Err(EngineError::EmptySystem);
        }

        let index = rng.gen_range(0..system.len());
        let old_position = *system
            .position(index)
            .ok_or_else(|| EngineError::Internal(format!("particle {index} vanished")))?;

        let displacement = Vector3::new(
            rng.r#gen::<f64>() - 0.5,
            rng.r#gen::<f64>() - 0.5,
            rng.r#gen::<f64>() - 0.5,
        ) * self.params.max_displacement;
        let new_position = system
            .simulation_box()
            .wrap(&(old_position + displacement));

        let delta_energy =
            single_particle_delta(system, index, &old_position, &new_position, &self.potential)?;

        Ok(MoveProposal {
            index,
            old_position,
            new_position,
            delta_energy,
        })
    }

    pub fn decide(&self, proposal: MoveProposal, rng: &mut impl Rng) -> MoveOutcome {
        if metropolis_accept(proposal.delta_energy, self.params.beta, rng) {
            MoveOutcome::Accepted(proposal)
        } else {
            MoveOutcome::Rejected(proposal)
        }
    }

    pub fn commit(
        &self,
        system: &mut ParticleSystem,
        energy: &mut f64,
        outcome: &MoveOutcome,
    ) -> Result<(), EngineError> {
        if let MoveOutcome::Accepted(proposal) = outcome {
            system
                .set_position(proposal.index, proposal.new_position)
                .map_err(|e| EngineError::Internal(e.to_string()))?;
            *energy += proposal.delta_energy;
        }
        Ok(())
    }

    /// Runs one full propose/decide/commit cycle.
    ///
    /// On error nothing is written back: `system` and `energy` are exactly as before the call.
    pub fn step(
        &self,
        system: &mut ParticleSystem,
        energy: &mut f64,
        rng: &mut impl Rng,
    ) -> Result<MoveOutcome, EngineError> {
        let proposal = self.propose(system, rng)?;
        let outcome = self.decide(proposal, rng);
        self.commit(system, energy, &outcome)?;
        Ok(outcome)
    }
}
