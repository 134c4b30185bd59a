//! # LJMC Core Library
//!
//! Canonical-ensemble (NVT) Metropolis Monte Carlo sampling of point particles in a periodic
//! cubic box interacting through a truncated Lennard-Jones potential.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless physics: periodic geometry, the pair potential,
//!   total and incremental energy evaluation, the particle system model, the initial placement
//!   of particles and post-run analysis.
//!
//! - **[`engine`]: The Logic Core.** The Metropolis state machine together with run
//!   configuration, error types, progress reporting, cancellation and run statistics.
//!
//! - **[`workflows`]: The Public API.** The sampler that drives a single Markov chain for a
//!   configured number of steps, and an ensemble runner for independent chains.
//!
//! The library never touches the filesystem. Positions and energies are exposed as plain
//! numeric data for external serializers and front ends.

pub mod core;
pub mod engine;
pub mod workflows;
