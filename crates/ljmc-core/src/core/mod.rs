//! # Core Module
//!
//! Stateless building blocks of the simulation.
//!
//! - **Periodic Geometry** ([`geometry`]) - Wrapping and minimum-image displacements in a cubic box
//! - **Pair Potential** ([`potentials`]) - Lennard-Jones interaction with a hard, unshifted cutoff
//! - **Energy Evaluation** ([`energy`]) - Total system energy and single-particle move deltas
//! - **Particle Representation** ([`models`]) - The fixed-size particle system
//! - **Initial Placement** ([`initializer`]) - Random non-overlapping starting configurations
//! - **Analysis** ([`analysis`]) - Radial distribution function and energy statistics
//!
//! Everything here is expressed in reduced Lennard-Jones units (σ = ε = k_B = 1).

pub mod analysis;
pub mod energy;
pub mod geometry;
pub mod initializer;
pub mod models;
pub mod potentials;
