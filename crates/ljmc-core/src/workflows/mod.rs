//! # Workflows Module
//!
//! High-level entry points that turn a [`SimulationConfig`](crate::engine::config::SimulationConfig)
//! into finished runs.
//!
//! - [`simulate`] - Places the initial configuration and drives one Markov chain to completion
//! - [`ensemble`] - Runs independent chains (different seeds or parameters) side by side

pub mod ensemble;
pub mod simulate;
