//! # Engine Module
//!
//! The stateful half of the library: everything needed to advance a single Markov chain.
//!
//! - **Configuration** ([`config`]) - Run parameters, validation and the config builder
//! - **Metropolis Engine** ([`metropolis`]) - The propose/decide/commit state machine
//! - **Run State** ([`state`]) - Trajectory samples and acceptance statistics
//! - **Progress Monitoring** ([`progress`]) - Optional callbacks for front ends
//! - **Cancellation** ([`cancel`]) - Cooperative stop requests between steps
//! - **Error Handling** ([`error`]) - The engine error taxonomy

pub mod cancel;
pub mod config;
pub mod error;
pub mod metropolis;
pub mod progress;
pub mod state;
