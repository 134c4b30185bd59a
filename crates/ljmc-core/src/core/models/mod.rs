//! Data structures describing the simulated particles.
//!
//! The only model is [`system::ParticleSystem`]: an ordered, fixed-size set of positions
//! living in a periodic [`SimulationBox`](crate::core::geometry::SimulationBox).

pub mod system;
