use super::config::ConfigError;
use crate::core::energy::EnergyError;
use crate::core::initializer::InitializationError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error(
        "Unsatisfiable density: only {placed} of {requested} particles could be placed after {attempts} attempts"
    )]
    UnsatisfiableDensity {
        placed: usize,
        requested: usize,
        attempts: u64,
    },

    #[error("Degenerate configuration: particles {first} and {second} coincide")]
    DegenerateConfiguration { first: usize, second: usize },

    #[error("Cannot run a Monte Carlo step on an empty particle system")]
    EmptySystem,

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<InitializationError> for EngineError {
    fn from(err: InitializationError) -> Self {
        match err {
            InitializationError::UnsatisfiableDensity {
                placed,
                requested,
                attempts,
                ..
            } => EngineError::UnsatisfiableDensity {
                placed,
                requested,
                attempts,
            },
        }
    }
}

impl From<EnergyError> for EngineError {
    fn from(err: EnergyError) -> Self {
        match err {
            EnergyError::DegenerateConfiguration { first, second } => {
                EngineError::DegenerateConfiguration { first, second }
            }
            other => EngineError::Internal(other.to_string()),
        }
    }
}
