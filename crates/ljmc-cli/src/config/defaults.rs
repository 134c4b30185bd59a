use ljmc::core::initializer::{DEFAULT_MAX_PLACEMENT_ATTEMPTS, DEFAULT_MIN_DISTANCE};

pub struct DefaultsConfig {
    pub box_length: f64,
    pub density: f64,
    pub temperature: f64,
    pub cutoff: f64,
    pub n_steps: u64,
    pub max_displacement: f64,
    pub save_every: u64,
    pub seed: u64,
    pub min_distance: f64,
    pub max_placement_attempts: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            box_length: 10.0,
            density: 0.1,
            temperature: 0.4,
            cutoff: 2.5,
            n_steps: 20_000,
            max_displacement: 0.4,
            save_every: 10,
            seed: 42,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        }
    }
}
