use super::geometry::SimulationBox;
use super::models::system::ParticleSystem;
use nalgebra::Point3;
use rand::Rng;
use thiserror::Error;

pub const DEFAULT_MIN_DISTANCE: f64 = 0.8;
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u64 = 1_000_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InitializationError {
    #[error(
        "Unsatisfiable density: placed {placed} of {requested} particles with minimum separation {min_distance} after {attempts} attempts"
    )]
    UnsatisfiableDensity {
        placed: usize,
        requested: usize,
        attempts: u64,
        min_distance: f64,
    },
}

#[inline]
fn random_point(simulation_box: &SimulationBox, rng: &mut impl Rng) -> Point3<f64> {
    let length = simulation_box.length();
    let trial = Point3::new(
        rng.r#gen::<f64>() * length,
        rng.r#gen::<f64>() * length,
        rng.r#gen::<f64>() * length,
    );
    simulation_box.wrap(&trial)
}

/// Places `count` particles uniformly at random, overlaps allowed.
pub fn place_uniform(
    count: usize,
    simulation_box: SimulationBox,
    rng: &mut impl Rng,
) -> ParticleSystem {
    let positions = (0..count)
        .map(|_| random_point(&simulation_box, rng))
        .collect();
    ParticleSystem::new(simulation_box, positions)
}

/// Places `count` particles by random sequential insertion so that every pair of
/// particles is strictly farther apart than `min_distance` under the minimum-image
/// convention.
///
/// Each trial position costs one attempt and places at most one particle, so a
/// `count` above `max_attempts` fails immediately. Otherwise the search gives up once
/// `max_attempts` trials have been spent in total.
///
/// # Errors
///
/// [`InitializationError::UnsatisfiableDensity`] when the attempt budget runs out.
pub fn place_non_overlapping(
    count: usize,
    simulation_box: SimulationBox,
    min_distance: f64,
    max_attempts: u64,
    rng: &mut impl Rng,
) -> Result<ParticleSystem, InitializationError> {
    if count as u64 > max_attempts {
        return Err(InitializationError::UnsatisfiableDensity {
            placed: 0,
            requested: count,
            attempts: 0,
            min_distance,
        });
    }

    let min_distance_squared = min_distance * min_distance;
    let capacity = count.min(usize::try_from(max_attempts).unwrap_or(usize::MAX));
    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(capacity);
    let mut attempts = 0u64;

    while positions.len() < count {
        if attempts >= max_attempts {
            return Err(InitializationError::UnsatisfiableDensity {
                placed: positions.len(),
                requested: count,
                attempts,
                min_distance,
            });
        }
        attempts += 1;

        let trial = random_point(&simulation_box, rng);
        let clear = positions
            .iter()
            .all(|p| simulation_box.distance_squared(&trial, p) > min_distance_squared);
        if clear {
            positions.push(trial);
        }
    }

    Ok(ParticleSystem::new(simulation_box, positions))
}
