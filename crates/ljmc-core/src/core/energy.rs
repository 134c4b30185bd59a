use super::models::system::ParticleSystem;
use super::potentials::{LennardJones, PotentialError};
use itertools::Itertools;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnergyError {
    #[error("Degenerate configuration: particles {first} and {second} are at zero separation")]
    DegenerateConfiguration { first: usize, second: usize },

    #[error("Particle index {index} is out of range for a system of {len} particles")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Potential evaluation failed: {0}")]
    Potential(PotentialError),
}

#[inline]
fn pair_term(
    potential: &LennardJones,
    squared_distance: f64,
    first: usize,
    second: usize,
) -> Result<f64, EnergyError> {
    potential
        .pair_energy(squared_distance)
        .map_err(|e| match e {
            PotentialError::CoincidentParticles => {
                EnergyError::DegenerateConfiguration { first, second }
            }
            other => EnergyError::Potential(other),
        })
}

/// Total potential energy of the system, summed over unique pairs `i < j`.
///
/// Pairs are visited in ascending `i`, then ascending `j`, so the result is
/// bit-reproducible for identical positions.
pub fn total_energy(system: &ParticleSystem, potential: &LennardJones) -> Result<f64, EnergyError> {
    let positions = system.positions();
    let sim_box = system.simulation_box();

    let mut energy = 0.0;
    for (i, j) in (0..positions.len()).tuple_combinations() {
        let r2 = sim_box.distance_squared(&positions[i], &positions[j]);
        energy += pair_term(potential, r2, i, j)?;
    }
    Ok(energy)
}

/// Energy change caused by moving particle `index` from `old_position` to `new_position`,
/// with every other particle held at its current position.
///
/// Equivalent to the difference of two [`total_energy`] evaluations at O(N) cost.
pub fn single_particle_delta(
    system: &ParticleSystem,
    index: usize,
    old_position: &Point3<f64>,
    new_position: &Point3<f64>,
    potential: &LennardJones,
) -> Result<f64, EnergyError> {
    let positions = system.positions();
    if index >= positions.len() {
        return Err(EnergyError::IndexOutOfRange {
            index,
            len: positions.len(),
        });
    }
    let sim_box = system.simulation_box();

    let mut delta = 0.0;
    for (j, other) in positions.iter().enumerate() {
        if j == index {
            continue;
        }
        let r2_old = sim_box.distance_squared(old_position, other);
        let r2_new = sim_box.distance_squared(new_position, other);
        delta += pair_term(potential, r2_new, index, j)? - pair_term(potential, r2_old, index, j)?;
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::SimulationBox;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn lj() -> LennardJones {
        LennardJones::new(2.5).unwrap()
    }

    fn two_particle_system() -> ParticleSystem {
        ParticleSystem::from_arrays(
            SimulationBox::new(10.0).unwrap(),
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        )
    }

    fn random_system(n: usize, length: f64, seed: u64) -> ParticleSystem {
        let mut rng = StdRng::seed_from_u64(seed);
        let sim_box = SimulationBox::new(length).unwrap();
        let coords: Vec<[f64; 3]> = (0..n)
            .map(|_| {
                [
                    rng.r#gen::<f64>() * length,
                    rng.r#gen::<f64>() * length,
                    rng.r#gen::<f64>() * length,
                ]
            })
            .collect();
        ParticleSystem::from_arrays(sim_box, &coords)
    }

    #[test]
    fn total_energy_of_pair_at_unit_distance_is_zero() {
        let energy = total_energy(&two_particle_system(), &lj()).unwrap();
        assert_eq!(energy, 0.0);
    }

    #[test]
    fn moving_pair_to_distance_two_changes_energy_by_exact_pair_difference() {
        let system = two_particle_system();
        let potential = lj();
        let old = *system.position(1).unwrap();
        let new = Point3::new(2.0, 0.0, 0.0);

        let delta = single_particle_delta(&system, 1, &old, &new, &potential).unwrap();
        let expected = potential.pair_energy(4.0).unwrap() - potential.pair_energy(1.0).unwrap();
        assert_eq!(delta, expected);

        let mut moved = system.clone();
        moved.set_position(1, new).unwrap();
        let after = total_energy(&moved, &potential).unwrap();
        assert_eq!(after - total_energy(&system, &potential).unwrap(), expected);
    }

    #[test]
    fn total_energy_respects_minimum_image_across_boundary() {
        let system = ParticleSystem::from_arrays(
            SimulationBox::new(10.0).unwrap(),
            &[[0.5, 5.0, 5.0], [9.5, 5.0, 5.0]],
        );
        let energy = total_energy(&system, &lj()).unwrap();
        assert_eq!(energy, 0.0);

        let far = ParticleSystem::from_arrays(
            SimulationBox::new(10.0).unwrap(),
            &[[0.5, 5.0, 5.0], [3.5, 5.0, 5.0]],
        );
        assert_eq!(total_energy(&far, &lj()).unwrap(), 0.0);
    }

    #[test]
    fn single_particle_delta_matches_difference_of_totals() {
        let potential = lj();
        for seed in 0..20 {
            let system = random_system(40, 6.0, seed);
            let mut rng = StdRng::seed_from_u64(seed + 1000);
            let index = rng.gen_range(0..system.len());
            let old = *system.position(index).unwrap();
            let shift = nalgebra::Vector3::new(
                rng.r#gen::<f64>() - 0.5,
                rng.r#gen::<f64>() - 0.5,
                rng.r#gen::<f64>() - 0.5,
            ) * 0.8;
            let new = system.simulation_box().wrap(&(old + shift));

            let before = total_energy(&system, &potential).unwrap();
            let delta = single_particle_delta(&system, index, &old, &new, &potential).unwrap();
            let mut moved = system.clone();
            moved.set_position(index, new).unwrap();
            let after = total_energy(&moved, &potential).unwrap();

            let tolerance = 1e-9 * before.abs().max(after.abs()).max(1.0);
            assert!(
                (delta - (after - before)).abs() < tolerance,
                "seed {seed}: delta {delta} vs {}",
                after - before
            );
        }
    }

    #[test]
    fn total_energy_is_deterministic() {
        let system = random_system(60, 7.0, 7);
        let a = total_energy(&system, &lj()).unwrap();
        let b = total_energy(&system, &lj()).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn coincident_particles_are_reported_as_degenerate() {
        let system = ParticleSystem::from_arrays(
            SimulationBox::new(10.0).unwrap(),
            &[[1.0, 1.0, 1.0], [3.0, 3.0, 3.0], [1.0, 1.0, 1.0]],
        );
        assert_eq!(
            total_energy(&system, &lj()),
            Err(EnergyError::DegenerateConfiguration {
                first: 0,
                second: 2
            })
        );
    }

    #[test]
    fn move_onto_another_particle_is_degenerate() {
        let system = two_particle_system();
        let old = *system.position(1).unwrap();
        let result = single_particle_delta(&system, 1, &old, &Point3::origin(), &lj());
        assert_eq!(
            result,
            Err(EnergyError::DegenerateConfiguration {
                first: 1,
                second: 0
            })
        );
    }

    #[test]
    fn single_particle_delta_rejects_out_of_range_index() {
        let system = two_particle_system();
        let p = Point3::origin();
        assert!(matches!(
            single_particle_delta(&system, 5, &p, &p, &lj()),
            Err(EnergyError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }
}
