use super::models::system::ParticleSystem;
use itertools::Itertools;
use std::f64::consts::PI;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No frames or energies were provided for analysis")]
    EmptyInput,
    #[error("Histogram needs at least one bin")]
    ZeroBins,
    #[error("Maximum radius {r_max} must be positive and at most half the box length ({half_box})")]
    InvalidRange { r_max: f64, half_box: f64 },
    #[error("Particle count must be non-zero for per-particle statistics")]
    NoParticles,
}

/// Radial distribution function `g(r)` sampled on equal-width shells.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialDistribution {
    /// Shell midpoints.
    pub radii: Vec<f64>,
    pub values: Vec<f64>,
}

/// Computes `g(r)` over `frames` using minimum-image pair distances up to `r_max`.
///
/// Each frame is normalized by its own ideal-gas pair density `N(N-1) / 2V`, so a
/// configuration of uncorrelated particles yields `g(r) ≈ 1` on every shell.
pub fn radial_distribution<'a, I>(
    frames: I,
    bins: usize,
    r_max: f64,
) -> Result<RadialDistribution, AnalysisError>
where
    I: IntoIterator<Item = &'a ParticleSystem>,
{
    if bins == 0 {
        return Err(AnalysisError::ZeroBins);
    }

    let width = r_max / bins as f64;
    let mut histogram = vec![0u64; bins];
    let mut ideal_pair_density = 0.0;
    let mut frame_count = 0usize;

    for frame in frames {
        let sim_box = frame.simulation_box();
        if !(r_max > 0.0 && r_max <= sim_box.half_length()) {
            return Err(AnalysisError::InvalidRange {
                r_max,
                half_box: sim_box.half_length(),
            });
        }
        frame_count += 1;

        let n = frame.len() as f64;
        ideal_pair_density += 0.5 * n * (n - 1.0) / sim_box.volume();

        for (a, b) in frame.positions().iter().tuple_combinations() {
            let r = sim_box.distance_squared(a, b).sqrt();
            if r < r_max {
                let bin = ((r / width) as usize).min(bins - 1);
                histogram[bin] += 1;
            }
        }
    }

    if frame_count == 0 {
        return Err(AnalysisError::EmptyInput);
    }

    let (radii, values) = histogram
        .iter()
        .enumerate()
        .map(|(k, &count)| {
            let r_lo = k as f64 * width;
            let r_hi = r_lo + width;
            let shell_volume = 4.0 / 3.0 * PI * (r_hi.powi(3) - r_lo.powi(3));
            let expected = ideal_pair_density * shell_volume;
            let g = if expected > 0.0 {
                count as f64 / expected
            } else {
                0.0
            };
            (r_lo + 0.5 * width, g)
        })
        .unzip();

    Ok(RadialDistribution { radii, values })
}

/// Canonical-ensemble summary of a sequence of sampled energies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyStatistics {
    pub samples: usize,
    pub mean: f64,
    pub variance: f64,
    pub mean_per_particle: f64,
    /// Excess heat capacity per particle, `β² ⟨δE²⟩ / N`.
    pub heat_capacity_per_particle: f64,
}

pub fn energy_statistics(
    energies: &[f64],
    particle_count: usize,
    beta: f64,
) -> Result<EnergyStatistics, AnalysisError> {
    if energies.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    if particle_count == 0 {
        return Err(AnalysisError::NoParticles);
    }

    let count = energies.len() as f64;
    let n = particle_count as f64;
    let mean = energies.iter().sum::<f64>() / count;
    let variance = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / count;

    Ok(EnergyStatistics {
        samples: energies.len(),
        mean,
        variance,
        mean_per_particle: mean / n,
        heat_capacity_per_particle: beta * beta * variance / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::SimulationBox;
    use crate::core::initializer::place_uniform;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn ideal_gas_radial_distribution_is_flat() {
        let sim_box = SimulationBox::new(10.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let frames: Vec<_> = (0..20)
            .map(|_| place_uniform(200, sim_box, &mut rng))
            .collect();

        let rdf = radial_distribution(&frames, 10, 5.0).unwrap();
        assert_eq!(rdf.radii.len(), 10);
        assert!((rdf.radii[0] - 0.25).abs() < TOLERANCE);
        for (r, g) in rdf.radii.iter().zip(&rdf.values).skip(1) {
            assert!((g - 1.0).abs() < 0.1, "g({r}) = {g}");
        }
    }

    #[test]
    fn radial_distribution_rejects_bad_arguments() {
        let sim_box = SimulationBox::new(10.0).unwrap();
        let frames = vec![place_uniform(5, sim_box, &mut StdRng::seed_from_u64(1))];

        assert_eq!(
            radial_distribution(&frames, 0, 2.0),
            Err(AnalysisError::ZeroBins)
        );
        assert!(matches!(
            radial_distribution(&frames, 10, 6.0),
            Err(AnalysisError::InvalidRange { .. })
        ));
        let empty: Vec<ParticleSystem> = Vec::new();
        assert_eq!(
            radial_distribution(&empty, 10, 2.0),
            Err(AnalysisError::EmptyInput)
        );
    }

    #[test]
    fn pair_inside_first_shell_is_binned_there() {
        let sim_box = SimulationBox::new(10.0).unwrap();
        let frame = ParticleSystem::from_arrays(sim_box, &[[1.0, 1.0, 1.0], [1.5, 1.0, 1.0]]);
        let rdf = radial_distribution([&frame], 5, 5.0).unwrap();
        assert!(rdf.values[0] > 0.0);
        assert!(rdf.values[1..].iter().all(|&g| g == 0.0));
    }

    #[test]
    fn energy_statistics_computes_population_moments() {
        let stats = energy_statistics(&[-10.0, -12.0, -14.0], 2, 0.5).unwrap();
        assert_eq!(stats.samples, 3);
        assert!((stats.mean + 12.0).abs() < TOLERANCE);
        assert!((stats.variance - 8.0 / 3.0).abs() < TOLERANCE);
        assert!((stats.mean_per_particle + 6.0).abs() < TOLERANCE);
        assert!((stats.heat_capacity_per_particle - 0.25 * (8.0 / 3.0) / 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn energy_statistics_rejects_empty_input() {
        assert_eq!(
            energy_statistics(&[], 10, 1.0),
            Err(AnalysisError::EmptyInput)
        );
        assert_eq!(
            energy_statistics(&[1.0], 0, 1.0),
            Err(AnalysisError::NoParticles)
        );
    }
}
