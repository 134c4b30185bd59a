pub mod defaults;

use crate::cli::SimulationArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use ljmc::engine::config as core_config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSystemConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    box_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    particles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cutoff: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSamplingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    n_steps: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_displacement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    save_every: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialInitializationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    min_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_attempts: Option<u64>,
}

/// Configuration as read from a TOML file; every key is optional.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialSimulationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<PartialSystemConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sampling: Option<PartialSamplingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initialization: Option<PartialInitializationConfig>,
}

impl PartialSimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the file named by `args.config`, or starts empty when none was given.
    pub fn load(args: &SimulationArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// The built-in defaults, fully populated.
    pub fn from_defaults() -> Self {
        let defaults = DefaultsConfig::default();
        Self {
            system: Some(PartialSystemConfig {
                box_length: Some(defaults.box_length),
                density: Some(defaults.density),
                particles: None,
                temperature: Some(defaults.temperature),
                cutoff: Some(defaults.cutoff),
            }),
            sampling: Some(PartialSamplingConfig {
                n_steps: Some(defaults.n_steps),
                max_displacement: Some(defaults.max_displacement),
                save_every: Some(defaults.save_every),
                seed: Some(defaults.seed),
            }),
            initialization: Some(PartialInitializationConfig {
                min_distance: Some(defaults.min_distance),
                max_attempts: Some(defaults.max_placement_attempts),
            }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Other(e.into()))
    }

    /// Resolves the final run configuration.
    ///
    /// Precedence, highest first: `--set` values, explicit flags, the file, built-in defaults.
    pub fn merge_with_cli(
        mut self,
        args: &SimulationArgs,
        seed: Option<u64>,
    ) -> Result<core_config::SimulationConfig> {
        self.apply_flags(args, seed);
        self.apply_set_values(&args.set_values)?;

        let system = self.system.take().unwrap_or_default();
        let sampling = self.sampling.take().unwrap_or_default();
        let initialization = self.initialization.take().unwrap_or_default();
        let defaults = DefaultsConfig::default();

        let particles = match (system.particles, system.density) {
            (Some(_), Some(_)) => {
                return Err(CliError::Config(
                    "`system.density` and `system.particles` cannot both be set.".to_string(),
                ));
            }
            (Some(n), None) => core_config::ParticleCount::Explicit(n),
            (None, Some(rho)) => core_config::ParticleCount::Density(rho),
            (None, None) => core_config::ParticleCount::Density(defaults.density),
        };

        core_config::SimulationConfigBuilder::new()
            .box_length(system.box_length.unwrap_or(defaults.box_length))
            .particles(particles)
            .temperature(system.temperature.unwrap_or(defaults.temperature))
            .cutoff(system.cutoff.unwrap_or(defaults.cutoff))
            .n_steps(sampling.n_steps.unwrap_or(defaults.n_steps))
            .max_displacement(
                sampling
                    .max_displacement
                    .unwrap_or(defaults.max_displacement),
            )
            .save_every(sampling.save_every.unwrap_or(defaults.save_every))
            .seed(sampling.seed.unwrap_or(defaults.seed))
            .min_distance(
                initialization
                    .min_distance
                    .unwrap_or(defaults.min_distance),
            )
            .max_placement_attempts(
                initialization
                    .max_attempts
                    .unwrap_or(defaults.max_placement_attempts),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_flags(&mut self, args: &SimulationArgs, seed: Option<u64>) {
        let system = self.system.get_or_insert_with(Default::default);
        if let Some(l) = args.box_length {
            system.box_length = Some(l);
        }
        if let Some(rho) = args.density {
            system.density = Some(rho);
            system.particles = None;
        }
        if let Some(n) = args.particles {
            system.particles = Some(n);
            system.density = None;
        }
        if let Some(t) = args.temperature {
            system.temperature = Some(t);
        }
        if let Some(rc) = args.cutoff {
            system.cutoff = Some(rc);
        }

        let sampling = self.sampling.get_or_insert_with(Default::default);
        if let Some(n) = args.steps {
            sampling.n_steps = Some(n);
        }
        if let Some(d) = args.max_displacement {
            sampling.max_displacement = Some(d);
        }
        if let Some(stride) = args.save_every {
            sampling.save_every = Some(stride);
        }
        if let Some(s) = seed {
            sampling.seed = Some(s);
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "system.box-length" => {
                    self.system.get_or_insert_with(Default::default).box_length =
                        Some(parse_value(key, value_str)?);
                }
                "system.density" => {
                    let s = self.system.get_or_insert_with(Default::default);
                    s.density = Some(parse_value(key, value_str)?);
                    s.particles = None;
                }
                "system.particles" => {
                    let s = self.system.get_or_insert_with(Default::default);
                    s.particles = Some(parse_value(key, value_str)?);
                    s.density = None;
                }
                "system.temperature" => {
                    self.system.get_or_insert_with(Default::default).temperature =
                        Some(parse_value(key, value_str)?);
                }
                "system.cutoff" => {
                    self.system.get_or_insert_with(Default::default).cutoff =
                        Some(parse_value(key, value_str)?);
                }
                "sampling.n-steps" => {
                    self.sampling.get_or_insert_with(Default::default).n_steps =
                        Some(parse_value(key, value_str)?);
                }
                "sampling.max-displacement" => {
                    self.sampling.get_or_insert_with(Default::default).max_displacement =
                        Some(parse_value(key, value_str)?);
                }
                "sampling.save-every" => {
                    self.sampling.get_or_insert_with(Default::default).save_every =
                        Some(parse_value(key, value_str)?);
                }
                "sampling.seed" => {
                    self.sampling.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str)?);
                }
                "initialization.min-distance" => {
                    self.initialization.get_or_insert_with(Default::default).min_distance =
                        Some(parse_value(key, value_str)?);
                }
                "initialization.max-attempts" => {
                    self.initialization.get_or_insert_with(Default::default).max_attempts =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use core_config::ParticleCount;
    use once_cell::sync::Lazy;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn parse_run_args(extra: &[&str]) -> (SimulationArgs, Option<u64>) {
        let mut args = vec!["ljmc", "run", "-o", "out"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Run(run) => (run.simulation, run.seed),
            _ => panic!("Expected 'run' subcommand"),
        }
    }

    #[test]
    fn empty_configuration_resolves_to_defaults() {
        let (args, seed) = parse_run_args(&[]);
        let config = PartialSimulationConfig::default()
            .merge_with_cli(&args, seed)
            .unwrap();

        assert_eq!(config.box_length, 10.0);
        assert_eq!(config.particles, ParticleCount::Density(0.1));
        assert_eq!(config.particle_count(), 100);
        assert_eq!(config.temperature, 0.4);
        assert_eq!(config.cutoff, 2.5);
        assert_eq!(config.n_steps, 20_000);
        assert_eq!(config.max_displacement, 0.4);
        assert_eq!(config.save_every, 10);
        assert_eq!(config.seed, 42);
        assert_eq!(config.placement.min_distance, 0.8);
    }

    #[test]
    fn file_values_override_defaults() {
        let path = write_config_file(
            "file_values.toml",
            r#"
            [system]
            box-length = 8.0
            particles = 50
            temperature = 1.2

            [sampling]
            n-steps = 1000
            seed = 7

            [initialization]
            min-distance = 0.9
            "#,
        );
        let (args, seed) = parse_run_args(&["-c", path.to_str().unwrap()]);
        let config = PartialSimulationConfig::load(&args)
            .unwrap()
            .merge_with_cli(&args, seed)
            .unwrap();

        assert_eq!(config.box_length, 8.0);
        assert_eq!(config.particles, ParticleCount::Explicit(50));
        assert_eq!(config.temperature, 1.2);
        assert_eq!(config.n_steps, 1000);
        assert_eq!(config.seed, 7);
        assert_eq!(config.placement.min_distance, 0.9);
        assert_eq!(config.cutoff, 2.5);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let path = write_config_file(
            "flag_override.toml",
            r#"
            [system]
            particles = 50 # Will be replaced by the density flag
            temperature = 1.2 # Will be overridden

            [sampling]
            seed = 7 # Will be overridden
            "#,
        );
        let (args, seed) = parse_run_args(&[
            "-c",
            path.to_str().unwrap(),
            "-T",
            "2.0",
            "-r",
            "0.2",
            "--seed",
            "99",
        ]);
        let config = PartialSimulationConfig::load(&args)
            .unwrap()
            .merge_with_cli(&args, seed)
            .unwrap();

        assert_eq!(config.temperature, 2.0);
        assert_eq!(config.particles, ParticleCount::Density(0.2));
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn set_values_take_precedence_over_flags() {
        let (args, seed) = parse_run_args(&[
            "-T",
            "2.0",
            "-S",
            "system.temperature=3.0",
            "-S",
            "sampling.save-every=5",
            "-S",
            "initialization.max-attempts=100",
        ]);
        let config = PartialSimulationConfig::default()
            .merge_with_cli(&args, seed)
            .unwrap();

        assert_eq!(config.temperature, 3.0);
        assert_eq!(config.save_every, 5);
        assert_eq!(config.placement.max_attempts, 100);
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["system.temperature", "system.unknown=1", "sampling.n-steps=many"] {
            let (args, seed) = parse_run_args(&["-S", bad]);
            let result = PartialSimulationConfig::default().merge_with_cli(&args, seed);
            assert!(matches!(result, Err(CliError::Config(_))), "{bad}");
        }
    }

    #[test]
    fn density_and_particles_in_file_conflict() {
        let path = write_config_file(
            "conflict.toml",
            "[system]\ndensity = 0.1\nparticles = 10\n",
        );
        let (args, seed) = parse_run_args(&["-c", path.to_str().unwrap()]);
        let result = PartialSimulationConfig::load(&args)
            .unwrap()
            .merge_with_cli(&args, seed);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("density")));
    }

    #[test]
    fn invalid_physical_values_surface_as_config_errors() {
        let (args, seed) = parse_run_args(&["--temperature=-1.0"]);
        let result = PartialSimulationConfig::default().merge_with_cli(&args, seed);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("temperature")));
    }

    #[test]
    fn unknown_keys_in_file_are_rejected() {
        let path = write_config_file("unknown.toml", "[system]\npressure = 1.0\n");
        let result = PartialSimulationConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn defaults_render_as_loadable_toml() {
        let rendered = PartialSimulationConfig::from_defaults()
            .to_toml_string()
            .unwrap();
        assert!(rendered.contains("[system]"));
        assert!(rendered.contains("box-length = 10.0"));
        assert!(rendered.contains("n-steps = 20000"));

        let reparsed = PartialSimulationConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed, PartialSimulationConfig::from_defaults());
    }
}
