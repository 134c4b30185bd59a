use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "LJMC Developers",
    version,
    about = "LJMC CLI - Canonical-ensemble Metropolis Monte Carlo sampling of a truncated Lennard-Jones fluid in a periodic cubic box.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used for independent runs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single Metropolis Monte Carlo simulation and write its outputs.
    Run(RunArgs),
    /// Run independent simulations that differ only in their random seed.
    Ensemble(EnsembleArgs),
    /// Print the built-in default configuration as TOML.
    Defaults,
}

/// Parameters shared by every command that launches a simulation.
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that receives all output files (created if missing).
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    // --- System Overrides ---
    /// Override the edge length of the periodic cubic box.
    #[arg(short = 'L', long, value_name = "FLOAT")]
    pub box_length: Option<f64>,

    /// Override the number density (particle count is floor(rho * L^3)).
    #[arg(short = 'r', long, value_name = "FLOAT", conflicts_with = "particles")]
    pub density: Option<f64>,

    /// Use an explicit particle count instead of a density.
    #[arg(short = 'N', long, value_name = "INT")]
    pub particles: Option<usize>,

    /// Override the temperature in reduced units.
    #[arg(short = 'T', long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Override the cutoff radius of the pair potential.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    // --- Sampling Overrides ---
    /// Override the number of Monte Carlo steps.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<u64>,

    /// Override the maximum single-particle displacement.
    #[arg(short = 'd', long, value_name = "FLOAT")]
    pub max_displacement: Option<f64>,

    /// Override the sampling stride (a sample is stored every N steps, starting at step 0).
    #[arg(long, value_name = "INT")]
    pub save_every: Option<u64>,

    /// Set a specific configuration value, overriding the config file and flags.
    /// Can be used multiple times. Example: -S system.temperature=1.2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Override the random seed.
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Start from the last frame of an XYZ file instead of a random placement.
    #[arg(long, value_name = "PATH")]
    pub initial_config: Option<PathBuf>,

    /// Also write the radial distribution function with this many bins.
    #[arg(long, value_name = "INT")]
    pub rdf_bins: Option<usize>,
}

/// Arguments for the `ensemble` subcommand.
#[derive(Args, Debug)]
pub struct EnsembleArgs {
    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Comma-separated random seeds, one independent run per seed.
    #[arg(long, required = true, value_delimiter = ',', value_name = "SEEDS")]
    pub seeds: Vec<u64>,
}
