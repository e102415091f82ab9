use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches as _};
use log::info;

use crate::config::load_parameters_from_json;
use crate::error::EpiError;
use crate::log::set_log_level_from_str;
use crate::rate::RateFunction;
use crate::simulation::Simulation;

/// Name of the CSV written to `--output-dir`.
pub const STATUS_REPORT_FILE: &str = "status.csv";

/// Command line arguments for a simulation run
#[derive(Args, Debug, Clone)]
pub struct BaseArgs {
    /// Path to the JSON simulation parameters
    #[arg(short, long)]
    pub config: PathBuf,

    /// Random seed, overriding the parameters file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Number of ticks to run, overriding the parameters file
    #[arg(short, long)]
    pub ticks: Option<usize>,

    /// Force-of-infection kernel, overriding the parameters file
    #[arg(long, value_enum)]
    pub rate_function: Option<RateFunction>,

    /// Optional directory for the status report
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

fn create_cli() -> Command {
    let cli = Command::new("epigraph").about("Runs a compartmental epidemic over a city network");
    BaseArgs::augment_args(cli)
}

/// Parses the process arguments and runs the simulation they describe.
///
/// # Errors
/// Returns an error if argument parsing, loading the parameters or the run fails
#[allow(clippy::missing_errors_doc)]
pub fn run_with_args() -> Result<Simulation, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run(&args)?)
}

/// Loads parameters, applies command line overrides, runs every tick and
/// returns the finished simulation.
///
/// # Errors
/// Returns an error if the parameters are invalid or the report cannot be written
pub fn run(args: &BaseArgs) -> Result<Simulation, EpiError> {
    if let Some(level) = &args.log_level {
        set_log_level_from_str(level)?;
    }

    let mut parameters = load_parameters_from_json(&args.config)?;
    if let Some(seed) = args.random_seed {
        parameters.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        parameters.ticks = ticks;
    }
    if let Some(rate_function) = args.rate_function {
        parameters.rate_function = rate_function;
    }
    info!(
        "seed {}, {} ticks, {} rate function",
        parameters.seed, parameters.ticks, parameters.rate_function
    );

    let mut simulation = Simulation::from_parameters(&parameters)?;
    if let Some(output_dir) = &args.output_dir {
        simulation.add_report(&output_dir.join(STATUS_REPORT_FILE))?;
    }
    simulation.run(parameters.ticks)?;
    Ok(simulation)
}

/// One block per city and disease with the final compartment counts.
#[must_use]
pub fn summarize(simulation: &Simulation) -> String {
    let mut blocks = Vec::new();
    for population in simulation.network().nodes() {
        for disease in simulation.diseases() {
            if let Some(summary) = population.summary(disease) {
                blocks.push(summary);
            }
        }
    }
    blocks.join("\n")
}
