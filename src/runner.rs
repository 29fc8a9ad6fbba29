use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Command, FromArgMatches as _};
use log::info;

use crate::error::SirError;
use crate::execution_stats::{
    log_execution_statistics, print_execution_statistics, ExecutionProfilingCollector,
};
use crate::log::{set_log_level, LevelFilter, LogLevelSpec};
use crate::parameters::Parameters;
use crate::render::render_text;
use crate::report::{DemographicsReport, ReportOptions};
use crate::simulation::{RunSummary, Simulation};

/// Default cli arguments for the sir-grid runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for a JSON parameters file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional path for report output
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Optional prefix for report file names
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Replace an existing report file
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Log level, or comma separated `module=level` filters, e.g. `info,sir_grid::population=trace`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not print execution statistics at the end of the run
    #[arg(long)]
    pub no_stats: bool,

    /// Show a progress bar counting days
    #[arg(long)]
    pub progress: bool,
}

/// Model parameters given on the command line. Any value set here overrides the config file.
#[derive(Args, Debug, Default)]
pub struct SimulationArgs {
    /// Per-tick probability that an infectious cell infects a susceptible neighbour
    #[arg(long)]
    pub infection_rate: Option<f64>,

    /// Per-tick probability that an infectious cell recovers
    #[arg(long)]
    pub recovery_rate: Option<f64>,

    /// Last day to simulate
    #[arg(long)]
    pub max_days: Option<u64>,

    /// Cells per side of the grid
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Probability that a cell starts out infectious
    #[arg(long)]
    pub initial_infected_fraction: Option<f64>,

    /// Added to the seeding probability while no cell starts out infectious
    #[arg(long)]
    pub seeding_increment: Option<f64>,

    #[arg(long)]
    pub contact_tracing_fraction: Option<f64>,

    #[arg(long)]
    pub quarantine_fraction: Option<f64>,

    #[arg(long)]
    pub masked_fraction: Option<f64>,

    #[arg(long)]
    pub introvert_fraction: Option<f64>,

    /// Probability that an introvert drops each neighbour
    #[arg(long)]
    pub introvert_avoidance: Option<f64>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Report file name; defaults to SIR_<infection>_<recovery>_<max_days>_<grid_size>.csv
    #[arg(long)]
    pub output: Option<String>,

    /// Print a text frame of the grid after every day
    #[arg(long)]
    pub render: bool,
}

impl SimulationArgs {
    /// Overwrites every parameter that was given on the command line.
    pub fn apply(&self, parameters: &mut Parameters) {
        fn set<T: Copy>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        set(&mut parameters.infection_rate, self.infection_rate);
        set(&mut parameters.recovery_rate, self.recovery_rate);
        set(&mut parameters.max_days, self.max_days);
        set(&mut parameters.grid_size, self.grid_size);
        set(
            &mut parameters.initial_infected_fraction,
            self.initial_infected_fraction,
        );
        set(&mut parameters.seeding_increment, self.seeding_increment);
        set(
            &mut parameters.contact_tracing_fraction,
            self.contact_tracing_fraction,
        );
        set(&mut parameters.quarantine_fraction, self.quarantine_fraction);
        set(&mut parameters.masked_fraction, self.masked_fraction);
        set(&mut parameters.introvert_fraction, self.introvert_fraction);
        set(&mut parameters.introvert_avoidance, self.introvert_avoidance);
        set(&mut parameters.threads, self.threads);
    }
}

#[derive(Args)]
pub struct PlaceholderCustom {}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunOutput {
    pub parameters: Parameters,
    pub summary: RunSummary,
    pub report_path: PathBuf,
}

fn create_sir_cli() -> Command {
    let cli = Command::new("sir-grid").about("Synchronous SIR cellular automaton");
    let cli = BaseArgs::augment_args(cli);
    SimulationArgs::augment_args(cli)
}

/// Runs a simulation with custom cli arguments.
///
/// # Parameters
/// - `setup_fn`: A function that takes the `Parameters` about to be used, the `BaseArgs` and
///   an `Option<A>` where A is the custom cli arguments struct. It may adjust the parameters
///   before they are validated.
///
/// # Errors
/// Returns an error if argument parsing, the setup function or the run fails
pub fn run_with_custom_args<A, F>(setup_fn: F) -> Result<RunOutput, Box<dyn std::error::Error>>
where
    A: Args,
    F: Fn(&mut Parameters, &BaseArgs, Option<A>) -> Result<(), SirError>,
{
    let mut cli = create_sir_cli();
    cli = A::augment_args(cli);
    let matches = cli.get_matches();

    let base_args_matches = BaseArgs::from_arg_matches(&matches)?;
    let simulation_args_matches = SimulationArgs::from_arg_matches(&matches)?;
    let custom_matches = A::from_arg_matches(&matches)?;
    run_with_args_internal(
        base_args_matches,
        simulation_args_matches,
        Some(custom_matches),
        setup_fn,
    )
}

/// Parses the default command line and runs a simulation.
///
/// # Errors
/// Returns an error if argument parsing or the run fails
pub fn run_with_args() -> Result<RunOutput, Box<dyn std::error::Error>> {
    let cli = create_sir_cli();
    let matches = cli.get_matches();

    let base_args_matches = BaseArgs::from_arg_matches(&matches)?;
    let simulation_args_matches = SimulationArgs::from_arg_matches(&matches)?;
    run_with_args_internal(
        base_args_matches,
        simulation_args_matches,
        None,
        |_, _, _: Option<PlaceholderCustom>| Ok(()),
    )
}

fn configure_logging(args: &BaseArgs) -> Result<(), SirError> {
    if let Some(spec) = &args.log_level {
        let spec: LogLevelSpec = spec.parse()?;
        spec.apply();
    } else if args.verbose > 0 {
        set_log_level(match args.verbose {
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }
    Ok(())
}

fn report_options(args: &BaseArgs) -> ReportOptions {
    let mut options = ReportOptions::new();
    options
        .file_prefix(&args.file_prefix)
        .overwrite(args.force_overwrite);
    if !args.output_dir.is_empty() {
        options.directory(PathBuf::from(&args.output_dir));
    }
    options
}

fn write_frame(simulation_frame: &str) -> Result<(), SirError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(simulation_frame.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

pub(crate) fn run_with_args_internal<A, F>(
    args: BaseArgs,
    simulation_args: SimulationArgs,
    custom_args: Option<A>,
    setup_fn: F,
) -> Result<RunOutput, Box<dyn std::error::Error>>
where
    F: Fn(&mut Parameters, &BaseArgs, Option<A>) -> Result<(), SirError>,
{
    configure_logging(&args)?;

    // Optionally load parameters from a file
    let mut parameters = if args.config.is_empty() {
        Parameters::default()
    } else {
        info!("Loading parameters from: {}", args.config);
        Parameters::load(Path::new(&args.config))?
    };
    simulation_args.apply(&mut parameters);
    setup_fn(&mut parameters, &args, custom_args)?;
    parameters.validate()?;

    let report_name = simulation_args
        .output
        .clone()
        .unwrap_or_else(|| format!("{}.csv", parameters.default_report_name()));
    let mut collector = (!args.no_stats).then(ExecutionProfilingCollector::new);
    // The report file is only created once the simulation is ready to run.
    let mut simulation = Simulation::new(parameters, args.random_seed)?;
    let mut report = DemographicsReport::with_options(&report_options(&args), &report_name)?;
    let cells = simulation.population().len();

    if simulation_args.render {
        write_frame(&render_text(&simulation.population().snapshot()))?;
    }
    #[cfg(feature = "progress_bar")]
    if args.progress {
        crate::progress::init_day_progress_bar(simulation.parameters().max_days);
    }

    let result = simulation.run_with(|day, demographics, population| {
        report.record(day, demographics)?;
        if simulation_args.render {
            write_frame(&render_text(&population.snapshot()))?;
        }
        #[cfg(feature = "progress_bar")]
        crate::progress::update_day_progress(day);
        if let Some(collector) = collector.as_mut() {
            collector.refresh();
        }
        Ok(())
    });

    #[cfg(feature = "progress_bar")]
    crate::progress::finish_day_progress();
    let summary = result?;

    if let Some(collector) = collector.as_mut() {
        let stats = collector.compute_final_statistics(cells, summary.days);
        print_execution_statistics(&stats);
        log_execution_statistics(&stats);
    }

    Ok(RunOutput {
        parameters: simulation.parameters().clone(),
        summary,
        report_path: report.path().to_path_buf(),
    })
}
