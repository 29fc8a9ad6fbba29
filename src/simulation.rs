//! Day-by-day driver around a [`Population`].
use log::{debug, info};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::demographics::Demographics;
use crate::error::SirError;
use crate::parameters::Parameters;
use crate::population::Population;
use crate::random::RandomSource;
use crate::report::DemographicsReport;

/// What a finished run looked like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of ticks simulated.
    pub days: u64,
    pub final_demographics: Demographics,
    pub peak_infectious: usize,
    /// Day of the first tick that reached `peak_infectious`. `None` if no tick ran.
    pub peak_day: Option<u64>,
}

pub struct Simulation {
    parameters: Parameters,
    random: RandomSource,
    population: Population,
    seeding_fraction: f64,
    day: u64,
    pool: Option<ThreadPool>,
}

/// Generates populations, raising the seeding fraction by `seeding_increment` until at
/// least one cell starts out infectious.
fn seed_population(
    parameters: &Parameters,
    random: &RandomSource,
) -> Result<(Population, f64), SirError> {
    let mut fraction = parameters.initial_infected_fraction;
    loop {
        let population = Population::generate(&parameters.population_config(fraction), random)?;
        if population.infectious_count() > 0 {
            return Ok((population, fraction));
        }
        if parameters.seeding_increment <= 0.0 || fraction >= 1.0 {
            return Err(SirError::SirError(format!(
                "no initial infections at seeding fraction {fraction} and no room to raise it"
            )));
        }
        fraction = (fraction + parameters.seeding_increment).min(1.0);
        info!("no initial infections; retrying with seeding fraction {fraction:.4}");
    }
}

impl Simulation {
    /// Validates `parameters` and generates the initial population from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::ConfigurationError`] for invalid parameters, and
    /// [`SirError::SirError`] if the worker pool cannot be built or no infection can be seeded.
    pub fn new(parameters: Parameters, seed: u64) -> Result<Self, SirError> {
        parameters.validate()?;
        let random = RandomSource::new(seed);
        let (population, seeding_fraction) = seed_population(&parameters, &random)?;

        let pool = if parameters.threads > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(parameters.threads)
                .build()
                .map_err(|error| SirError::SirError(format!("thread pool: {error}")))?;
            Some(pool)
        } else {
            None
        };

        Ok(Simulation {
            parameters,
            random,
            population,
            seeding_fraction,
            day: 0,
            pool,
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The seeding fraction that produced the initial population.
    pub fn seeding_fraction(&self) -> f64 {
        self.seeding_fraction
    }

    /// The day the next tick will be reported as.
    pub fn day(&self) -> u64 {
        self.day
    }

    /// True once nobody is infectious or the day limit has passed.
    pub fn is_finished(&self) -> bool {
        self.population.infectious_count() == 0 || self.day > self.parameters.max_days
    }

    /// Runs one tick and returns the day it was reported as, with its demographics.
    pub fn step(&mut self) -> (u64, Demographics) {
        match &self.pool {
            Some(pool) => pool.install(|| self.population.tick(&self.random)),
            None => self.population.tick(&self.random),
        }
        let day = self.day;
        self.day += 1;
        let demographics = self.population.demographics();
        debug!("day {day}: {demographics}");
        (day, demographics)
    }

    /// Ticks until [`Simulation::is_finished`], calling `on_day` after every tick.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `on_day`.
    pub fn run_with<F>(&mut self, mut on_day: F) -> Result<RunSummary, SirError>
    where
        F: FnMut(u64, &Demographics, &Population) -> Result<(), SirError>,
    {
        let mut summary = RunSummary {
            days: 0,
            final_demographics: self.population.demographics(),
            peak_infectious: 0,
            peak_day: None,
        };
        while !self.is_finished() {
            let (day, demographics) = self.step();
            on_day(day, &demographics, &self.population)?;
            summary.days += 1;
            summary.final_demographics = demographics;
            if summary.peak_day.is_none() || demographics.infectious > summary.peak_infectious {
                summary.peak_infectious = demographics.infectious;
                summary.peak_day = Some(day);
            }
        }
        info!(
            "finished after {} days: {}",
            summary.days, summary.final_demographics
        );
        Ok(summary)
    }

    /// Ticks to completion, writing one row per day to `report`.
    ///
    /// # Errors
    ///
    /// Returns the first error writing to `report`.
    pub fn run(&mut self, report: &mut DemographicsReport) -> Result<RunSummary, SirError> {
        self.run_with(|day, demographics, _| report.record(day, demographics))
    }
}
