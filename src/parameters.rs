//! Run parameters, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the values it changes:
//!
//! ```json
//! { "grid_size": 200, "masked_fraction": 0.4 }
//! ```
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::behavior::{BehaviorMix, DEFAULT_INTROVERT_AVOIDANCE};
use crate::error::SirError;
use crate::population::{check_probability, PopulationConfig};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub infection_rate: f64,
    pub recovery_rate: f64,
    /// Last day that may be simulated.
    pub max_days: u64,
    /// Cells per side.
    pub grid_size: usize,
    pub initial_infected_fraction: f64,
    /// Added to the seeding fraction each time a generated population has no infections.
    pub seeding_increment: f64,
    pub contact_tracing_fraction: f64,
    pub quarantine_fraction: f64,
    pub masked_fraction: f64,
    pub introvert_fraction: f64,
    pub introvert_avoidance: f64,
    /// Worker threads for the tick. 0 uses rayon's default.
    pub threads: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            infection_rate: 0.166,
            recovery_rate: 0.037,
            max_days: 90,
            grid_size: 500,
            initial_infected_fraction: 0.001,
            seeding_increment: 0.005,
            contact_tracing_fraction: 0.0,
            quarantine_fraction: 0.0,
            masked_fraction: 0.5,
            introvert_fraction: 0.0,
            introvert_avoidance: DEFAULT_INTROVERT_AVOIDANCE,
            threads: 0,
        }
    }
}

impl Parameters {
    /// Reads parameters from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SirError::IoError`] if the file cannot be opened and
    /// [`SirError::JsonError`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, SirError> {
        let reader = BufReader::new(File::open(path)?);
        let parameters: Parameters = serde_json::from_reader(reader)?;
        Ok(parameters)
    }

    pub fn mix(&self) -> BehaviorMix {
        BehaviorMix {
            contact_tracing: self.contact_tracing_fraction,
            quarantine: self.quarantine_fraction,
            masked: self.masked_fraction,
            introvert: self.introvert_fraction,
        }
    }

    /// The population configuration for one generation attempt.
    pub fn population_config(&self, initial_infected_fraction: f64) -> PopulationConfig {
        PopulationConfig {
            size: self.grid_size,
            initial_infected_fraction,
            infection_rate: self.infection_rate,
            recovery_rate: self.recovery_rate,
            mix: self.mix(),
            introvert_avoidance: self.introvert_avoidance,
        }
    }

    /// # Errors
    ///
    /// Returns [`SirError::ConfigurationError`] for the first rate or fraction outside
    /// `[0, 1]`, an empty grid, or a seeding increment that could never seed an infection.
    pub fn validate(&self) -> Result<(), SirError> {
        self.population_config(self.initial_infected_fraction)
            .validate()?;
        check_probability("seeding_increment", self.seeding_increment)?;
        if self.seeding_increment == 0.0 && self.initial_infected_fraction == 0.0 {
            return Err(SirError::configuration(
                "seeding_increment",
                self.seeding_increment,
                "must be positive when initial_infected_fraction is 0",
            ));
        }
        Ok(())
    }

    /// `SIR_<infection>_<recovery>_<max_days>_<grid_size>`, without extension.
    pub fn default_report_name(&self) -> String {
        format!(
            "SIR_{}_{}_{}_{}",
            self.infection_rate, self.recovery_rate, self.max_days, self.grid_size
        )
    }
}
