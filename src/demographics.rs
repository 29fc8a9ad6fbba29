use serde_derive::Serialize;
use std::fmt::{self, Display};

use crate::status::InfectionStatus;

/// Counts of cells per status at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Demographics {
    pub susceptible: usize,
    pub infectious: usize,
    pub recovered: usize,
}

/// [`Demographics`] normalized by the population size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DemographicFractions {
    pub susceptible: f64,
    pub infectious: f64,
    pub recovered: f64,
}

impl Demographics {
    pub fn from_statuses<I: IntoIterator<Item = InfectionStatus>>(statuses: I) -> Self {
        let mut demographics = Demographics::default();
        for status in statuses {
            demographics.record(status);
        }
        demographics
    }

    fn record(&mut self, status: InfectionStatus) {
        match status {
            InfectionStatus::Susceptible => self.susceptible += 1,
            InfectionStatus::Infectious => self.infectious += 1,
            InfectionStatus::Recovered => self.recovered += 1,
        }
    }

    pub fn count(&self, status: InfectionStatus) -> usize {
        match status {
            InfectionStatus::Susceptible => self.susceptible,
            InfectionStatus::Infectious => self.infectious,
            InfectionStatus::Recovered => self.recovered,
        }
    }

    pub fn total(&self) -> usize {
        self.susceptible + self.infectious + self.recovered
    }

    /// Each count divided by the total. All zero for an empty tally.
    #[allow(clippy::cast_precision_loss)]
    pub fn fractions(&self) -> DemographicFractions {
        let total = self.total();
        if total == 0 {
            return DemographicFractions::default();
        }
        let total = total as f64;
        DemographicFractions {
            susceptible: self.susceptible as f64 / total,
            infectious: self.infectious as f64 / total,
            recovered: self.recovered as f64 / total,
        }
    }
}

impl Display for Demographics {
    /// Formats as `S: 99.00%, I: 1.00%, R: 0.00%`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let fractions = self.fractions();
        write!(
            f,
            "S: {:.2}%, I: {:.2}%, R: {:.2}%",
            fractions.susceptible * 100.0,
            fractions.infectious * 100.0,
            fractions.recovered * 100.0
        )
    }
}
