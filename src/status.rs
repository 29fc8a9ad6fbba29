use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The disease state of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfectionStatus {
    Susceptible,
    Infectious,
    Recovered,
}

impl InfectionStatus {
    pub fn is_susceptible(self) -> bool {
        self == InfectionStatus::Susceptible
    }

    pub fn is_infectious(self) -> bool {
        self == InfectionStatus::Infectious
    }

    /// `Recovered` is absorbing: nothing leaves it.
    pub fn is_recovered(self) -> bool {
        self == InfectionStatus::Recovered
    }
}

impl Display for InfectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            InfectionStatus::Susceptible => "S",
            InfectionStatus::Infectious => "I",
            InfectionStatus::Recovered => "R",
        };
        f.write_str(label)
    }
}
