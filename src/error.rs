use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SirError` and maps to other errors to
/// convert to a `SirError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SirError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    /// A rate, fraction or dimension that cannot describe a valid population.
    ConfigurationError {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    ReportError(String),
    SirError(String),
}

impl SirError {
    pub(crate) fn configuration(name: &'static str, value: f64, reason: &'static str) -> Self {
        SirError::ConfigurationError {
            name,
            value,
            reason,
        }
    }
}

impl From<io::Error> for SirError {
    fn from(error: io::Error) -> Self {
        SirError::IoError(error)
    }
}

impl From<serde_json::Error> for SirError {
    fn from(error: serde_json::Error) -> Self {
        SirError::JsonError(error)
    }
}

impl From<csv::Error> for SirError {
    fn from(error: csv::Error) -> Self {
        SirError::CsvError(error)
    }
}

impl From<String> for SirError {
    fn from(error: String) -> Self {
        SirError::SirError(error)
    }
}

impl From<&str> for SirError {
    fn from(error: &str) -> Self {
        SirError::SirError(error.to_string())
    }
}

impl std::error::Error for SirError {}

impl Display for SirError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SirError::ConfigurationError {
                name,
                value,
                reason,
            } => write!(f, "Error: invalid {name} = {value}: {reason}"),
            SirError::ReportError(message) | SirError::SirError(message) => {
                write!(f, "Error: {message}")
            }
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
