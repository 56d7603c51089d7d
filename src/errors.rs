//! All errors that can occur in the phylosim library.

use std::fmt;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Clone, Debug, PartialEq)]
pub enum SimulationError {
    /// Out-of-domain input, detected before any simulation work is done.
    InvalidParameters(String),
    /// Every lineage died in each of the allowed attempts.
    TotalExtinction { attempts: usize },
    ConfigError(String),
    IoError(String),
}

impl SimulationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SimulationError::InvalidParameters(message.into())
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::InvalidParameters(message) => {
                write!(f, "InvalidParameters: {}", message)
            }
            SimulationError::TotalExtinction { attempts } => {
                write!(
                    f,
                    "TotalExtinction: all lineages died in each of {} attempts",
                    attempts
                )
            }
            SimulationError::ConfigError(message) => write!(f, "ConfigError: {}", message),
            SimulationError::IoError(message) => write!(f, "IoError: {}", message),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<std::io::Error> for SimulationError {
    fn from(error: std::io::Error) -> Self {
        SimulationError::IoError(error.to_string())
    }
}

impl From<serde_yaml::Error> for SimulationError {
    fn from(error: serde_yaml::Error) -> Self {
        SimulationError::ConfigError(error.to_string())
    }
}

impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        SimulationError::IoError(error.to_string())
    }
}
