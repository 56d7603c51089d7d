//! Settings module.

use super::parameters::Parameters;

use serde::{Deserialize, Serialize};
use std::fs;

use crate::errors::{Result, SimulationError};
use crate::readwrite::OutputFormat;

/// A simulation setup: the parameters of every tree and how many to produce.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub parameters: Parameters,
    pub n_trees: usize,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parameters: Parameters::default(),
            n_trees: 1,
            format: OutputFormat::Newick,
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = vec![];
        self.write(&mut output).map_err(|_| std::fmt::Error)?;
        let output = String::from_utf8(output).map_err(|_| std::fmt::Error)?;
        write!(formatter, "{}", output)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(SimulationError::invalid("n_trees must be positive"));
        }
        self.parameters.validate()
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Settings> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<()> {
        let file = fs::File::create(filename)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Settings> {
        let file = fs::File::open(filename)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}
