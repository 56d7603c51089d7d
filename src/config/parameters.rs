use serde::{Deserialize, Serialize};
use std::fs;

use crate::core::{
    CharacterParameters, ExtinctionPolicy, GrowthParameters, Sampling, Seed, StopCriteria,
};
use crate::errors::Result;
use crate::labels::LabelModel;

/// All parameters of a single tree simulation.
///
/// Fields missing from a configuration file take their default values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Parameters {
    /// Seed of the random stream; system entropy when absent.
    pub seed: Option<Seed>,

    /// Birth rate (lambda) of the birth-death process.
    pub birth: f64,

    /// Death rate (mu) of the birth-death process, half the birth rate when absent.
    pub death: Option<f64>,

    /// Stop once this much time has passed since the root.
    pub max_time: Option<f64>,

    /// Stop once this many lineages are alive.
    pub min_leaves: Option<usize>,

    /// Expected number of extra descendants per birth, zero for strictly
    /// bifurcating trees.
    pub lam: f64,

    /// Number of attempts before giving up on a tree that keeps dying out.
    pub max_attempts: usize,

    pub extinction: ExtinctionPolicy,

    /// Remove extinct lineages after growth.
    pub prune: bool,

    /// Number of characters to simulate; zero disables characters.
    pub num_chars: usize,

    /// Gamma shape and scale of per-branch mutation rates.
    pub k_mut: f64,
    pub th_mut: f64,

    /// Gamma shape and scale of per-branch transfer rates; no transfers
    /// without `k_hgt`.
    pub k_hgt: Option<f64>,
    pub th_hgt: Option<f64>,

    /// Damping of change rates by prior changes.
    pub e_mut: f64,

    /// Incomplete sampling applied after character evolution, written as
    /// `fraction: 0.25` or `count: 3`.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub sampling: Option<Sampling>,

    pub labels: LabelModel,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            seed: None,
            birth: 1.,
            death: None,
            max_time: None,
            min_leaves: Some(10),
            lam: 0.,
            max_attempts: 3000,
            extinction: ExtinctionPolicy::Retry,
            prune: false,
            num_chars: 0,
            k_mut: 5.,
            th_mut: 1.,
            k_hgt: None,
            th_hgt: None,
            e_mut: 1.05,
            sampling: None,
            labels: LabelModel::Human,
        }
    }
}

impl std::fmt::Display for Parameters {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = vec![];
        self.write(&mut output).map_err(|_| std::fmt::Error)?;
        let output = String::from_utf8(output).map_err(|_| std::fmt::Error)?;
        write!(formatter, "{}", output)
    }
}

impl Parameters {
    pub fn death(&self) -> f64 {
        self.death.unwrap_or(self.birth / 2.)
    }

    pub fn growth(&self) -> GrowthParameters {
        GrowthParameters {
            birth: self.birth,
            death: self.death(),
            stop: StopCriteria {
                max_time: self.max_time,
                min_leaves: self.min_leaves,
            },
            lam: self.lam,
            extinction: self.extinction,
            max_attempts: self.max_attempts,
            prune: self.prune,
        }
    }

    /// Character parameters, if characters are requested.
    pub fn characters(&self) -> Option<CharacterParameters> {
        if self.num_chars == 0 {
            return None;
        }
        Some(CharacterParameters {
            num_chars: self.num_chars,
            k_mut: self.k_mut,
            th_mut: self.th_mut,
            k_hgt: self.k_hgt,
            th_hgt: self.th_hgt,
            e: self.e_mut,
        })
    }

    /// Check every parameter before any simulation work is done.
    pub fn validate(&self) -> Result<()> {
        self.growth().validate()?;
        if let Some(characters) = self.characters() {
            characters.validate()?;
        }
        if let Some(sampling) = &self.sampling {
            sampling.validate()?;
        }
        Ok(())
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Parameters> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<()> {
        let file = fs::File::create(filename)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Parameters> {
        let file = fs::File::open(filename)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}
