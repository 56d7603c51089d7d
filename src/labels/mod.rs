//! Leaf labeling.
//!
//! Labels are assigned to the leaves of a finished tree, in pre-order. Only
//! labels are written; states, branch lengths and topology are left alone.

mod bio;
mod human;

pub use bio::random_species;
pub use human::{clean_label, random_labels};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::core::{NodeId, RandomStream, Tree};
use crate::errors::SimulationError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelModel {
    None,
    /// `L1`, `L2`, ... zero-padded to a common width.
    Enum,
    #[default]
    Human,
    Bio,
}

impl fmt::Display for LabelModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LabelModel::None => "none",
            LabelModel::Enum => "enum",
            LabelModel::Human => "human",
            LabelModel::Bio => "bio",
        };
        write!(f, "{name}")
    }
}

impl FromStr for LabelModel {
    type Err = SimulationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(LabelModel::None),
            "enum" => Ok(LabelModel::Enum),
            "human" => Ok(LabelModel::Human),
            "bio" => Ok(LabelModel::Bio),
            _ => Err(SimulationError::invalid(format!(
                "unknown label model '{value}'"
            ))),
        }
    }
}

/// Enumerated labels `L1..Ln`, padded to the number of digits of `n`.
pub fn enumerated_labels(size: usize) -> Vec<String> {
    let width = size.to_string().len();
    (1..=size).map(|i| format!("L{i:0width$}")).collect()
}

/// Keep names in order, renaming repeated ones to `L1`, `L2`, ...
fn replace_duplicates(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut fallback = 0;
    names
        .into_iter()
        .map(|name| {
            if seen.insert(name.clone()) {
                name
            } else {
                fallback += 1;
                format!("L{fallback}")
            }
        })
        .collect()
}

/// Label the leaves of `tree` according to `model`.
pub fn label_tree(tree: &mut Tree, model: LabelModel, stream: &mut RandomStream) {
    let leaves: Vec<NodeId> = tree.leaves().collect();
    let labels = match model {
        LabelModel::None => return,
        LabelModel::Enum => enumerated_labels(leaves.len()),
        LabelModel::Human => random_labels(leaves.len(), stream),
        LabelModel::Bio => replace_duplicates(random_species(leaves.len(), stream)),
    };
    for (leaf, label) in leaves.into_iter().zip(labels) {
        tree[leaf].label = Some(label);
    }
}
