//! Full tree simulation pipeline.
//!
//! A simulation grows a tree, evolves characters along it, simulates
//! incomplete sampling and finally labels the leaves. Growth and characters
//! draw from the given stream in that order. Sampling and labels draw from
//! streams derived from its seed, so changing them never changes the
//! topology or the characters.

use crate::config::Parameters;
use crate::core::{
    CharacterSummary, RandomStream, StopReason, Tree, add_characters, gen_tree,
    simulate_bad_sampling,
};
use crate::errors::Result;
use crate::labels::label_tree;

/// A finished tree together with a summary of how it came about.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    pub tree: Tree,
    pub extinct: bool,
    pub attempts: usize,
    pub elapsed: f64,
    pub reason: StopReason,
    pub characters: Vec<CharacterSummary>,
    /// Leaves discarded by sampling.
    pub removed: usize,
}

pub fn simulate_tree(parameters: &Parameters, stream: &mut RandomStream) -> Result<Simulation> {
    parameters.validate()?;
    let mut sampling_stream = stream.derive("sampling");
    let mut labels_stream = stream.derive("labels");

    let growth = gen_tree(&parameters.growth(), stream)?;
    let mut tree = growth.tree;

    let characters = match parameters.characters() {
        Some(characters) => add_characters(&mut tree, &characters, stream)?,
        None => Vec::new(),
    };

    // sampling strictly after characters
    let removed = match parameters.sampling {
        Some(sampling) => simulate_bad_sampling(&mut tree, sampling, &mut sampling_stream)?,
        None => 0,
    };

    label_tree(&mut tree, parameters.labels, &mut labels_stream);

    Ok(Simulation {
        tree,
        extinct: growth.extinct,
        attempts: growth.attempts,
        elapsed: growth.elapsed,
        reason: growth.reason,
        characters,
        removed,
    })
}

/// Stream of the `index`-th tree of a batch; the first tree uses `base` itself.
pub fn tree_stream(base: &RandomStream, index: usize) -> RandomStream {
    match index {
        0 => base.clone(),
        _ => base.derive(&format!("tree-{index}")),
    }
}
