//! Discrete character evolution along a finished tree
//!
//! Each character starts in state `0` at the root and evolves independently
//! along every branch. A branch draws a mutation rate (and, if enabled, a
//! transfer rate) from a gamma distribution, scales it by its length and
//! damps it by the number of changes already seen on the ancestral path. The
//! number of mutation and transfer events on the branch is Poisson distributed
//! with the scaled rates. Mutations introduce a state never used before for
//! the character, transfers copy the state of a lineage outside the subtree
//! of the branch.
//!

use serde::{Deserialize, Serialize};

use super::random::RandomStream;
use super::tree::{NodeId, Tree};
use crate::errors::{Result, SimulationError};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CharacterParameters {
    pub num_chars: usize,
    pub k_mut: f64,
    pub th_mut: f64,
    /// Transfers are disabled without a shape parameter.
    pub k_hgt: Option<f64>,
    /// Falls back to `th_mut`.
    pub th_hgt: Option<f64>,
    /// Damping base; rates are divided by `e` to the number of prior changes.
    pub e: f64,
}

impl CharacterParameters {
    pub fn new(num_chars: usize, k_mut: f64, th_mut: f64) -> Self {
        Self {
            num_chars,
            k_mut,
            th_mut,
            k_hgt: None,
            th_hgt: None,
            e: 1.,
        }
    }

    pub fn with_transfer(mut self, k_hgt: f64, th_hgt: Option<f64>) -> Self {
        self.k_hgt = Some(k_hgt);
        self.th_hgt = th_hgt;
        self
    }

    pub fn with_damping(mut self, e: f64) -> Self {
        self.e = e;
        self
    }

    /// Gamma parameters of the transfer rate, if transfers are enabled.
    pub fn transfer(&self) -> Option<(f64, f64)> {
        self.k_hgt
            .map(|k_hgt| (k_hgt, self.th_hgt.unwrap_or(self.th_mut)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_chars == 0 {
            return Err(SimulationError::invalid(
                "the number of characters must be positive",
            ));
        }
        let mut rates = vec![("k_mut", self.k_mut), ("th_mut", self.th_mut)];
        if let Some((k_hgt, th_hgt)) = self.transfer() {
            rates.push(("k_hgt", k_hgt));
            rates.push(("th_hgt", th_hgt));
        }
        for (name, value) in rates {
            if !(value >= 0. && value.is_finite()) {
                return Err(SimulationError::invalid(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        if !(self.e >= 1. && self.e.is_finite()) {
            return Err(SimulationError::invalid(format!(
                "e must be finite and at least 1, got {}",
                self.e
            )));
        }
        Ok(())
    }
}

/// Event counts of one character over the whole tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterSummary {
    /// Branches whose last event was a mutation, i.e. new states introduced.
    pub mutations: usize,
    /// Branches whose last event was a transfer.
    pub transfers: usize,
    /// All drawn events, including those overridden later on the same branch.
    pub events: usize,
}

/// Nodes sorted by time since the root, ties broken by pre-order rank.
///
/// Every node comes after its parent, and no node comes after one of its
/// descendants.
fn chronological_order(tree: &Tree) -> Vec<NodeId> {
    let mut times = vec![0.; tree.node_count()];
    let mut ranked: Vec<(f64, usize, NodeId)> = Vec::with_capacity(tree.node_count());
    for (rank, id) in tree.preorder().enumerate() {
        let time = match tree.parent(id) {
            Some(parent) => times[parent] + tree[id].distance,
            None => 0.,
        };
        times[id] = time;
        ranked.push((time, rank, id));
    }
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    ranked.into_iter().map(|(_, _, id)| id).collect()
}

/// Donor of a transfer into `order[position]`, drawn from the nodes placed
/// before it. These are ancestors or unrelated to the receiving node.
fn transfer_donor(order: &[NodeId], position: usize, stream: &mut RandomStream) -> NodeId {
    order[stream.index(position)]
}

/// Simulate `num_chars` characters on `tree` and attach a state vector to every node.
///
/// Topology and branch lengths are left untouched. States are attached only
/// once the whole simulation succeeded.
pub fn add_characters(
    tree: &mut Tree,
    parameters: &CharacterParameters,
    stream: &mut RandomStream,
) -> Result<Vec<CharacterSummary>> {
    parameters.validate()?;

    let order = chronological_order(tree);
    let transfer = parameters.transfer();
    let mut states = vec![vec![0usize; parameters.num_chars]; tree.node_count()];
    let mut summaries = Vec::with_capacity(parameters.num_chars);

    for character in 0..parameters.num_chars {
        let mut summary = CharacterSummary::default();
        let mut changes = vec![0usize; tree.node_count()];
        let mut next_state = 1;

        for (position, &child) in order.iter().enumerate().skip(1) {
            let Some(parent) = tree.parent(child) else {
                continue;
            };
            let damping = parameters.e.powi(changes[parent] as i32);
            let distance = tree[child].distance;

            let mutation_rate =
                stream.gamma(parameters.k_mut, parameters.th_mut)? * distance / damping;
            let n_mut = stream.poisson(mutation_rate)? as usize;
            let n_hgt = match transfer {
                Some((k_hgt, th_hgt)) => {
                    let transfer_rate = stream.gamma(k_hgt, th_hgt)? * distance / damping;
                    stream.poisson(transfer_rate)? as usize
                }
                None => 0,
            };

            let total = n_mut + n_hgt;
            changes[child] = changes[parent] + total;
            summary.events += total;

            states[child][character] = if total == 0 {
                states[parent][character]
            } else if stream.index(total) < n_mut {
                summary.mutations += 1;
                let state = next_state;
                next_state += 1;
                state
            } else {
                summary.transfers += 1;
                let donor = transfer_donor(&order, position, stream);
                states[donor][character]
            };
        }

        log::trace!("character {character}: {summary:?}");
        summaries.push(summary);
    }

    for (id, node_states) in states.into_iter().enumerate() {
        tree[id].states = Some(node_states);
    }

    log::debug!(
        "Simulated {} characters: {} events, {} new states, {} transfers.",
        parameters.num_chars,
        summaries.iter().map(|s| s.events).sum::<usize>(),
        summaries.iter().map(|s| s.mutations).sum::<usize>(),
        summaries.iter().map(|s| s.transfers).sum::<usize>(),
    );
    Ok(summaries)
}
