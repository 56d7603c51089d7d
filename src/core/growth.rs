//! Birth-death tree growth
//!
//! Trees are grown from a single root lineage by a continuous-time
//! birth-death process. Between events, every live lineage ages by the same
//! exponentially distributed waiting time; each event then picks one live
//! lineage uniformly and either splits it (birth) or marks it extinct (death).
//! Growth stops once enough live lineages exist, once the maximum time is
//! reached, or when every lineage died.
//!
//! `BirthDeath` is the resumable process itself: growing it to `k` live leaves
//! and then continuing it to `k + 1` yields the same tree as growing it to
//! `k + 1` directly. `gen_tree` wraps the process with parameter validation,
//! extinction handling and optional pruning.
//!

use serde::{Deserialize, Serialize};

use super::random::RandomStream;
use super::sampling::prune_extinct;
use super::tree::{NodeId, Tree};
use crate::errors::{Result, SimulationError};

/// Stopping criteria of a growth run; whichever is met first ends growth.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopCriteria {
    pub max_time: Option<f64>,
    pub min_leaves: Option<usize>,
}

impl StopCriteria {
    pub fn min_leaves(min_leaves: usize) -> Self {
        Self {
            max_time: None,
            min_leaves: Some(min_leaves),
        }
    }

    pub fn max_time(max_time: f64) -> Self {
        Self {
            max_time: Some(max_time),
            min_leaves: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_time.is_none() && self.min_leaves.is_none() {
            return Err(SimulationError::invalid(
                "at least one stopping criterion is required",
            ));
        }
        if let Some(max_time) = self.max_time
            && !(max_time > 0. && max_time.is_finite())
        {
            return Err(SimulationError::invalid(format!(
                "max_time must be positive and finite, got {max_time}"
            )));
        }
        if self.min_leaves == Some(0) {
            return Err(SimulationError::invalid("min_leaves must be positive"));
        }
        Ok(())
    }
}

/// What to do when every lineage dies before a stopping criterion is met.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtinctionPolicy {
    /// Regenerate from scratch on the advanced stream, up to `max_attempts` times.
    #[default]
    Retry,
    /// Return the extinct tree.
    Keep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    MinLeaves,
    MaxTime,
    Extinction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GrowthParameters {
    pub birth: f64,
    pub death: f64,
    pub stop: StopCriteria,
    /// Expected number of extra descendants per birth; zero means strict bifurcation.
    pub lam: f64,
    pub extinction: ExtinctionPolicy,
    pub max_attempts: usize,
    /// Remove extinct lineages from the returned tree.
    pub prune: bool,
}

impl GrowthParameters {
    pub fn new(birth: f64, death: f64, stop: StopCriteria) -> Self {
        Self {
            birth,
            death,
            stop,
            lam: 0.,
            extinction: ExtinctionPolicy::Retry,
            max_attempts: 3000,
            prune: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_rates(self.birth, self.death, self.lam)?;
        self.stop.validate()?;
        if self.max_attempts == 0 {
            return Err(SimulationError::invalid("max_attempts must be positive"));
        }
        Ok(())
    }
}

fn validate_rates(birth: f64, death: f64, lam: f64) -> Result<()> {
    if !(birth >= 0. && birth.is_finite()) || !(death >= 0. && death.is_finite()) {
        return Err(SimulationError::invalid(format!(
            "rates must be non-negative and finite, got birth={birth}, death={death}"
        )));
    }
    if birth == 0. && death == 0. {
        return Err(SimulationError::invalid(
            "birth and death rates cannot both be zero",
        ));
    }
    if !(lam >= 0. && lam.is_finite()) {
        return Err(SimulationError::invalid(format!(
            "lam must be non-negative and finite, got {lam}"
        )));
    }
    Ok(())
}

/// Result of a growth run.
#[derive(Clone, Debug, PartialEq)]
pub struct Growth {
    pub tree: Tree,
    /// Only set with `ExtinctionPolicy::Keep`.
    pub extinct: bool,
    pub attempts: usize,
    pub elapsed: f64,
    pub reason: StopReason,
}

/// A birth-death process in progress.
#[derive(Clone, Debug)]
pub struct BirthDeath {
    birth: f64,
    death: f64,
    lam: f64,
    tree: Tree,
    live: Vec<NodeId>,
    elapsed: f64,
}

impl BirthDeath {
    pub fn new(birth: f64, death: f64, lam: f64) -> Result<Self> {
        validate_rates(birth, death, lam)?;
        let tree = Tree::new();
        let live = vec![tree.root()];
        Ok(Self {
            birth,
            death,
            lam,
            tree,
            live,
            elapsed: 0.,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Live leaves, in the order used for uniform lineage selection.
    pub fn live_leaves(&self) -> &[NodeId] {
        &self.live
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_extinct(&self) -> bool {
        self.live.is_empty()
    }

    /// Advance the process until one of the criteria holds or all lineages died.
    ///
    /// When `max_time` ends the run, every live lineage is extended to end
    /// exactly at `max_time`.
    pub fn run_until(&mut self, stop: &StopCriteria, stream: &mut RandomStream) -> Result<StopReason> {
        stop.validate()?;
        let event_rate = self.birth + self.death;

        loop {
            if self.live.is_empty() {
                return Ok(StopReason::Extinction);
            }
            if let Some(min_leaves) = stop.min_leaves
                && self.live.len() >= min_leaves
            {
                return Ok(StopReason::MinLeaves);
            }

            let waiting_time = stream.exponential(event_rate * self.live.len() as f64)?;
            if let Some(max_time) = stop.max_time
                && self.elapsed + waiting_time > max_time
            {
                let remaining = max_time - self.elapsed;
                for &leaf in &self.live {
                    self.tree[leaf].distance += remaining;
                }
                self.elapsed = max_time;
                return Ok(StopReason::MaxTime);
            }

            self.elapsed += waiting_time;
            for &leaf in &self.live {
                self.tree[leaf].distance += waiting_time;
            }

            let slot = stream.index(self.live.len());
            if self.is_birth(stream) {
                self.split(slot, stream)?;
            } else {
                self.kill(slot);
            }
        }
    }

    fn is_birth(&self, stream: &mut RandomStream) -> bool {
        // pure birth and pure death need no draw
        if self.death == 0. {
            return true;
        }
        if self.birth == 0. {
            return false;
        }
        stream.uniform() < self.birth / (self.birth + self.death)
    }

    fn split(&mut self, slot: usize, stream: &mut RandomStream) -> Result<()> {
        let parent = self.live[slot];
        let n_children = if self.lam > 0. {
            2 + stream.poisson(self.lam)?
        } else {
            2
        };

        // the first child takes the parent's slot to keep the order stable
        self.live[slot] = self.tree.add_child(parent, 0.);
        for _ in 1..n_children {
            let child = self.tree.add_child(parent, 0.);
            self.live.push(child);
        }
        log::trace!(
            "t={:.6}: lineage {parent} split into {n_children}",
            self.elapsed
        );
        Ok(())
    }

    fn kill(&mut self, slot: usize) {
        let lineage = self.live.remove(slot);
        self.tree[lineage].alive = false;
        log::trace!("t={:.6}: lineage {lineage} died", self.elapsed);
    }
}

/// Grow a random tree, retrying after total extinction as configured.
pub fn gen_tree(parameters: &GrowthParameters, stream: &mut RandomStream) -> Result<Growth> {
    parameters.validate()?;

    for attempt in 1..=parameters.max_attempts {
        let mut process = BirthDeath::new(parameters.birth, parameters.death, parameters.lam)?;
        let reason = process.run_until(&parameters.stop, stream)?;
        let elapsed = process.elapsed();

        if reason == StopReason::Extinction {
            match parameters.extinction {
                ExtinctionPolicy::Retry => {
                    log::debug!("Attempt {attempt} went extinct at t={elapsed:.6}, restarting...");
                    continue;
                }
                ExtinctionPolicy::Keep => {
                    log::info!("Tree went extinct at t={elapsed:.6}.");
                    return Ok(Growth {
                        tree: process.into_tree(),
                        extinct: true,
                        attempts: attempt,
                        elapsed,
                        reason,
                    });
                }
            }
        }

        let mut tree = process.into_tree();
        if parameters.prune {
            prune_extinct(&mut tree)?;
        }
        log::info!(
            "Grew tree with {} leaves in {attempt} attempt(s), t={elapsed:.6} ({reason:?}).",
            tree.num_leaves()
        );
        return Ok(Growth {
            tree,
            extinct: false,
            attempts: attempt,
            elapsed,
            reason,
        });
    }

    Err(SimulationError::TotalExtinction {
        attempts: parameters.max_attempts,
    })
}
