//! This module contains the simulation core: trees, their growth and the
//! evolution of characters along them.

pub mod characters;
pub mod growth;
pub mod random;
pub mod sampling;
pub mod tree;

pub use characters::{CharacterParameters, CharacterSummary, add_characters};
pub use growth::{
    BirthDeath, ExtinctionPolicy, Growth, GrowthParameters, StopCriteria, StopReason, gen_tree,
};
pub use random::{RandomStream, Seed};
pub use sampling::{Sampling, prune_extinct, simulate_bad_sampling};
pub use tree::{NodeId, Tree, TreeNode};
