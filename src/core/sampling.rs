//! Post-processing of finished trees: removal of extinct lineages and
//! incomplete sampling of leaves.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::random::RandomStream;
use super::tree::{NodeId, Tree};
use crate::errors::{Result, SimulationError};

/// Remove extinct leaves, collapsing internal nodes left with a single child.
///
/// Surviving leaves keep their root-to-leaf path lengths. A tree in which
/// every lineage is extinct cannot be pruned.
pub fn prune_extinct(tree: &mut Tree) -> Result<()> {
    let extinct = tree.extinct_leaves().len();
    if extinct == 0 {
        return Ok(());
    }
    tree.retain_leaves(|_, node| node.alive)?;
    log::debug!("Pruned {extinct} extinct leaves.");
    Ok(())
}

/// How many leaves to discard when simulating incomplete sampling.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Each leaf is discarded independently with this probability.
    Fraction(f64),
    /// Exactly this many leaves, chosen uniformly, are discarded.
    Count(usize),
}

impl Sampling {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Sampling::Fraction(fraction) if !(0.0..1.0).contains(&fraction) => Err(
                SimulationError::invalid(format!(
                    "sampling fraction must lie in [0, 1), got {fraction}"
                )),
            ),
            _ => Ok(()),
        }
    }
}

/// Discard leaves at random regardless of their alive flag, then collapse the tree.
///
/// Must run after character evolution. Returns the number of discarded leaves;
/// at least one leaf always survives.
pub fn simulate_bad_sampling(
    tree: &mut Tree,
    sampling: Sampling,
    stream: &mut RandomStream,
) -> Result<usize> {
    sampling.validate()?;
    let leaves: Vec<NodeId> = tree.leaves().collect();

    let mut removed: HashSet<NodeId> = match sampling {
        Sampling::Fraction(fraction) => leaves
            .iter()
            .copied()
            .filter(|_| stream.uniform() < fraction)
            .collect(),
        Sampling::Count(count) => {
            if count >= leaves.len() {
                return Err(SimulationError::invalid(format!(
                    "cannot remove {count} of {} leaves",
                    leaves.len()
                )));
            }
            stream
                .sample_indices(leaves.len(), count)
                .into_iter()
                .map(|index| leaves[index])
                .collect()
        }
    };

    if removed.len() == leaves.len() {
        let spared = *stream.choose(&leaves);
        removed.remove(&spared);
    }
    if removed.is_empty() {
        return Ok(0);
    }

    tree.retain_leaves(|id, _| !removed.contains(&id))?;
    log::debug!("Removed {} of {} leaves by sampling.", removed.len(), leaves.len());
    Ok(removed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::growth::{GrowthParameters, StopCriteria, gen_tree};

    fn grown_tree(seed: u64, death: f64, leaves: usize) -> Tree {
        let parameters = GrowthParameters::new(1., death, StopCriteria::min_leaves(leaves));
        gen_tree(&parameters, &mut RandomStream::from_seed(seed))
            .unwrap()
            .tree
    }

    fn path_lengths(tree: &Tree) -> Vec<(Option<String>, f64)> {
        let mut lengths: Vec<_> = tree
            .extant_leaves()
            .into_iter()
            .map(|leaf| (tree[leaf].label.clone(), tree.root_distance(leaf)))
            .collect();
        lengths.sort_by(|a, b| a.0.cmp(&b.0));
        lengths
    }

    fn label_leaves(tree: &mut Tree) {
        let leaves: Vec<NodeId> = tree.leaves().collect();
        for (index, leaf) in leaves.into_iter().enumerate() {
            tree[leaf].label = Some(format!("{index:03}"));
        }
    }

    #[test]
    fn prune_removes_extinct_and_keeps_lengths() {
        for seed in 0..10u64 {
            let mut tree = grown_tree(seed, 0.6, 20);
            label_leaves(&mut tree);
            let expected = path_lengths(&tree);

            prune_extinct(&mut tree).unwrap();
            assert!(tree.extinct_leaves().is_empty());
            assert_eq!(tree.num_leaves(), 20);
            for id in tree.preorder() {
                assert_ne!(tree.children(id).len(), 1);
            }

            let actual = path_lengths(&tree);
            assert_eq!(actual.len(), expected.len());
            for (a, b) in actual.iter().zip(&expected) {
                assert_eq!(a.0, b.0);
                assert!((a.1 - b.1).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn prune_is_idempotent() {
        let mut tree = grown_tree(11, 0.5, 12);
        prune_extinct(&mut tree).unwrap();
        let pruned = tree.clone();
        prune_extinct(&mut tree).unwrap();
        assert!(tree.structurally_equal(&pruned));

        let mut yule = grown_tree(12, 0., 12);
        let before = yule.clone();
        prune_extinct(&mut yule).unwrap();
        assert_eq!(yule, before);
    }

    #[test]
    fn prune_fully_extinct_tree_fails() {
        let mut tree = Tree::new();
        tree[0].alive = false;
        assert!(prune_extinct(&mut tree).is_err());
    }

    #[test]
    fn sampling_by_count() {
        let mut tree = grown_tree(13, 0., 20);
        let removed =
            simulate_bad_sampling(&mut tree, Sampling::Count(5), &mut RandomStream::from_seed(1u64))
                .unwrap();
        assert_eq!(removed, 5);
        assert_eq!(tree.num_leaves(), 15);
        for id in tree.preorder() {
            assert_ne!(tree.children(id).len(), 1);
        }
    }

    #[test]
    fn sampling_by_fraction_keeps_one_leaf() {
        let mut tree = grown_tree(14, 0., 10);
        let removed = simulate_bad_sampling(
            &mut tree,
            Sampling::Fraction(0.999),
            &mut RandomStream::from_seed(2u64),
        )
        .unwrap();
        assert!(removed <= 9);
        assert!(tree.num_leaves() >= 1);
        assert_eq!(tree.num_leaves() + removed, 10);
    }

    #[test]
    fn sampling_nothing_is_a_no_op() {
        let mut tree = grown_tree(15, 0., 10);
        let before = tree.clone();
        let removed = simulate_bad_sampling(
            &mut tree,
            Sampling::Fraction(0.),
            &mut RandomStream::from_seed(3u64),
        )
        .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(tree, before);
    }

    #[test]
    fn sampling_keeps_characters() {
        use crate::core::characters::{CharacterParameters, add_characters};

        let mut tree = grown_tree(16, 0., 15);
        let mut stream = RandomStream::from_seed(4u64);
        add_characters(&mut tree, &CharacterParameters::new(7, 5., 1.), &mut stream).unwrap();
        simulate_bad_sampling(&mut tree, Sampling::Count(4), &mut stream).unwrap();
        for id in tree.preorder() {
            assert_eq!(tree[id].states.as_ref().map(Vec::len), Some(7));
        }
    }

    #[test]
    fn invalid_sampling() {
        let mut tree = grown_tree(17, 0., 5);
        let mut stream = RandomStream::from_seed(5u64);
        for sampling in [
            Sampling::Fraction(1.),
            Sampling::Fraction(-0.1),
            Sampling::Count(5),
        ] {
            let result = simulate_bad_sampling(&mut tree, sampling, &mut stream);
            assert!(matches!(result, Err(SimulationError::InvalidParameters(_))));
        }
        assert_eq!(tree.num_leaves(), 5);
    }
}
