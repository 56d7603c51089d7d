//! Rooted tree representation and traversal
//!
//! The `Tree` owns all of its nodes in an arena and refers to them by
//! `NodeId`. Every node but the root has exactly one parent and lists its
//! children in order. Nodes carry the branch length to their parent, an
//! alive/extinct flag, an optional label and, once characters have been
//! simulated, one state per character.
//!
//! Traversals are explicit finite iterators over the arena and can be
//! restarted by asking the tree for a new one.
//!

use std::ops::{Index, IndexMut};

use crate::errors::{Result, SimulationError};

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    /// Branch length to the parent. For the root, the length of the stem above it.
    pub distance: f64,
    pub alive: bool,
    pub label: Option<String>,
    pub states: Option<Vec<usize>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(parent: Option<NodeId>, distance: f64) -> Self {
        Self {
            distance,
            alive: true,
            label: None,
            states: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl Index<NodeId> for Tree {
    type Output = TreeNode;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Construct a tree consisting of a single alive root with a zero stem.
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(None, 0.)],
            root: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree, internal nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Attach a new alive leaf below `parent`.
    pub fn add_child(&mut self, parent: NodeId, distance: f64) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new(Some(parent), distance));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].is_leaf()
    }

    /// Whether `node` lies in the subtree rooted at `ancestor` (inclusive).
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id].parent;
        }
        false
    }

    /// Sum of branch lengths from `id` up to and including the root stem.
    pub fn root_distance(&self, id: NodeId) -> f64 {
        let mut distance = 0.;
        let mut current = Some(id);
        while let Some(node) = current {
            distance += self.nodes[node].distance;
            current = self.nodes[node].parent;
        }
        distance
    }

    pub fn preorder(&self) -> PreOrder<'_> {
        self.preorder_from(self.root)
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    pub fn preorder_from(&self, id: NodeId) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![id],
        }
    }

    pub fn postorder(&self) -> PostOrder<'_> {
        PostOrder {
            tree: self,
            stack: vec![(self.root, false)],
        }
    }

    /// Leaves in pre-order, extinct ones included.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            inner: self.preorder(),
        }
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves().count()
    }

    pub fn extant_leaves(&self) -> Vec<NodeId> {
        self.leaves().filter(|&id| self.nodes[id].alive).collect()
    }

    pub fn extinct_leaves(&self) -> Vec<NodeId> {
        self.leaves().filter(|&id| !self.nodes[id].alive).collect()
    }

    /// Number of simulated characters, if characters were attached.
    pub fn num_characters(&self) -> Option<usize> {
        self.nodes[self.root].states.as_ref().map(Vec::len)
    }

    /// Compare shape, branch lengths and node data, ignoring arena layout.
    pub fn structurally_equal(&self, other: &Tree) -> bool {
        let mut ours = self.preorder();
        let mut theirs = other.preorder();
        loop {
            match (ours.next(), theirs.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    let (a, b) = (&self[a], &other[b]);
                    if a.children.len() != b.children.len()
                        || a.distance != b.distance
                        || a.alive != b.alive
                        || a.label != b.label
                        || a.states != b.states
                    {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }

    /// Keep the leaves selected by `keep` and everything on their paths to the root.
    ///
    /// Internal nodes left with no selected leaf below them are removed and
    /// nodes left with a single child are merged with it, adding their branch
    /// length to the child's. Root-to-leaf path lengths of the remaining leaves
    /// are preserved; a collapsed root hands its stem to the new root. The
    /// arena is rebuilt in pre-order.
    pub fn retain_leaves<F>(&mut self, mut keep: F) -> Result<()>
    where
        F: FnMut(NodeId, &TreeNode) -> bool,
    {
        let mut kept = vec![false; self.nodes.len()];
        for id in self.postorder() {
            let node = &self.nodes[id];
            kept[id] = if node.is_leaf() {
                keep(id, node)
            } else {
                node.children.iter().any(|&child| kept[child])
            };
        }

        if !kept[self.root] {
            return Err(SimulationError::invalid(
                "no leaf would remain in the tree",
            ));
        }

        let mut nodes: Vec<TreeNode> = Vec::with_capacity(self.nodes.len());
        // (old node, new parent, stem length carried from collapsed ancestors)
        let mut stack: Vec<(NodeId, Option<NodeId>, f64)> = vec![(self.root, None, 0.)];
        while let Some((id, parent, carried)) = stack.pop() {
            let node = &self.nodes[id];
            let children: Vec<NodeId> = node
                .children
                .iter()
                .copied()
                .filter(|&child| kept[child])
                .collect();

            if children.len() == 1 {
                stack.push((children[0], parent, carried + node.distance));
                continue;
            }

            let new_id = nodes.len();
            nodes.push(TreeNode {
                distance: node.distance + carried,
                alive: node.alive,
                label: node.label.clone(),
                states: node.states.clone(),
                parent,
                children: Vec::with_capacity(children.len()),
            });
            if let Some(parent) = parent {
                nodes[parent].children.push(new_id);
            }
            for &child in children.iter().rev() {
                stack.push((child, Some(new_id), 0.));
            }
        }

        self.nodes = nodes;
        self.root = 0;
        Ok(())
    }
}

/// Pre-order (parent before children, children in order) traversal.
#[derive(Clone, Debug)]
pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}

/// Post-order (children before parent) traversal.
#[derive(Clone, Debug)]
pub struct PostOrder<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl Iterator for PostOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }
            self.stack.push((id, true));
            self.stack.extend(
                self.tree.nodes[id]
                    .children
                    .iter()
                    .rev()
                    .map(|&child| (child, false)),
            );
        }
    }
}

#[derive(Clone, Debug)]
pub struct Leaves<'a> {
    inner: PreOrder<'a>,
}

impl Iterator for Leaves<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.inner.tree;
        self.inner.by_ref().find(|&id| tree.nodes[id].is_leaf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ((a:1,b:2):0.5,c:3)
    fn small_tree() -> (Tree, [NodeId; 4]) {
        let mut tree = Tree::new();
        let root = tree.root();
        let inner = tree.add_child(root, 0.5);
        let a = tree.add_child(inner, 1.);
        let b = tree.add_child(inner, 2.);
        let c = tree.add_child(root, 3.);
        (tree, [inner, a, b, c])
    }

    #[test]
    fn single_root() {
        let tree = Tree::new();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.is_leaf(tree.root()));
        assert!(tree[tree.root()].alive);
        assert_eq!(tree.leaves().collect::<Vec<_>>(), vec![tree.root()]);
        assert_eq!(tree.num_characters(), None);
    }

    #[test]
    fn traversals() {
        let (tree, [inner, a, b, c]) = small_tree();
        let root = tree.root();
        assert_eq!(tree.preorder().collect::<Vec<_>>(), vec![root, inner, a, b, c]);
        assert_eq!(tree.postorder().collect::<Vec<_>>(), vec![a, b, inner, c, root]);
        assert_eq!(tree.leaves().collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(tree.preorder_from(inner).collect::<Vec<_>>(), vec![inner, a, b]);

        // restartable
        assert_eq!(tree.preorder().count(), tree.preorder().count());
    }

    #[test]
    fn ancestry_and_distances() {
        let (tree, [inner, a, _b, c]) = small_tree();
        assert!(tree.is_descendant(a, inner));
        assert!(tree.is_descendant(a, tree.root()));
        assert!(tree.is_descendant(inner, inner));
        assert!(!tree.is_descendant(c, inner));
        assert_eq!(tree.root_distance(a), 1.5);
        assert_eq!(tree.root_distance(c), 3.);
        assert_eq!(tree.parent(a), Some(inner));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn retain_collapses_single_children() {
        let (mut tree, [_inner, a, b, _c]) = small_tree();
        tree[a].label = Some("a".to_string());
        tree.retain_leaves(|id, _| id != b).unwrap();

        // (a:1.5,c:3)
        assert_eq!(tree.node_count(), 3);
        let leaves: Vec<NodeId> = tree.leaves().collect();
        assert_eq!(leaves.len(), 2);
        assert_eq!(tree[leaves[0]].label.as_deref(), Some("a"));
        assert_eq!(tree[leaves[0]].distance, 1.5);
        assert_eq!(tree.root_distance(leaves[1]), 3.);
    }

    #[test]
    fn retain_collapses_root() {
        let (mut tree, [_inner, _a, _b, c]) = small_tree();
        tree.retain_leaves(|id, _| id != c).unwrap();

        // root stem carries the removed root edge
        let root = tree.root();
        assert_eq!(tree[root].distance, 0.5);
        assert_eq!(tree.num_leaves(), 2);
        let distances: Vec<f64> = tree.leaves().map(|id| tree.root_distance(id)).collect();
        assert_eq!(distances, vec![1.5, 2.5]);
        assert!(!tree.is_leaf(root));
    }

    #[test]
    fn retain_removes_empty_subtrees() {
        let (mut tree, [_inner, a, b, _c]) = small_tree();
        tree.retain_leaves(|id, _| id != a && id != b).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree[tree.root()].distance, 3.);
    }

    #[test]
    fn retain_nothing_fails() {
        let (mut tree, _) = small_tree();
        let before = tree.clone();
        assert!(tree.retain_leaves(|_, _| false).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn retain_everything_keeps_structure() {
        let (mut tree, _) = small_tree();
        let before = tree.clone();
        tree.retain_leaves(|_, _| true).unwrap();
        assert!(tree.structurally_equal(&before));
    }
}
