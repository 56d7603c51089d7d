//! Newick rendering.

use crate::core::{NodeId, Tree};

/// Quote labels that contain Newick punctuation or whitespace.
pub fn escape_label(label: &str) -> String {
    if label.chars().any(|c| {
        matches!(
            c,
            ' ' | ',' | ';' | '\t' | '\n' | '\r' | '(' | ')' | ':' | '[' | ']' | '\''
        )
    }) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

/// Returns the Newick representation of `tree` with closing semicolon.
///
/// Every non-root node carries its branch length; the root only if it has a
/// stem. Labels are written wherever present, e.g. `((A:1,B:1):0.5,C:1.5);`.
pub fn to_newick(tree: &Tree) -> String {
    fn build_newick(tree: &Tree, newick: &mut String, id: NodeId) {
        let node = &tree[id];
        if !node.is_leaf() {
            newick.push('(');
            for (position, &child) in node.children().iter().enumerate() {
                if position > 0 {
                    newick.push(',');
                }
                build_newick(tree, newick, child);
            }
            newick.push(')');
        }
        if let Some(label) = &node.label {
            newick.push_str(&escape_label(label));
        }
        if !node.is_root() || node.distance > 0. {
            newick.push(':');
            newick.push_str(&node.distance.to_string());
        }
    }

    let mut newick = String::with_capacity(tree.node_count() * 12);
    build_newick(tree, &mut newick, tree.root());
    newick.push(';');
    newick
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> Tree {
        let mut tree = Tree::new();
        let inner = tree.add_child(tree.root(), 0.5);
        let a = tree.add_child(inner, 1.);
        let b = tree.add_child(inner, 1.);
        let c = tree.add_child(tree.root(), 1.5);
        tree[a].label = Some("A".into());
        tree[b].label = Some("B".into());
        tree[c].label = Some("C".into());
        tree
    }

    #[test]
    fn render_small_tree() {
        assert_eq!(to_newick(&small_tree()), "((A:1,B:1):0.5,C:1.5);");
    }

    #[test]
    fn render_root_stem_and_internal_labels() {
        let mut tree = small_tree();
        let root = tree.root();
        tree[root].distance = 0.25;
        tree[root].label = Some("root".into());
        tree[1].label = Some("AB".into());
        assert_eq!(to_newick(&tree), "((A:1,B:1)AB:0.5,C:1.5)root:0.25;");
    }

    #[test]
    fn render_unlabeled_and_single_node() {
        let mut tree = small_tree();
        for id in tree.leaves().collect::<Vec<_>>() {
            tree[id].label = None;
        }
        assert_eq!(to_newick(&tree), "((:1,:1):0.5,:1.5);");
        assert_eq!(to_newick(&Tree::new()), ";");
    }

    #[test]
    fn escape_labels() {
        assert_eq!(escape_label("Homo sapiens"), "'Homo sapiens'");
        assert_eq!(escape_label("O'Brien"), "'O''Brien'");
        assert_eq!(escape_label("Kiwi"), "Kiwi");
    }
}
