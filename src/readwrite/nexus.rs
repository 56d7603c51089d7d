//! NEXUS rendering of the leaf character matrix.
//!
//! Characters are written as a binary presence/absence matrix with one column
//! per state observed among the leaves, for every character in turn.

use itertools::Itertools;
use std::collections::BTreeSet;

use super::taxa;
use crate::core::Tree;

const MISSING_WARNING: &str = "[WARNING: characters missing from tree]";

/// Binary matrix rows, keyed by taxon name and sorted by it.
fn binary_matrix(rows: &[(String, Vec<usize>)]) -> Vec<(String, String)> {
    let num_chars = rows.iter().map(|(_, states)| states.len()).max().unwrap_or(0);
    let observed: Vec<BTreeSet<usize>> = (0..num_chars)
        .map(|character| {
            rows.iter()
                .filter_map(|(_, states)| states.get(character).copied())
                .collect()
        })
        .collect();

    rows.iter()
        .map(|(name, states)| {
            let bits: String = states
                .iter()
                .zip(&observed)
                .flat_map(|(state, column)| {
                    column
                        .iter()
                        .map(move |candidate| if candidate == state { '1' } else { '0' })
                })
                .collect();
            (name.clone(), bits)
        })
        .collect()
}

pub fn to_nexus(tree: &Tree) -> String {
    let missing = tree.num_characters().is_none();
    let rows: Vec<(String, Vec<usize>)> = taxa(tree)
        .into_iter()
        .map(|(name, id)| (name, tree[id].states.clone().unwrap_or_default()))
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect();
    let matrix = binary_matrix(&rows);

    let width = matrix
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        + 3;
    let nchar = matrix.first().map_or(0, |(_, bits)| bits.len());

    let mut lines = vec!["#NEXUS".to_string(), String::new()];
    if missing {
        lines.push(format!("{MISSING_WARNING}\n"));
    }
    lines.push("begin data;".to_string());
    lines.push(format!(
        "  dimensions ntax={} nchar={nchar};",
        matrix.len()
    ));
    lines.push("  format datatype=standard missing=? gap=-;".to_string());
    lines.push("  matrix".to_string());
    for (name, bits) in &matrix {
        lines.push(format!("{:<width$} {bits}", name.replace(' ', "_")));
    }
    lines.push("  ;".to_string());
    lines.push("end;".to_string());
    lines.join("\n")
}
