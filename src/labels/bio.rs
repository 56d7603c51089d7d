//! Pseudo-Latin binomial species names.
//!
//! Genera and epithets are both derived from human labels, which are
//! latinized by a chain of spelling rules and random suffixes.

use super::human::{VOWELS, clean_label, random_labels};
use crate::core::RandomStream;

fn ends_with_any(label: &str, endings: &[char]) -> bool {
    label.chars().last().is_some_and(|last| endings.contains(&last))
}

fn latinize(label: &str, stream: &mut RandomStream) -> String {
    let mut label = label
        .to_lowercase()
        .replace('h', "")
        .replace('f', "ph")
        .replace('k', "c");

    if !ends_with_any(&label, VOWELS) && !ends_with_any(&label, &['s', 'r']) {
        label.push(*stream.choose(VOWELS));
        label.push_str(*stream.choose(&["s", ""]));
    }
    if ends_with_any(&label, &['u', 'e']) {
        label.push('s');
    }
    if label.ends_with('i') && stream.uniform() <= 0.75 {
        label.push('s');
    }
    if label.ends_with('i') {
        label.push('i');
    }
    if label.ends_with('a') && stream.uniform() <= 0.5 {
        label.push('s');
    }

    // aspirated plosives
    for plosive in ['t', 'p'] {
        for &vowel in VOWELS {
            if stream.uniform() <= 0.5 {
                label = label.replace(&format!("{plosive}{vowel}"), &format!("{plosive}h{vowel}"));
            }
        }
    }
    if label.starts_with('p') || label.starts_with('b') {
        label.insert(0, 's');
    }

    // intervocalic geminates
    for consonant in "bpdtsrlgmn".chars() {
        for &before in VOWELS {
            for &after in VOWELS {
                if stream.uniform() < 0.4 {
                    label = label.replace(
                        &format!("{before}{consonant}{after}"),
                        &format!("{before}{consonant}{consonant}{after}"),
                    );
                }
            }
        }
    }

    if label.chars().count() < 5 {
        label.push_str(*stream.choose(&["r", "r", "l"]));
        label.push(*stream.choose(VOWELS));
        label.push('s');
    }
    label
}

/// `size` random binomials, `Genus epithet`. Names are not guaranteed unique.
pub fn random_species(size: usize, stream: &mut RandomStream) -> Vec<String> {
    let names: Vec<String> = random_labels(size * 2, stream)
        .iter()
        .map(|label| latinize(label, stream))
        .collect();
    let (genera, epithets) = names.split_at(size);
    genera
        .iter()
        .zip(epithets)
        .map(|(genus, epithet)| {
            format!(
                "{} {}",
                clean_label(genus),
                clean_label(epithet).to_lowercase()
            )
        })
        .collect()
}
