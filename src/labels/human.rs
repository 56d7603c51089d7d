//! Pronounceable random labels built from a small syllable grammar.

use phf::phf_map;
use std::collections::HashSet;

use crate::core::RandomStream;

pub static SOUNDS: phf::Map<char, &'static [char]> = phf_map! {
    'C' => CONSONANTS,
    'V' => VOWELS,
};

pub const CONSONANTS: &[char] = &[
    'b', 'p', 'd', 't', 'f', 'v', 's', 'z', 'r', 'l', 'g', 'k', 'm', 'n', 'h',
];
pub const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

const PATTERNS: &[&str] = &["V", "CV", "CV", "CVC"];

/// Clusters reduced to their first sound.
const COMPLEX_CLUSTERS: &[&str] = &[
    "pb", "bp", "sz", "zs", "dl", "gk", "kg", "bd", "db", "zp", "pv", "pf", "sr",
];

/// Between `min` and `max` random syllables, concatenated.
fn syllables(stream: &mut RandomStream, min: usize, max: usize) -> String {
    let count = min + stream.index(max - min + 1);
    let mut syllables = String::new();
    for _ in 0..count {
        for class in stream.choose(PATTERNS).chars() {
            syllables.push(*stream.choose(SOUNDS[&class]));
        }
    }
    syllables
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Make a raw label easier to read and capitalize it.
///
/// `h` is only kept next to vowels, complex clusters and geminate vowels are
/// simplified and an initial `i` becomes `wi`.
pub fn clean_label(label: &str) -> String {
    let mut label = label.to_lowercase().replace("hh", "");
    for &consonant in CONSONANTS {
        label = label
            .replace(&format!("{consonant}h"), &consonant.to_string())
            .replace(&format!("h{consonant}"), &consonant.to_string());
    }
    for &cluster in COMPLEX_CLUSTERS {
        label = label.replace(cluster, &cluster[..1]);
    }
    for &vowel in VOWELS {
        label = label.replace(&format!("{vowel}{vowel}"), &vowel.to_string());
    }
    if label.starts_with('i') {
        label.insert(0, 'w');
    }
    capitalize(&label)
}

/// `size` unique random labels of two or three syllables.
///
/// Colliding labels are extended one syllable at a time until unique.
pub fn random_labels(size: usize, stream: &mut RandomStream) -> Vec<String> {
    let mut seen = HashSet::with_capacity(size);
    let mut labels = Vec::with_capacity(size);
    for _ in 0..size {
        let mut label = clean_label(&syllables(stream, 2, 3));
        while seen.contains(&label) {
            label = clean_label(&format!("{label}{}", syllables(stream, 1, 1)));
        }
        seen.insert(label.clone());
        labels.push(label);
    }
    labels
}
