//! Long-format tabular output of leaf characters.

use serde::Serialize;
use std::io::Write;

use super::taxa;
use crate::core::Tree;
use crate::errors::{Result, SimulationError};

#[derive(Debug, Serialize)]
struct WordlistRecord {
    #[serde(rename = "Language_ID")]
    language: String,
    #[serde(rename = "Feature_ID")]
    feature: String,
    #[serde(rename = "Value")]
    value: usize,
}

/// Write one row per leaf and character, sorted by feature, then taxon.
pub fn write_wordlist(tree: &Tree, writer: &mut dyn Write) -> Result<()> {
    let mut records = Vec::new();
    for (language, id) in taxa(tree) {
        let states = tree[id].states.as_ref().ok_or_else(|| {
            SimulationError::invalid("wordlist output requires simulated characters")
        })?;
        for (index, &value) in states.iter().enumerate() {
            records.push(WordlistRecord {
                language: language.clone(),
                feature: format!("feature_{index}"),
                value,
            });
        }
    }
    records.sort_by(|a, b| (&a.feature, &a.language).cmp(&(&b.feature, &b.language)));

    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_wordlist(tree: &Tree) -> Result<String> {
    let mut buffer = Vec::new();
    write_wordlist(tree, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| SimulationError::IoError(err.to_string()))
}
