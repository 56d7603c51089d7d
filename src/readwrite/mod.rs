//! Rendering and writing of finished trees.

mod newick;
mod nexus;
mod wordlist;

pub use newick::{escape_label, to_newick};
pub use nexus::to_nexus;
pub use wordlist::{to_wordlist, write_wordlist};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use crate::core::{NodeId, Tree};
use crate::errors::{Result, SimulationError};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Newick,
    Nexus,
    Wordlist,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Newick => "nwk",
            OutputFormat::Nexus => "nex",
            OutputFormat::Wordlist => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OutputFormat::Newick => "newick",
            OutputFormat::Nexus => "nexus",
            OutputFormat::Wordlist => "wordlist",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OutputFormat {
    type Err = SimulationError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "newick" => Ok(OutputFormat::Newick),
            "nexus" => Ok(OutputFormat::Nexus),
            "wordlist" => Ok(OutputFormat::Wordlist),
            _ => Err(SimulationError::invalid(format!(
                "unknown output format '{value}'"
            ))),
        }
    }
}

/// Leaf names in pre-order; unlabeled leaves are named by their position.
pub(crate) fn taxa(tree: &Tree) -> Vec<(String, NodeId)> {
    tree.leaves()
        .enumerate()
        .map(|(position, id)| {
            let name = tree[id]
                .label
                .clone()
                .unwrap_or_else(|| format!("L{}", position + 1));
            (name, id)
        })
        .collect()
}

pub trait TreeIO {
    fn render(&self, format: OutputFormat) -> Result<String>;
    fn write(&self, writer: &mut dyn Write, format: OutputFormat) -> Result<()>;
    fn write_to_file(&self, path: &Path, format: OutputFormat) -> Result<()>;
}

impl TreeIO for Tree {
    fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Newick => Ok(to_newick(self)),
            OutputFormat::Nexus => Ok(to_nexus(self)),
            OutputFormat::Wordlist => to_wordlist(self),
        }
    }

    fn write(&self, writer: &mut dyn Write, format: OutputFormat) -> Result<()> {
        let mut rendered = self.render(format)?;
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        writer.write_all(rendered.as_bytes())?;
        Ok(())
    }

    fn write_to_file(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let file = fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer, format)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cherry() -> Tree {
        let mut tree = Tree::new();
        let a = tree.add_child(0, 0.5);
        tree.add_child(0, 0.5);
        tree[a].label = Some("Ana".into());
        tree
    }

    #[test]
    fn unlabeled_taxa_are_named_by_position() {
        let names: Vec<String> = taxa(&cherry()).into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Ana", "L2"]);
    }

    #[test]
    fn parse_formats() {
        for format in [
            OutputFormat::Newick,
            OutputFormat::Nexus,
            OutputFormat::Wordlist,
        ] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
        assert!("phylip".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn write_appends_newline() {
        let mut buffer = Vec::new();
        cherry().write(&mut buffer, OutputFormat::Newick).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "(Ana:0.5,:0.5);\n");
    }

    #[test]
    #[serial]
    fn write_file() {
        let path = std::env::temp_dir().join("phylosim_test_tree.nwk");
        cherry().write_to_file(&path, OutputFormat::Newick).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "(Ana:0.5,:0.5);\n");
        fs::remove_file(&path).unwrap();
    }
}
