use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::MatchError;

/// A molecule expected in a given well
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Well (region) the molecule was spotted into
    pub well: String,

    /// Expected base formula, without adduct
    pub formula: String,

    /// Display name of the molecule
    pub molecule: String,
}

impl Target {
    /// Create a target
    pub fn new(
        well: impl Into<String>,
        formula: impl Into<String>,
        molecule: impl Into<String>,
    ) -> Self {
        Self {
            well: well.into(),
            formula: formula.into(),
            molecule: molecule.into(),
        }
    }
}

/// Read a target list file (comma separated, or tab for `.tsv`).
///
/// See [`read_targets`] for the layout.
pub fn read_targets_file<P: AsRef<Path>>(path: P) -> Result<Vec<Target>, MatchError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_targets(BufReader::new(file), crate::image::delimiter_for(path))
}

/// Read a headerless target list with positional columns
/// `well, molecule name, formula`.
///
/// Blank lines are skipped and fields are trimmed. Extra columns are ignored.
pub fn read_targets<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Target>, MatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut targets = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(targets.len() + 1, |p| p.line() as usize);
        match (record.get(0), record.get(1), record.get(2)) {
            (Some(well), Some(molecule), Some(formula)) => {
                targets.push(Target::new(well, formula, molecule));
            }
            _ => {
                return Err(MatchError::MalformedTarget {
                    line,
                    found: record.len(),
                })
            }
        }
    }

    debug!("Read {} targets", targets.len());
    Ok(targets)
}
