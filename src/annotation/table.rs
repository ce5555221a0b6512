use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{AnnotationError, IonKey};

/// One annotation row as exported from the annotation service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Molecular formula
    pub formula: String,

    /// Adduct with sign (empty after adduct merging)
    pub adduct: String,

    /// Theoretical m/z of the ion
    pub mz: Option<f64>,

    /// Metabolite signal match score
    pub msm: Option<f64>,

    /// False discovery rate level the annotation was accepted at
    pub fdr: Option<f64>,

    /// Candidate molecule names
    pub molecule_names: Vec<String>,

    /// Candidate molecule database identifiers
    pub molecule_ids: Vec<String>,

    /// Databases reporting this annotation
    pub databases: Vec<String>,
}

impl Annotation {
    /// Create an annotation with only its identity filled in
    pub fn new(formula: &str, adduct: &str) -> Self {
        Self {
            formula: formula.to_string(),
            adduct: adduct.to_string(),
            ..Default::default()
        }
    }

    /// Structured key of this annotation
    pub fn key(&self) -> IonKey {
        IonKey::new(&self.formula, &self.adduct)
    }

    /// Fold another row for the same ion (or formula) into this one:
    /// first m/z wins, best MSM, lowest FDR, union of molecule lists.
    fn absorb(&mut self, other: Annotation) {
        if self.mz.is_none() {
            self.mz = other.mz;
        }
        self.msm = max_option(self.msm, other.msm);
        self.fdr = min_option(self.fdr, other.fdr);
        self.molecule_names = union(&self.molecule_names, other.molecule_names);
        self.molecule_ids = union(&self.molecule_ids, other.molecule_ids);
        self.databases = union(&self.databases, other.databases);
    }
}

fn max_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn union(a: &[String], b: Vec<String>) -> Vec<String> {
    let set: BTreeSet<String> = a.iter().cloned().chain(b).collect();
    set.into_iter().collect()
}

/// Annotation table for one dataset
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    rows: Vec<Annotation>,
}

impl AnnotationTable {
    /// Wrap already-parsed rows
    pub fn new(rows: Vec<Annotation>) -> Self {
        Self { rows }
    }

    /// Parse an annotation table from a CSV file
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, AnnotationError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse an annotation table from a reader.
    ///
    /// Requires either `formula` and `adduct` columns or an `ion` column.
    /// A row with neither a formula nor an ion value is an error.
    /// `moleculeNames`, `moleculeIds` and `database` hold `;`-separated lists.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, AnnotationError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let formula_col = column("formula");
        let adduct_col = column("adduct");
        let ion_col = column("ion");
        if (formula_col.is_none() || adduct_col.is_none()) && ion_col.is_none() {
            return Err(AnnotationError::MissingColumn("formula/adduct".to_string()));
        }
        let mz_col = column("mz");
        let msm_col = column("msm");
        let fdr_col = column("fdr");
        let names_col = column("moleculenames");
        let ids_col = column("moleculeids");
        let db_col = column("database");

        let mut rows = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = idx + 1;
            let field = |col: Option<usize>| {
                col.and_then(|c| record.get(c))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
            };

            let key = match (field(formula_col), adduct_col) {
                (Some(formula), Some(adduct_col)) => IonKey::new(
                    formula,
                    record.get(adduct_col).map(str::trim).unwrap_or_default(),
                ),
                _ => match field(ion_col) {
                    Some(ion) => IonKey::parse_ion(ion)?,
                    None => return Err(AnnotationError::MissingIdentity { row }),
                },
            };

            rows.push(Annotation {
                formula: key.formula,
                adduct: key.adduct,
                mz: parse_number(field(mz_col), "mz", row)?,
                msm: parse_number(field(msm_col), "msm", row)?,
                fdr: parse_number(field(fdr_col), "fdr", row)?,
                molecule_names: split_list(field(names_col)),
                molecule_ids: split_list(field(ids_col)),
                databases: split_list(field(db_col)),
            });
        }

        debug!("Parsed {} annotation rows", rows.len());
        Ok(Self { rows })
    }

    /// Annotation rows in table order
    pub fn rows(&self) -> &[Annotation] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct ion keys in sorted order
    pub fn keys(&self) -> BTreeSet<IonKey> {
        self.rows.iter().map(Annotation::key).collect()
    }

    /// Keep annotations accepted at or below the FDR threshold.
    /// Rows without an FDR value are kept.
    pub fn filter_by_fdr(self, threshold: f64) -> Self {
        let rows = self
            .rows
            .into_iter()
            .filter(|a| a.fdr.map_or(true, |fdr| fdr <= threshold))
            .collect();
        Self { rows }
    }

    /// Keep annotations whose formula appears in `formulas`
    pub fn filter_by_formulas<S: AsRef<str>>(self, formulas: &[S]) -> Self {
        let wanted: HashSet<&str> = formulas.iter().map(AsRef::as_ref).collect();
        let rows = self
            .rows
            .into_iter()
            .filter(|a| wanted.contains(a.formula.as_str()))
            .collect();
        Self { rows }
    }

    /// Collapse duplicate rows of the same ion reported by several databases.
    /// The result is sorted by ion key.
    pub fn dedup_by_ion(self) -> Self {
        let mut merged: BTreeMap<IonKey, Annotation> = BTreeMap::new();
        for row in self.rows {
            match merged.get_mut(&row.key()) {
                Some(existing) => existing.absorb(row),
                None => {
                    merged.insert(row.key(), row);
                }
            }
        }
        Self {
            rows: merged.into_values().collect(),
        }
    }

    /// Collapse all adducts of each formula into a single row with an empty
    /// adduct. The result is sorted by formula.
    pub fn merge_adducts(self) -> Self {
        let mut merged: BTreeMap<String, Annotation> = BTreeMap::new();
        for mut row in self.rows {
            row.adduct.clear();
            match merged.get_mut(&row.formula) {
                Some(existing) => existing.absorb(row),
                None => {
                    merged.insert(row.formula.clone(), row);
                }
            }
        }
        Self {
            rows: merged.into_values().collect(),
        }
    }

    /// Write the table back out as CSV
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), AnnotationError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "ion",
            "formula",
            "adduct",
            "mz",
            "msm",
            "fdr",
            "moleculeNames",
            "moleculeIds",
            "database",
        ])?;
        for row in &self.rows {
            csv_writer.write_record([
                row.key().ion(),
                row.formula.clone(),
                row.adduct.clone(),
                format_option(row.mz),
                format_option(row.msm),
                format_option(row.fdr),
                row.molecule_names.join(";"),
                row.molecule_ids.join(";"),
                row.databases.join(";"),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn parse_number(
    value: Option<&str>,
    column: &str,
    row: usize,
) -> Result<Option<f64>, AnnotationError> {
    value
        .map(|v| {
            v.parse::<f64>().map_err(|_| AnnotationError::InvalidValue {
                column: column.to_string(),
                row,
                value: v.to_string(),
            })
        })
        .transpose()
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn format_option(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
