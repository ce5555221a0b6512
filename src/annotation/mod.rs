//! # Annotation Module
//!
//! Ion annotations as exported by the annotation service: one row per
//! `(formula, adduct)` with scores, FDR level and candidate molecules.
//!
//! Ions are identified by the structured [`IonKey`]. The concatenated
//! `formula+adduct` string only appears in output files.
//!
//! ## Table Operations
//!
//! - [`AnnotationTable::filter_by_fdr`]: drop annotations above an FDR level
//! - [`AnnotationTable::dedup_by_ion`]: collapse inter-database duplicates
//! - [`AnnotationTable::merge_adducts`]: one entry per formula
//! - [`AnnotationTable::filter_by_formulas`]: restrict to a formula list

mod error;
mod key;
mod table;


pub use error::AnnotationError;
pub use key::{base_formula, IonKey};
pub use table::{Annotation, AnnotationTable};
