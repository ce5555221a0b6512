use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use super::ImageError;

/// Row-major 2-D matrix read from delimited text
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    /// Number of rows
    pub height: usize,
    /// Number of columns
    pub width: usize,
    /// Row-major cells
    pub values: Vec<T>,
}

/// Pick the field delimiter from a file extension: tab for `.tsv`/`.txt`,
/// comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("tsv") | Some("txt") => b'\t',
        _ => b',',
    }
}

/// Read a headerless delimited numeric matrix from a file
pub fn read_matrix_file<T, P>(path: P) -> Result<Matrix<T>, ImageError>
where
    T: FromStr,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let wrap = |e: ImageError| ImageError::File {
        path: path.to_path_buf(),
        source: Box::new(e),
    };
    let file = File::open(path).map_err(|e| wrap(e.into()))?;
    read_matrix(BufReader::new(file), delimiter_for(path)).map_err(wrap)
}

/// Read a headerless delimited numeric matrix.
///
/// Blank lines are skipped. Every row must have the width of the first one.
pub fn read_matrix<T, R>(reader: R, delimiter: u8) -> Result<Matrix<T>, ImageError>
where
    T: FromStr,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::new();
    let mut width = None;
    let mut height = 0;

    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            return Err(ImageError::RaggedMatrix {
                row: height,
                expected,
                found: record.len(),
            });
        }

        for (column, cell) in record.iter().enumerate() {
            let value = cell.parse::<T>().map_err(|_| ImageError::InvalidValue {
                row: height,
                column,
                value: cell.to_string(),
            })?;
            values.push(value);
        }
        height += 1;
    }

    Ok(Matrix {
        height,
        width: width.unwrap_or(0),
        values,
    })
}
