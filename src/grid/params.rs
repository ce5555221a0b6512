use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{GridError, RegionMask};

/// Spot grid layout produced by the grid-fitting notebook.
///
/// Accepts both the positional JSON array
/// `[positions, grid_coords, n_rows, n_cols, spot_h, spot_w, mask_names]`
/// and the equivalent object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// `(row, col)` pixel centre of every spot, in label order
    pub positions: Vec<[f64; 2]>,

    /// `(grid row, grid col)` of every spot
    #[serde(default)]
    pub grid_coords: Vec<[f64; 2]>,

    /// Plate rows
    pub n_rows: usize,

    /// Plate columns
    pub n_cols: usize,

    /// Spot height in pixels
    pub spot_h: f64,

    /// Spot width in pixels
    pub spot_w: f64,

    /// Region name per spot; plate well names are used when empty
    #[serde(default)]
    pub mask_names: Vec<String>,
}

impl GridParams {
    /// Load grid parameters from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, GridError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parse grid parameters from a JSON string
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Region names in label order.
    ///
    /// Falls back to row-major plate well names when `mask_names` is empty.
    /// Fails when the count differs from the number of spots or a name repeats.
    pub fn region_names(&self) -> Result<Vec<String>, GridError> {
        let names = if self.mask_names.is_empty() {
            well_names(self.n_rows, self.n_cols)
        } else {
            self.mask_names.clone()
        };

        if names.len() != self.positions.len() {
            return Err(GridError::NameCountMismatch {
                spots: self.positions.len(),
                names: names.len(),
            });
        }

        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(GridError::DuplicateName(dup.clone()));
        }

        Ok(names)
    }

    /// Paint a `spot_h x spot_w` rectangle around every spot centre.
    ///
    /// Spot `i` receives label `i`. Pixels already claimed by an earlier spot
    /// keep their label; rectangles are clipped at the image border.
    pub fn rasterize(&self, height: usize, width: usize) -> RegionMask {
        let mut mask = RegionMask::background(height, width);

        for (label, [row, col]) in self.positions.iter().enumerate() {
            let rows = span(*row, self.spot_h, height);
            let cols = span(*col, self.spot_w, width);
            for r in rows {
                for c in cols.clone() {
                    if mask.get(r, c) < 0 {
                        mask.set(r, c, label as i64);
                    }
                }
            }
        }

        debug!(
            "Rasterized {} spots onto a {}x{} mask",
            self.positions.len(),
            height,
            width
        );
        mask
    }
}

/// Pixel range of extent `size` centred on `centre`, clipped to `0..limit`
fn span(centre: f64, size: f64, limit: usize) -> std::ops::Range<usize> {
    let start = (centre - size / 2.0).round();
    let end = start + size.round();
    let clip = |v: f64| v.clamp(0.0, limit as f64) as usize;
    clip(start)..clip(end)
}

/// Plate well names in row-major order: `A1, A2, ..., B1, ...`.
/// Rows past `Z` continue as `AA`, `AB`, ...
pub fn well_names(n_rows: usize, n_cols: usize) -> Vec<String> {
    (0..n_rows)
        .flat_map(|r| (1..=n_cols).map(move |c| format!("{}{}", row_letters(r), c)))
        .collect()
}

fn row_letters(mut row: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (row % 26) as u8);
        if row < 26 {
            break;
        }
        row = row / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_names() {
        let names = well_names(2, 3);
        assert_eq!(names, vec!["A1", "A2", "A3", "B1", "B2", "B3"]);
    }

    #[test]
    fn test_row_letters_past_z() {
        assert_eq!(row_letters(0), "A");
        assert_eq!(row_letters(25), "Z");
        assert_eq!(row_letters(26), "AA");
        assert_eq!(row_letters(27), "AB");
        assert_eq!(row_letters(52), "BA");
    }

    #[test]
    fn test_parse_positional_array() {
        let json = r#"[[[1.0, 1.0], [1.0, 4.0]], [[0, 0], [0, 1]], 1, 2, 2.0, 2.0, ["A1", "A2"]]"#;
        let params = GridParams::from_json(json).unwrap();
        assert_eq!(params.positions.len(), 2);
        assert_eq!(params.n_cols, 2);
        assert_eq!(params.region_names().unwrap(), vec!["A1", "A2"]);
    }

    #[test]
    fn test_parse_object_form_with_default_names() {
        let json = r#"{"positions": [[1.0, 1.0], [1.0, 4.0]], "n_rows": 1, "n_cols": 2,
                      "spot_h": 2.0, "spot_w": 2.0}"#;
        let params = GridParams::from_json(json).unwrap();
        assert!(params.grid_coords.is_empty());
        assert_eq!(params.region_names().unwrap(), vec!["A1", "A2"]);
    }

    #[test]
    fn test_name_count_mismatch() {
        let params = GridParams {
            positions: vec![[1.0, 1.0]],
            grid_coords: vec![],
            n_rows: 1,
            n_cols: 2,
            spot_h: 2.0,
            spot_w: 2.0,
            mask_names: vec![],
        };
        assert!(matches!(
            params.region_names(),
            Err(GridError::NameCountMismatch { spots: 1, names: 2 })
        ));
    }

    #[test]
    fn test_duplicate_names() {
        let params = GridParams {
            positions: vec![[1.0, 1.0], [1.0, 4.0]],
            grid_coords: vec![],
            n_rows: 1,
            n_cols: 2,
            spot_h: 2.0,
            spot_w: 2.0,
            mask_names: vec!["A1".to_string(), "A1".to_string()],
        };
        assert!(matches!(params.region_names(), Err(GridError::DuplicateName(_))));
    }

    #[test]
    fn test_rasterize() {
        let params = GridParams {
            positions: vec![[1.0, 1.0], [1.0, 4.0]],
            grid_coords: vec![],
            n_rows: 1,
            n_cols: 2,
            spot_h: 2.0,
            spot_w: 2.0,
            mask_names: vec![],
        };
        let mask = params.rasterize(3, 6);
        #[rustfmt::skip]
        let expected = vec![
            0, 0, -1, 1, 1, -1,
            0, 0, -1, 1, 1, -1,
            -1, -1, -1, -1, -1, -1,
        ];
        assert_eq!(mask.labels(), expected.as_slice());
    }

    #[test]
    fn test_rasterize_clips_and_keeps_first_painter() {
        let params = GridParams {
            positions: vec![[0.0, 0.0], [1.0, 1.0]],
            grid_coords: vec![],
            n_rows: 1,
            n_cols: 2,
            spot_h: 2.0,
            spot_w: 2.0,
            mask_names: vec![],
        };
        let mask = params.rasterize(2, 2);
        assert_eq!(mask.labels(), &[0, 1, 1, 1]);
    }
}
