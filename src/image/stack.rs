use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::matrix::read_matrix_file;
use super::ImageError;
use crate::annotation::IonKey;

/// Single ion intensity image in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityImage {
    height: usize,
    width: usize,
    pixels: Vec<f64>,
}

impl IntensityImage {
    /// Create an image, validating the buffer length against the shape
    pub fn new(height: usize, width: usize, pixels: Vec<f64>) -> Result<Self, ImageError> {
        if pixels.len() != height * width {
            return Err(ImageError::BufferLength {
                height,
                width,
                found: pixels.len(),
            });
        }
        Ok(Self {
            height,
            width,
            pixels,
        })
    }

    /// Build an image from nested rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ImageError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(ImageError::RaggedMatrix {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
        }
        Self::new(height, width, rows.concat())
    }

    /// Load an image from a delimited matrix file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let matrix = read_matrix_file::<f64, _>(path)?;
        Self::new(matrix.height, matrix.width, matrix.values)
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Flattened row-major pixel values
    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }
}

/// All ion images of one dataset, ordered by ion key
#[derive(Debug, Clone, Default)]
pub struct ImageStack {
    images: BTreeMap<IonKey, IntensityImage>,
}

impl ImageStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image; a second image for the same ion is rejected
    pub fn insert(&mut self, key: IonKey, image: IntensityImage) -> Result<(), ImageError> {
        match self.images.entry(key) {
            btree_map::Entry::Occupied(entry) => {
                Err(ImageError::DuplicateIon(entry.key().clone()))
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(image);
                Ok(())
            }
        }
    }

    /// Look up the image for an ion
    pub fn get(&self, key: &IonKey) -> Option<&IntensityImage> {
        self.images.get(key)
    }

    /// Iterate images in ion key order
    pub fn iter(&self) -> impl Iterator<Item = (&IonKey, &IntensityImage)> {
        self.images.iter()
    }

    /// Ion keys in order
    pub fn keys(&self) -> impl Iterator<Item = &IonKey> {
        self.images.keys()
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Keep only images whose ion appears in `keys`.
    ///
    /// Keys without an image are logged and skipped.
    pub fn retain_keys(&mut self, keys: &BTreeSet<IonKey>) {
        for missing in keys.iter().filter(|k| !self.images.contains_key(*k)) {
            warn!("No image available for annotation {}, skipping", missing);
        }
        let before = self.images.len();
        self.images.retain(|key, _| keys.contains(key));
        debug!(
            "Restricted image stack from {} to {} ions",
            before,
            self.images.len()
        );
    }

    /// Load images listed in a manifest CSV with a `formula,adduct,path`
    /// header. Relative paths resolve against the manifest's directory.
    pub fn from_manifest<P: AsRef<Path>>(manifest: P) -> Result<Self, ImageError> {
        let manifest = manifest.as_ref();
        let base_dir = manifest.parent().map(Path::to_path_buf).unwrap_or_default();
        let file = File::open(manifest).map_err(|e| ImageError::File {
            path: manifest.to_path_buf(),
            source: Box::new(e.into()),
        })?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ImageError::MissingColumn(name.to_string()))
        };
        let formula_col = column("formula")?;
        let adduct_col = column("adduct")?;
        let path_col = column("path")?;

        let mut stack = Self::new();
        for record in csv_reader.records() {
            let record = record?;
            let key = IonKey::new(
                record.get(formula_col).unwrap_or_default(),
                record.get(adduct_col).unwrap_or_default(),
            );
            let mut path = PathBuf::from(record.get(path_col).unwrap_or_default());
            if path.is_relative() {
                path = base_dir.join(path);
            }

            debug!("Loading image for {} from {}", key, path.display());
            let image = IntensityImage::from_file(&path)?;
            stack.insert(key, image)?;
        }

        info!(
            "Loaded {} ion images from {}",
            stack.len(),
            manifest.display()
        );
        Ok(stack)
    }
}

impl FromIterator<(IonKey, IntensityImage)> for ImageStack {
    /// Collect images; later duplicates replace earlier ones
    fn from_iter<I: IntoIterator<Item = (IonKey, IntensityImage)>>(iter: I) -> Self {
        Self {
            images: iter.into_iter().collect(),
        }
    }
}
