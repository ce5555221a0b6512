//! # Image Module
//!
//! Per-ion intensity images and the delimited-text matrices they are loaded
//! from. Images are kept in an [`ImageStack`] ordered by [`IonKey`], so every
//! consumer sees ions in the same order.
//!
//! [`IonKey`]: crate::annotation::IonKey

mod error;
mod matrix;
mod stack;

pub use error::ImageError;
pub use matrix::{delimiter_for, read_matrix, read_matrix_file, Matrix};
pub use stack::{ImageStack, IntensityImage};
