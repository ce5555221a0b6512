//! # Grid Module
//!
//! Spatial regions ("spots" or "wells") over the pixel grid of an imaging
//! dataset.
//!
//! A [`RegionMask`] assigns each pixel an integer label; region names are
//! paired with labels by position. Masks come either from a pre-computed
//! label matrix or from rasterising a [`GridParams`] layout.

mod error;
mod mask;
mod params;

pub use error::GridError;
pub use mask::{RegionMask, BACKGROUND_LABEL};
pub use params::{well_names, GridParams};
