//! Epoch- and point-level cuts applied around stacking.
//!
//! This module provides the quality cuts of the stacker: dropping raw epochs
//! with unusable values or large uncertainties before binning, and dropping
//! stacked points whose final uncertainty is still too large.
//!
//! # Modules
//!
//! - [`cleaning`]: Remove epochs with non-finite timestamp or flux
//! - [`filtering`]: Uncertainty cuts before and after stacking
//!
//! # Example
//!
//! ```
//! use atlas_stacker::core::domain::{Band, Epoch, LightCurve, SkyPosition};
//! use atlas_stacker::transformations::prefilter;
//!
//! let pos = SkyPosition::default();
//! let lc = LightCurve::new(vec![
//!     Epoch::new(58400.0, 10.0, 5.0, Band::Orange, pos),
//!     Epoch::new(58401.0, 10.0, 80.0, Band::Orange, pos),
//! ]);
//! assert_eq!(prefilter(&lc, 45.0).len(), 1);
//! ```

pub mod cleaning;
pub mod filtering;

pub use cleaning::remove_non_finite;
pub use filtering::{postfilter, prefilter};
