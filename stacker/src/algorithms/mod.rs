//! Binning and robust aggregation algorithms.
//!
//! This module provides the statistical core of the stacker: assigning epochs
//! to time bins and reducing each bin to a single outlier-robust point.
//!
//! # Components
//!
//! - [`statistics`]: Mean, median and interpolated quantiles
//! - [`binning`]: Band-dependent bin assignment
//! - [`aggregation`]: Per-bin reduction with one-shot outlier rejection
//!
//! # Example
//!
//! ```
//! use atlas_stacker::algorithms::{BinAssigner, RobustAggregator};
//! use atlas_stacker::core::domain::{Band, Epoch, SkyPosition};
//! use atlas_stacker::time::ReferenceEpochs;
//!
//! let refs = ReferenceEpochs::default();
//! let pos = SkyPosition::new(150.0, 2.5);
//! let bin: Vec<Epoch> = [100.0, 102.0, 98.0, 500.0]
//!     .iter()
//!     .map(|&f| Epoch::new(58400.0, f, 5.0, Band::Orange, pos))
//!     .collect();
//!
//! let aggregator = RobustAggregator::new(BinAssigner::new(7, &refs), Band::Orange, pos, 50.0);
//! let point = aggregator.aggregate(&bin).unwrap();
//! assert_eq!(point.n_epochs, 3);
//! ```

pub mod aggregation;
pub mod binning;
pub mod statistics;

pub use aggregation::RobustAggregator;
pub use binning::{BinAssigner, BinKey};
