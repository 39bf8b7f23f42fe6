//! ATLAS light curve stacking.
//!
//! Bins forced-photometry epochs (cyan epochs around the nearest reference
//! epoch, orange epochs on a fixed-width grid), reduces each bin with a
//! robust mean and quartile-based uncertainty, and writes the stacked light
//! curves back out as tables.

pub mod algorithms;
pub mod batch;
pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod time;
pub mod transformations;

pub use crate::batch::{BatchReport, BatchRunner};
pub use crate::config::{BatchConfig, StackConfig, StackerConfig};
pub use crate::core::{Band, Epoch, LightCurve, StackError, StackResult, StackedLightCurve, StackedPoint};
pub use crate::preprocessing::StackingPipeline;
pub use crate::time::ReferenceEpochs;
