//! Orchestration of the stacking stages for one light curve.

pub mod pipeline;

pub use pipeline::{group_by_bin, stack_lightcurve, StackingPipeline};
