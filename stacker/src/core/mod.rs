//! Core domain models for photometric stacking.
//!
//! This module defines the fundamental data structures used throughout the
//! stacker, representing raw epochs, light curves and stacked points, along
//! with the error type shared by every stage.

pub mod domain;
pub mod error;

pub use domain::{Band, Epoch, FitMetadata, LightCurve, SkyPosition, StackedLightCurve, StackedPoint};
pub use error::{StackError, StackResult};
