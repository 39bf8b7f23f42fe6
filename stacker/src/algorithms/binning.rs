//! Assignment of epochs to time bins.
//!
//! Cyan epochs are attached to the nearest reference epoch. Orange epochs
//! are bucketed by day: with a width of one day the timestamp is truncated
//! to its integer day, otherwise it is rounded to the nearest multiple of
//! the width with ties going to the even multiple.

use crate::core::domain::Band;
use crate::core::error::{StackError, StackResult};
use crate::time::ReferenceEpochs;

/// Key identifying the bin an epoch belongs to.
///
/// Keys of one band always share a variant, and their ordering follows
/// time order because reference epochs are kept sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinKey {
    /// Index into the reference epoch set
    Reference(usize),
    /// Integer day of the bucket
    Bucket(i64),
}

/// Maps timestamps to bin keys for a fixed stack width and reference set.
#[derive(Debug, Clone, Copy)]
pub struct BinAssigner<'a> {
    stack_width: u32,
    reference_epochs: &'a ReferenceEpochs,
}

impl<'a> BinAssigner<'a> {
    pub fn new(stack_width: u32, reference_epochs: &'a ReferenceEpochs) -> Self {
        Self {
            stack_width,
            reference_epochs,
        }
    }

    pub fn stack_width(&self) -> u32 {
        self.stack_width
    }

    /// Compute the bin key of an observation taken at `mjd` in `band`.
    ///
    /// # Errors
    ///
    /// * `MalformedInput` if `mjd` is not finite
    /// * `Config` if a cyan epoch is binned against an empty reference set
    ///   or the stack width is zero
    pub fn assign(&self, mjd: f64, band: Band) -> StackResult<BinKey> {
        if !mjd.is_finite() {
            return Err(StackError::MalformedInput(format!(
                "non-finite timestamp {mjd} cannot be binned"
            )));
        }

        match band {
            Band::Cyan => self
                .reference_epochs
                .nearest_index(mjd)
                .map(BinKey::Reference)
                .ok_or_else(|| {
                    StackError::Config("no reference epochs available for cyan binning".into())
                }),
            Band::Orange => match self.stack_width {
                0 => Err(StackError::Config("stack width must be at least 1".into())),
                1 => Ok(BinKey::Bucket(mjd.trunc() as i64)),
                width => {
                    let width = f64::from(width);
                    Ok(BinKey::Bucket((width * (mjd / width).round_ties_even()) as i64))
                }
            },
        }
    }

    /// Timestamp (MJD) represented by a bin key.
    pub fn key_mjd(&self, key: BinKey) -> StackResult<f64> {
        match key {
            BinKey::Reference(i) => self.reference_epochs.get(i).ok_or_else(|| {
                StackError::Config(format!("reference epoch index {i} out of range"))
            }),
            BinKey::Bucket(day) => Ok(day as f64),
        }
    }

    /// Timestamp of the bin an observation at `mjd` falls into.
    pub fn bin_mjd(&self, mjd: f64, band: Band) -> StackResult<f64> {
        self.key_mjd(self.assign(mjd, band)?)
    }
}
