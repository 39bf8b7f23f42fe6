//! Time utilities: Modified Julian Date helpers and reference epoch sets.

pub mod mjd;
pub mod reference_epochs;

pub use mjd::{datetime_to_mjd, parse_iso_to_mjd, phase_fold, PHASE_FOLD_DAYS};
pub use reference_epochs::ReferenceEpochs;
