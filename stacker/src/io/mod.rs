//! Reading and writing light curve files.
//!
//! [`loaders`] wraps the parsers with format detection and error context;
//! [`writer`] renders stacked light curves as space-delimited tables.
//!
//! # Example
//!
//! ```no_run
//! use atlas_stacker::io::{LightCurveLoader, ReferenceEpochLoader};
//! use std::path::Path;
//!
//! let refs = ReferenceEpochLoader::load_from_file(Path::new("new_moons.npy"))
//!     .expect("Failed to load reference epochs");
//! let lc = LightCurveLoader::load_from_file(Path::new("object.lc"))
//!     .expect("Failed to load light curve");
//! println!("{} epochs, {} reference epochs", lc.len(), refs.len());
//! ```

pub mod loaders;
pub mod writer;

pub use loaders::{LightCurveLoader, ReferenceEpochFormat, ReferenceEpochLoader};
pub use writer::{stacked_to_dataframe, write_stacked, write_stacked_file, OUTPUT_COLUMNS};
