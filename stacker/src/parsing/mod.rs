//! Parsers for photometry input formats.
//!
//! # Parsers
//!
//! - [`lightcurve_parser`]: Parse forced-photometry light curve tables
//! - [`reference_epochs_parser`]: Parse reference epoch lists (`.npy`, JSON or text)
//!
//! # Example
//!
//! ```no_run
//! use atlas_stacker::parsing::lightcurve_parser::parse_lightcurve_file;
//! use std::path::Path;
//!
//! let lc = parse_lightcurve_file(Path::new("object.lc"))
//!     .expect("Failed to parse light curve");
//! println!("{} epochs", lc.len());
//! ```

pub mod lightcurve_parser;
pub mod reference_epochs_parser;


pub use lightcurve_parser::{parse_lightcurve_file, parse_lightcurve_str};
pub use reference_epochs_parser::{
    parse_reference_epochs_json, parse_reference_epochs_npy, parse_reference_epochs_text,
};
