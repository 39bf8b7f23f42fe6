use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::domain::{StackedLightCurve, StackedPoint};

/// Column names of the stacked light curve table, in output order
pub const OUTPUT_COLUMNS: [&str; 11] = [
    "###MJD",
    "uJy",
    "duJy",
    "duJyu",
    "duJyl",
    "duJym",
    "median",
    "phase_folded",
    "F",
    "RA",
    "Dec",
];

/// Convert a stacked light curve to a DataFrame with the output columns
pub fn stacked_to_dataframe(stacked: &StackedLightCurve) -> PolarsResult<DataFrame> {
    let points = &stacked.points;
    let column = |f: fn(&StackedPoint) -> f64| -> Vec<f64> { points.iter().map(f).collect() };

    let bands: Vec<&str> = points.iter().map(|p| p.band.label()).collect();

    df!(
        OUTPUT_COLUMNS[0] => column(|p| p.mjd),
        OUTPUT_COLUMNS[1] => column(|p| p.flux),
        OUTPUT_COLUMNS[2] => column(|p| p.flux_err),
        OUTPUT_COLUMNS[3] => column(|p| p.flux_err_upper),
        OUTPUT_COLUMNS[4] => column(|p| p.flux_err_lower),
        OUTPUT_COLUMNS[5] => column(|p| p.mean_flux_err),
        OUTPUT_COLUMNS[6] => column(|p| p.median_flux),
        OUTPUT_COLUMNS[7] => column(|p| p.phase_folded),
        OUTPUT_COLUMNS[8] => bands,
        OUTPUT_COLUMNS[9] => column(|p| p.position.ra),
        OUTPUT_COLUMNS[10] => column(|p| p.position.dec),
    )
}

/// Write a stacked light curve as a space-delimited table with one header row
pub fn write_stacked<W: Write>(stacked: &StackedLightCurve, writer: &mut W) -> Result<()> {
    let mut df = stacked_to_dataframe(stacked).context("Failed to build output table")?;
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(b' ')
        .finish(&mut df)
        .context("Failed to write stacked light curve")
}

/// Write a stacked light curve to `path`, replacing any existing file
pub fn write_stacked_file(stacked: &StackedLightCurve, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_stacked(stacked, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))
}
