use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

use crate::core::domain::{Band, Epoch, FitMetadata, LightCurve, SkyPosition};
use crate::core::error::{StackError, StackResult};

/// Accepted names of the timestamp column
pub const MJD_COLUMNS: &[&str] = &["###MJD", "MJD", "mjd"];

pub const FLUX_COLUMN: &str = "uJy";
pub const FLUX_ERR_COLUMN: &str = "duJy";
pub const BAND_COLUMN: &str = "F";
pub const RA_COLUMN: &str = "RA";
pub const DEC_COLUMN: &str = "Dec";

/// Parse a light curve table from a file
pub fn parse_lightcurve_file(path: &Path) -> StackResult<LightCurve> {
    let content = std::fs::read_to_string(path)?;
    parse_lightcurve_str(&content)
}

/// Parse a light curve table from a string
pub fn parse_lightcurve_str(content: &str) -> StackResult<LightCurve> {
    let df = read_table(content)?;
    dataframe_to_lightcurve(&df)
}

/// Read a delimited table with one header row into a DataFrame
///
/// Tables whose header contains a comma are read as CSV. Otherwise fields are
/// separated by runs of whitespace, which are collapsed to single spaces
/// before the table is handed to the CSV reader.
pub fn read_table(content: &str) -> StackResult<DataFrame> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines
        .next()
        .ok_or_else(|| StackError::MalformedInput("missing header row".to_string()))?;

    let separator = if header.contains(',') { b',' } else { b' ' };
    let mut normalized = String::with_capacity(content.len());
    for line in std::iter::once(header).chain(lines) {
        if separator == b' ' {
            normalized.push_str(&line.split_whitespace().collect::<Vec<_>>().join(" "));
        } else {
            normalized.push_str(line);
        }
        normalized.push('\n');
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(normalized.into_bytes()))
        .finish()
        .map_err(|e| StackError::MalformedInput(format!("unreadable table: {}", e)))
}

/// Convert a light curve DataFrame to epochs
///
/// Required columns: timestamp (see [`MJD_COLUMNS`]), `uJy`, `duJy`, `F`,
/// `RA` and `Dec`. Null numeric cells become NaN; a null or unknown band
/// label fails the whole table.
pub fn dataframe_to_lightcurve(df: &DataFrame) -> StackResult<LightCurve> {
    let mjd_name = find_column(df, MJD_COLUMNS)?;
    let mjds = float_column(df, mjd_name)?;
    let fluxes = float_column(df, FLUX_COLUMN)?;
    let flux_errs = float_column(df, FLUX_ERR_COLUMN)?;
    let bands = string_column(df, BAND_COLUMN)?;
    let ras = float_column(df, RA_COLUMN)?;
    let decs = float_column(df, DEC_COLUMN)?;

    if df.height() == 0 {
        return Err(StackError::MalformedInput("empty light curve".to_string()));
    }

    let mag = optional_float_column(df, "m");
    let mag_err = optional_float_column(df, "dm");
    let fit_err = optional_float_column(df, "err");
    let chi_n = optional_float_column(df, "chi/N");
    let x = optional_float_column(df, "x");
    let y = optional_float_column(df, "y");
    let major = optional_float_column(df, "maj");
    let minor = optional_float_column(df, "min");
    let phi = optional_float_column(df, "phi");
    let apfit = optional_float_column(df, "apfit");
    let mag_5sigma = optional_float_column(df, "mag5sig");
    let sky = optional_float_column(df, "Sky");
    let observation = string_column(df, "Obs").ok();

    let mut epochs = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let band: Band = bands[i]
            .as_deref()
            .ok_or_else(|| StackError::MalformedInput(format!("missing band at row {}", i)))?
            .parse()?;

        let metadata = FitMetadata {
            mag: cell(&mag, i),
            mag_err: cell(&mag_err, i),
            fit_err: cell(&fit_err, i),
            chi_n: cell(&chi_n, i),
            x: cell(&x, i),
            y: cell(&y, i),
            major: cell(&major, i),
            minor: cell(&minor, i),
            phi: cell(&phi, i),
            apfit: cell(&apfit, i),
            mag_5sigma: cell(&mag_5sigma, i),
            sky: cell(&sky, i),
            observation: observation.as_ref().and_then(|col| col[i].clone()),
        };

        epochs.push(
            Epoch::new(
                mjds[i].unwrap_or(f64::NAN),
                fluxes[i].unwrap_or(f64::NAN),
                flux_errs[i].unwrap_or(f64::NAN),
                band,
                SkyPosition::new(ras[i].unwrap_or(f64::NAN), decs[i].unwrap_or(f64::NAN)),
            )
            .with_metadata(metadata),
        );
    }

    Ok(LightCurve::new(epochs))
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

fn find_column<'a>(df: &DataFrame, candidates: &[&'a str]) -> StackResult<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|name| has_column(df, name))
        .ok_or_else(|| {
            StackError::MalformedInput(format!("missing required column: {}", candidates[0]))
        })
}

fn float_column(df: &DataFrame, name: &str) -> StackResult<Vec<Option<f64>>> {
    if !has_column(df, name) {
        return Err(StackError::MalformedInput(format!(
            "missing required column: {}",
            name
        )));
    }
    let raw = df.column(name)?;
    let column = raw.cast(&DataType::Float64).map_err(|e| {
        StackError::MalformedInput(format!("column '{}' is not numeric: {}", name, e))
    })?;
    // Empty cells are already null; any further null is a cell that failed to parse
    if column.null_count() > raw.null_count() {
        return Err(StackError::MalformedInput(format!(
            "column '{}' holds non-numeric values",
            name
        )));
    }
    let values = column.f64()?.into_iter().collect();
    Ok(values)
}

fn optional_float_column(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
    if !has_column(df, name) {
        return None;
    }
    float_column(df, name).ok()
}

fn string_column(df: &DataFrame, name: &str) -> StackResult<Vec<Option<String>>> {
    if !has_column(df, name) {
        return Err(StackError::MalformedInput(format!(
            "missing required column: {}",
            name
        )));
    }
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

fn cell(column: &Option<Vec<Option<f64>>>, row: usize) -> Option<f64> {
    column.as_ref().and_then(|col| col.get(row).copied().flatten())
}
