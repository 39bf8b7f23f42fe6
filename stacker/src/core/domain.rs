//! Domain models for photometric epochs and stacked light curves.
//!
//! This module provides the core data structures that flow through the
//! stacker: raw per-epoch flux measurements, the light curve that owns them,
//! and the reduced points produced by stacking.

use std::fmt;
use std::str::FromStr;

use crate::core::error::StackError;

/// Photometric filter band of the survey.
///
/// Only two bands are observed. Each band is binned differently: cyan epochs
/// are grouped around externally supplied reference epochs, orange epochs are
/// grouped into fixed-width day buckets.
///
/// # Examples
///
/// ```
/// use atlas_stacker::core::domain::Band;
///
/// let band: Band = "c".parse().unwrap();
/// assert_eq!(band, Band::Cyan);
/// assert_eq!(band.label(), "c");
/// assert!("x".parse::<Band>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    Cyan,
    Orange,
}

impl Band {
    /// Order in which bands are emitted into a stacked light curve.
    pub const OUTPUT_ORDER: [Band; 2] = [Band::Orange, Band::Cyan];

    /// Single-letter label used in light curve tables.
    pub fn label(&self) -> &'static str {
        match self {
            Band::Cyan => "c",
            Band::Orange => "o",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Band {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cyan" => Ok(Band::Cyan),
            "o" | "orange" => Ok(Band::Orange),
            other => Err(StackError::InvalidBand(other.to_string())),
        }
    }
}

/// Equatorial position of the source in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkyPosition {
    pub ra: f64,
    pub dec: f64,
}

impl SkyPosition {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }
}

/// Per-epoch fit parameters reported by the photometry pipeline.
///
/// None of these take part in stacking; they are read so that a parsed
/// epoch keeps everything its row carried.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitMetadata {
    pub mag: Option<f64>,
    pub mag_err: Option<f64>,
    pub fit_err: Option<f64>,
    pub chi_n: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub major: Option<f64>,
    pub minor: Option<f64>,
    pub phi: Option<f64>,
    pub apfit: Option<f64>,
    pub mag_5sigma: Option<f64>,
    pub sky: Option<f64>,
    pub observation: Option<String>,
}

/// A single raw flux measurement.
///
/// # Fields
///
/// * `mjd` - Observation time (Modified Julian Date)
/// * `flux` - Flux in µJy
/// * `flux_err` - Flux uncertainty in µJy
/// * `band` - Filter band
/// * `position` - Sky position reported for this epoch
/// * `metadata` - Fit parameters carried through unmodified
#[derive(Debug, Clone, PartialEq)]
pub struct Epoch {
    pub mjd: f64,
    pub flux: f64,
    pub flux_err: f64,
    pub band: Band,
    pub position: SkyPosition,
    pub metadata: FitMetadata,
}

impl Epoch {
    /// Creates an epoch without fit metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use atlas_stacker::core::domain::{Band, Epoch, SkyPosition};
    ///
    /// let epoch = Epoch::new(58400.2, 120.0, 8.0, Band::Orange, SkyPosition::new(10.0, -5.0));
    /// assert_eq!(epoch.band, Band::Orange);
    /// assert!(epoch.metadata.observation.is_none());
    /// ```
    pub fn new(mjd: f64, flux: f64, flux_err: f64, band: Band, position: SkyPosition) -> Self {
        Self {
            mjd,
            flux,
            flux_err,
            band,
            position,
            metadata: FitMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: FitMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Raw light curve of one source, in the order the epochs were read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightCurve {
    pub epochs: Vec<Epoch>,
}

impl LightCurve {
    pub fn new(epochs: Vec<Epoch>) -> Self {
        Self { epochs }
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Position of the first epoch, used as the position of the source.
    pub fn position(&self) -> Option<SkyPosition> {
        self.epochs.first().map(|e| e.position)
    }

    /// Epochs observed in `band`, keeping their original order.
    pub fn band_epochs(&self, band: Band) -> Vec<Epoch> {
        self.epochs
            .iter()
            .filter(|e| e.band == band)
            .cloned()
            .collect()
    }
}

/// One aggregated point of a stacked light curve.
///
/// `flux_err` is the reported uncertainty. When the quartile spread of the
/// bin is smaller than the mean per-epoch uncertainty, all three error fields
/// equal `mean_flux_err`; otherwise `flux_err` is half the interquartile
/// range and the lower/upper fields hold the distance of the quartiles from
/// the median.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPoint {
    pub mjd: f64,
    pub flux: f64,
    pub flux_err: f64,
    pub flux_err_upper: f64,
    pub flux_err_lower: f64,
    pub mean_flux_err: f64,
    pub median_flux: f64,
    pub phase_folded: f64,
    pub band: Band,
    pub position: SkyPosition,
    pub n_epochs: usize,
}

/// Stacked light curve of one source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedLightCurve {
    pub points: Vec<StackedPoint>,
}

impl StackedLightCurve {
    pub fn new(points: Vec<StackedPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn band_points(&self, band: Band) -> impl Iterator<Item = &StackedPoint> {
        self.points.iter().filter(move |p| p.band == band)
    }
}
