//! Robust reduction of one bin of epochs to a stacked point.
//!
//! A bin with more than two epochs is reduced to its mean flux together
//! with an uncertainty that is the larger of two estimates: half the
//! interquartile range of the fluxes, and the mean of the per-epoch
//! uncertainties. When that uncertainty exceeds the band limit, the single
//! epoch with the largest absolute flux is dropped and the bin is reduced
//! once more. There is never a second retry.

use log::debug;

use crate::algorithms::binning::BinAssigner;
use crate::algorithms::statistics::{mean, quartiles};
use crate::core::domain::{Band, Epoch, SkyPosition, StackedPoint};
use crate::core::error::{StackError, StackResult};
use crate::time::{phase_fold, PHASE_FOLD_DAYS};

/// Bins with this many epochs or fewer produce no point.
pub const MIN_EPOCHS_EXCLUSIVE: usize = 2;

/// Reduces bins of one band to stacked points.
#[derive(Debug, Clone, Copy)]
pub struct RobustAggregator<'a> {
    assigner: BinAssigner<'a>,
    band: Band,
    position: SkyPosition,
    error_limit: f64,
}

impl<'a> RobustAggregator<'a> {
    /// # Arguments
    /// * `assigner` - Binning rule used to date the bin
    /// * `band` - Band of every epoch handed to this aggregator
    /// * `position` - Sky position written into each point
    /// * `error_limit` - Uncertainty above which one outlier is rejected
    pub fn new(
        assigner: BinAssigner<'a>,
        band: Band,
        position: SkyPosition,
        error_limit: f64,
    ) -> Self {
        Self {
            assigner,
            band,
            position,
            error_limit,
        }
    }

    /// Reduce one bin, allowing a single outlier rejection.
    ///
    /// # Errors
    ///
    /// * `InsufficientData` if the bin (or what is left of it after the
    ///   retry) holds two epochs or fewer
    /// * binning errors for the bin's first epoch
    pub fn aggregate(&self, samples: &[Epoch]) -> StackResult<StackedPoint> {
        self.aggregate_with_retry(samples, true)
    }

    /// Reduce one bin; `allow_retry` controls the outlier rejection.
    pub fn aggregate_with_retry(
        &self,
        samples: &[Epoch],
        allow_retry: bool,
    ) -> StackResult<StackedPoint> {
        let point = self.reduce(samples)?;

        if point.flux_err > self.error_limit && allow_retry {
            let Some(outlier) = brightest_index(samples) else {
                return Ok(point);
            };
            debug!(
                "{} bin at MJD {}: uncertainty {:.3} above {:.3}, rejecting flux {}",
                self.band, point.mjd, point.flux_err, self.error_limit, samples[outlier].flux
            );

            let mut trimmed = samples.to_vec();
            trimmed.remove(outlier);
            return self.aggregate_with_retry(&trimmed, false);
        }

        Ok(point)
    }

    fn reduce(&self, samples: &[Epoch]) -> StackResult<StackedPoint> {
        let first = samples.first().ok_or(StackError::InsufficientData {
            bin_mjd: f64::NAN,
            epochs: 0,
        })?;

        // The bin is dated by its first epoch, not by an average over the group.
        let mjd = self.assigner.bin_mjd(first.mjd, self.band)?;
        if samples.len() <= MIN_EPOCHS_EXCLUSIVE {
            return Err(StackError::InsufficientData {
                bin_mjd: mjd,
                epochs: samples.len(),
            });
        }

        let fluxes: Vec<f64> = samples.iter().map(|e| e.flux).collect();
        let errors: Vec<f64> = samples.iter().map(|e| e.flux_err).collect();

        let insufficient = || StackError::InsufficientData {
            bin_mjd: mjd,
            epochs: samples.len(),
        };
        let flux = mean(&fluxes).ok_or_else(insufficient)?;
        let mean_flux_err = mean(&errors).ok_or_else(insufficient)?;
        let (q25, q50, q75) = quartiles(&fluxes).ok_or_else(insufficient)?;
        let quantile_err = 0.5 * (q75 - q25);

        let (flux_err, flux_err_lower, flux_err_upper) = if quantile_err < mean_flux_err {
            (mean_flux_err, mean_flux_err, mean_flux_err)
        } else {
            (quantile_err, q50 - q25, q75 - q50)
        };

        Ok(StackedPoint {
            mjd,
            flux,
            flux_err,
            flux_err_upper,
            flux_err_lower,
            mean_flux_err,
            median_flux: q50,
            phase_folded: phase_fold(mjd, PHASE_FOLD_DAYS),
            band: self.band,
            position: self.position,
            n_epochs: samples.len(),
        })
    }
}

/// Index of the first epoch with the largest absolute flux.
fn brightest_index(samples: &[Epoch]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, e) in samples.iter().enumerate() {
        let magnitude = e.flux.abs();
        match best {
            Some((_, m)) if magnitude <= m => {}
            _ => best = Some((i, magnitude)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ReferenceEpochs;

    const POS: SkyPosition = SkyPosition { ra: 150.0, dec: 2.5 };

    fn epochs(band: Band, start: f64, fluxes: &[f64], errors: &[f64]) -> Vec<Epoch> {
        fluxes
            .iter()
            .zip(errors)
            .enumerate()
            .map(|(i, (&f, &e))| Epoch::new(start + i as f64 * 0.1, f, e, band, POS))
            .collect()
    }

    #[test]
    fn test_two_epochs_yield_nothing() {
        let refs = ReferenceEpochs::default();
        let agg = RobustAggregator::new(BinAssigner::new(7, &refs), Band::Orange, POS, 50.0);
        let bin = epochs(Band::Orange, 58400.0, &[100.0, 101.0], &[5.0, 5.0]);

        let err = agg.aggregate(&bin).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_outlier_rejected_once() {
        let refs = ReferenceEpochs::default();
        let agg = RobustAggregator::new(BinAssigner::new(7, &refs), Band::Orange, POS, 50.0);
        let bin = epochs(
            Band::Orange,
            58400.0,
            &[100.0, 102.0, 98.0, 500.0],
            &[5.0, 5.0, 5.0, 6.0],
        );

        // Without the retry the quartile spread wins: 0.5 * (201.5 - 99.5)
        let raw = agg.aggregate_with_retry(&bin, false).unwrap();
        assert_eq!(raw.flux_err, 51.0);
        assert_eq!(raw.mean_flux_err, 5.25);

        let point = agg.aggregate(&bin).unwrap();
        assert_eq!(point.n_epochs, 3);
        assert!((point.flux - 100.0).abs() < 1e-12);
        assert_eq!(point.median_flux, 100.0);
        assert_eq!(point.mean_flux_err, 5.0);
        assert_eq!(point.flux_err, 5.0);
        assert_eq!(point.flux_err_lower, 5.0);
        assert_eq!(point.flux_err_upper, 5.0);
        assert_eq!(point.mjd, 58401.0);
        assert_eq!(point.phase_folded, 58401.0 % 365.0);
        assert_eq!(point.position, POS);
    }

    #[test]
    fn test_second_outlier_survives() {
        let refs = ReferenceEpochs::default();
        let agg = RobustAggregator::new(BinAssigner::new(7, &refs), Band::Orange, POS, 50.0);
        let bin = epochs(
            Band::Orange,
            58400.0,
            &[100.0, 102.0, 98.0, 500.0, 700.0],
            &[5.0; 5],
        );

        // First pass: 0.5 * (500 - 100) rejects 700, second pass keeps 500
        let point = agg.aggregate(&bin).unwrap();
        assert_eq!(point.n_epochs, 4);
        assert_eq!(point.flux_err, 51.0);
        assert!((point.flux - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_retry_down_to_two_epochs_yields_nothing() {
        let refs = ReferenceEpochs::default();
        let agg = RobustAggregator::new(BinAssigner::new(7, &refs), Band::Orange, POS, 10.0);
        let bin = epochs(Band::Orange, 58400.0, &[0.0, 100.0, 1000.0], &[5.0; 3]);

        let err = agg.aggregate(&bin).unwrap_err();
        assert!(matches!(err, StackError::InsufficientData { epochs: 2, .. }));
    }

    #[test]
    fn test_asymmetric_quartile_errors() {
        let refs = ReferenceEpochs::default();
        let agg = RobustAggregator::new(BinAssigner::new(1, &refs), Band::Orange, POS, 1e9);
        let bin = epochs(Band::Orange, 58400.0, &[10.0, 20.0, 30.0, 70.0, 110.0], &[1.0; 5]);

        let point = agg.aggregate(&bin).unwrap();
        // q25 = 20, q50 = 30, q75 = 70
        assert_eq!(point.flux_err, 25.0);
        assert_eq!(point.flux_err_lower, 10.0);
        assert_eq!(point.flux_err_upper, 40.0);
        assert_eq!(point.median_flux, 30.0);
        assert_eq!(point.mjd, 58400.0);
    }

    #[test]
    fn test_cyan_bin_dated_by_first_epoch() {
        let refs = ReferenceEpochs::new(vec![58400.0, 58420.0, 58450.0]);
        let agg = RobustAggregator::new(BinAssigner::new(7, &refs), Band::Cyan, POS, 35.0);
        let bin = epochs(Band::Cyan, 58415.0, &[10.0, 11.0, 12.0], &[2.0; 3]);

        let point = agg.aggregate(&bin).unwrap();
        assert_eq!(point.mjd, 58420.0);
        assert_eq!(point.band, Band::Cyan);
    }

    #[test]
    fn test_brightest_index_uses_absolute_flux() {
        let bin = epochs(Band::Orange, 0.0, &[10.0, -50.0, 50.0, 3.0], &[1.0; 4]);
        assert_eq!(brightest_index(&bin), Some(1));
        assert_eq!(brightest_index(&[]), None);
    }
}
