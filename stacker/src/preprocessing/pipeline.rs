use log::{debug, warn};
use std::collections::BTreeMap;

use crate::algorithms::aggregation::RobustAggregator;
use crate::algorithms::binning::{BinAssigner, BinKey};
use crate::config::StackConfig;
use crate::core::domain::{Band, Epoch, LightCurve, SkyPosition, StackedLightCurve, StackedPoint};
use crate::core::error::{StackError, StackResult};
use crate::time::ReferenceEpochs;
use crate::transformations::{postfilter, prefilter, remove_non_finite};

/// Main stacking pipeline
///
/// Holds the thresholds and the reference epoch set for one run. Neither is
/// modified while stacking, so one pipeline can stack many light curves,
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct StackingPipeline {
    config: StackConfig,
    reference_epochs: ReferenceEpochs,
}

impl StackingPipeline {
    /// Create a pipeline, validating the configuration
    pub fn new(config: StackConfig, reference_epochs: ReferenceEpochs) -> StackResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reference_epochs,
        })
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn reference_epochs(&self) -> &ReferenceEpochs {
        &self.reference_epochs
    }

    /// Stack one light curve
    ///
    /// Steps:
    /// 1. Drop epochs with non-finite timestamp or flux
    /// 2. Drop epochs whose uncertainty reaches the global limit
    /// 3. Split by band and group each band by bin key
    /// 4. Reduce every bin (bins of two epochs or fewer yield nothing)
    /// 5. Drop points whose uncertainty reaches the band limit
    /// 6. Concatenate orange points, then cyan points, each in bin order
    ///
    /// # Errors
    /// * `MalformedInput` for an empty light curve
    /// * `Config` when cyan epochs exist but no reference epochs were given
    pub fn stack(&self, lightcurve: &LightCurve) -> StackResult<StackedLightCurve> {
        if lightcurve.is_empty() {
            return Err(StackError::MalformedInput("empty light curve".to_string()));
        }

        let (cleaned, _) = remove_non_finite(lightcurve);
        let kept = prefilter(&cleaned, self.config.global_error_limit);
        debug!(
            "Kept {} of {} epochs below {} uJy",
            kept.len(),
            lightcurve.len(),
            self.config.global_error_limit
        );

        let Some(position) = kept.position() else {
            warn!("No epoch passed the uncertainty cut; stacked light curve is empty");
            return Ok(StackedLightCurve::default());
        };

        let assigner = BinAssigner::new(self.config.stack_width, &self.reference_epochs);
        let mut points = Vec::new();
        for band in Band::OUTPUT_ORDER {
            let band_points = self.stack_band(&kept, band, position, assigner)?;
            points.extend(postfilter(band_points, self.config.band_limit(band)));
        }

        Ok(StackedLightCurve::new(points))
    }

    fn stack_band(
        &self,
        lightcurve: &LightCurve,
        band: Band,
        position: SkyPosition,
        assigner: BinAssigner<'_>,
    ) -> StackResult<Vec<StackedPoint>> {
        let epochs = lightcurve.band_epochs(band);
        let bins = group_by_bin(epochs, band, &assigner)?;
        let aggregator =
            RobustAggregator::new(assigner, band, position, self.config.band_limit(band));

        let mut points = Vec::with_capacity(bins.len());
        for (key, samples) in &bins {
            match aggregator.aggregate(samples) {
                Ok(point) => points.push(point),
                Err(e) if e.is_insufficient_data() => {
                    debug!("{} bin {:?} skipped: {}", band, key, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(points)
    }
}

/// Group epochs by bin key, keeping input order inside each bin
pub fn group_by_bin(
    epochs: Vec<Epoch>,
    band: Band,
    assigner: &BinAssigner<'_>,
) -> StackResult<BTreeMap<BinKey, Vec<Epoch>>> {
    let mut bins: BTreeMap<BinKey, Vec<Epoch>> = BTreeMap::new();
    for epoch in epochs {
        let key = assigner.assign(epoch.mjd, band)?;
        bins.entry(key).or_default().push(epoch);
    }
    Ok(bins)
}

/// Convenience function to stack a light curve with a one-off pipeline
pub fn stack_lightcurve(
    lightcurve: &LightCurve,
    config: &StackConfig,
    reference_epochs: &ReferenceEpochs,
) -> StackResult<StackedLightCurve> {
    let pipeline = StackingPipeline::new(config.clone(), reference_epochs.clone())?;
    pipeline.stack(lightcurve)
}
