use crate::core::domain::{LightCurve, StackedPoint};

/// Keep epochs whose flux uncertainty is below `error_limit`
///
/// Epochs with a NaN uncertainty never pass the comparison and are dropped.
pub fn prefilter(lightcurve: &LightCurve, error_limit: f64) -> LightCurve {
    let epochs = lightcurve
        .epochs
        .iter()
        .filter(|e| e.flux_err < error_limit)
        .cloned()
        .collect();
    LightCurve::new(epochs)
}

/// Keep stacked points whose reported uncertainty is below `error_limit`
pub fn postfilter(points: Vec<StackedPoint>, error_limit: f64) -> Vec<StackedPoint> {
    points
        .into_iter()
        .filter(|p| p.flux_err < error_limit)
        .collect()
}
