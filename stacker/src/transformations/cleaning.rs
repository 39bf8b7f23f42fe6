use log::debug;

use crate::core::domain::LightCurve;

/// Remove epochs whose timestamp or flux is not a finite number
///
/// Returns the cleaned light curve and the number of epochs removed.
pub fn remove_non_finite(lightcurve: &LightCurve) -> (LightCurve, usize) {
    let epochs: Vec<_> = lightcurve
        .epochs
        .iter()
        .filter(|e| e.mjd.is_finite() && e.flux.is_finite())
        .cloned()
        .collect();

    let removed = lightcurve.len() - epochs.len();
    if removed > 0 {
        debug!("Dropped {} epochs with non-finite timestamp or flux", removed);
    }
    (LightCurve::new(epochs), removed)
}
