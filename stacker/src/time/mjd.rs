use chrono::{DateTime, Utc};

/// Modified Julian Date of the Unix epoch (1970-01-01T00:00:00Z).
const UNIX_EPOCH_MJD: f64 = 40587.0;

const SECONDS_PER_DAY: f64 = 86400.0;

/// Period used to fold stacked timestamps, in days.
pub const PHASE_FOLD_DAYS: f64 = 365.0;

/// Convert a UTC datetime to a Modified Julian Date
///
/// # Example
/// ```
/// use atlas_stacker::time::datetime_to_mjd;
/// use chrono::{TimeZone, Utc};
///
/// let dt = Utc.with_ymd_and_hms(2018, 10, 9, 0, 0, 0).unwrap();
/// assert_eq!(datetime_to_mjd(&dt), 58400.0);
/// ```
pub fn datetime_to_mjd(dt: &DateTime<Utc>) -> f64 {
    let seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    seconds / SECONDS_PER_DAY + UNIX_EPOCH_MJD
}

/// Parse an RFC 3339 / ISO-8601 timestamp into a Modified Julian Date
///
/// Timestamps without an offset are read as UTC.
pub fn parse_iso_to_mjd(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(datetime_to_mjd(&dt.with_timezone(&Utc)));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| datetime_to_mjd(&naive.and_utc()))
}

/// Fold a timestamp onto a cycle of `period` days
///
/// The result is always in `[0, period)` for a positive period.
pub fn phase_fold(mjd: f64, period: f64) -> f64 {
    mjd.rem_euclid(period)
}
