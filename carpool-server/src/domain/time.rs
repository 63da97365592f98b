//! Departure time handling.
//!
//! Earliest departures arrive as RFC 3339 timestamps. The cost model works
//! in hours, so this module provides the conversion plus the "latest of"
//! fold used to find a car's binding departure.

use chrono::{DateTime, Utc};

/// A point in time at which someone can leave.
pub type Timestamp = DateTime<Utc>;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Returns the number of hours from `earlier` to `later`.
///
/// Negative if `later` is actually before `earlier`.
///
/// # Examples
///
/// ```
/// use carpool_server::domain::{Timestamp, hours_between};
///
/// let a: Timestamp = "2024-06-14T15:00:00Z".parse().unwrap();
/// let b: Timestamp = "2024-06-14T16:30:00Z".parse().unwrap();
/// assert_eq!(hours_between(a, b), 1.5);
/// assert_eq!(hours_between(b, a), -1.5);
/// ```
pub fn hours_between(earlier: Timestamp, later: Timestamp) -> f64 {
    later.signed_duration_since(earlier).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Returns the latest of the defined times, or `None` if none are defined.
pub fn latest<I>(times: I) -> Option<Timestamp>
where
    I: IntoIterator<Item = Option<Timestamp>>,
{
    times.into_iter().flatten().max()
}
