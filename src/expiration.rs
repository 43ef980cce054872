//! Expiration Policy Module
//!
//! Describes how long a cache entry stays valid.

use std::time::Duration;

// == Cache Expiration ==
/// Time-to-live policy for a cache entry.
///
/// `Never` makes the entry immortal until it is explicitly removed or the
/// cache is cleared. All other variants normalize to a duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheExpiration {
    /// Entry never expires
    Never,
    /// TTL expressed in minutes
    Minutes(f64),
    /// TTL expressed in hours
    Hours(f64),
    /// TTL expressed in days
    Days(f64),
    /// TTL expressed as an exact duration
    Custom(Duration),
}

impl CacheExpiration {
    // == As Duration ==
    /// Converts the policy to a concrete duration.
    ///
    /// Returns `None` for [`CacheExpiration::Never`]. Negative inputs are
    /// accepted by the constructors (the producer owns validation) and clamp
    /// to a zero duration here, since `Duration` cannot be negative.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            CacheExpiration::Never => None,
            CacheExpiration::Minutes(minutes) => Some(Duration::from_secs_f64((minutes * 60.0).max(0.0))),
            CacheExpiration::Hours(hours) => Some(Duration::from_secs_f64((hours * 3600.0).max(0.0))),
            CacheExpiration::Days(days) => Some(Duration::from_secs_f64((days * 86400.0).max(0.0))),
            CacheExpiration::Custom(duration) => Some(*duration),
        }
    }

    // == Minutes ==
    /// Returns the TTL in minutes, the unit the envelope wire format uses.
    ///
    /// Unlike [`as_duration`](Self::as_duration) the raw value is preserved,
    /// so a negative TTL stays negative and marks the entry as already
    /// expired.
    pub fn minutes(&self) -> Option<f64> {
        match self {
            CacheExpiration::Never => None,
            CacheExpiration::Minutes(minutes) => Some(*minutes),
            CacheExpiration::Hours(hours) => Some(hours * 60.0),
            CacheExpiration::Days(days) => Some(days * 1440.0),
            CacheExpiration::Custom(duration) => Some(duration.as_secs_f64() / 60.0),
        }
    }
}
