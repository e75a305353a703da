//! # Temporal Types
//!
//! JWT claims such as `nbf` and `exp` are NumericDate values: seconds since
//! the Unix epoch, possibly fractional (`1628099964.297`). [`Timestamp`]
//! holds them as UTC instants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC instant decoded from a NumericDate claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Convert a NumericDate (seconds since the epoch) to a timestamp.
    ///
    /// Fractional seconds are kept to millisecond precision.
    pub fn from_epoch_seconds(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::InvalidTimestamp {
                value: value.to_string(),
                reason: "not a finite number".to_string(),
            });
        }
        let millis = (value * 1000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return Err(ValidationError::InvalidTimestamp {
                value: value.to_string(),
                reason: "out of range".to_string(),
            });
        }
        DateTime::from_timestamp_millis(millis as i64)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                value: value.to_string(),
                reason: "out of range".to_string(),
            })
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Seconds since the epoch, as a NumericDate.
    pub fn to_epoch_seconds(&self) -> f64 {
        self.0.timestamp_millis() as f64 / 1000.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}
