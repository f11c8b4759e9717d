//! Error types for monitoring operations

use std::time::Duration;

use thiserror::Error;

/// Result type alias for monitoring operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors that can occur while building, polling or scheduling units
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Unit area is not a finite, strictly positive number
    #[error("invalid unit area: {0} (must be a positive number of square meters)")]
    InvalidArea(f64),

    /// Unit identifier is empty
    #[error("invalid unit identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A reading source could not produce a value
    #[error("sensor {sensor_id} failed to produce a reading: {source}")]
    SensorFailure {
        sensor_id: String,
        #[source]
        source: SourceError,
    },

    /// A previous poll of the unit panicked
    #[error("unit {0} is unavailable (a previous poll panicked)")]
    UnitUnavailable(String),

    /// Polling interval is zero
    #[error("invalid polling interval {0:?} (must be greater than zero)")]
    InvalidInterval(Duration),

    /// `start()` was called outside of a Tokio runtime
    #[error("the recurring poller needs a running Tokio runtime")]
    NoRuntime,

    /// The background poller exited while a request was in flight
    #[error("the background poller has stopped")]
    PollerStopped,
}

/// Errors raised by a [`ReadingSource`](crate::sensors::ReadingSource)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// A scripted source ran out of values
    #[error("no scripted readings left")]
    Exhausted,

    /// The sampler has no bands to draw from
    #[error("sampling distribution is empty")]
    EmptyDistribution,

    /// Any other device-level failure
    #[error("device error: {0}")]
    Device(String),
}
