//! Simulated field sensors
//!
//! Every sensor measures one physical [`Quantity`]. The quantity fixes the
//! thresholds, the sentinel returned while the sensor is inactive, the band
//! labels and the sampling distribution used by [`SimulatedSource`].
//!
//! ## Banding
//!
//! ```text
//!  critical_low    optimal_min        optimal_max    critical_high
//! ──────┼───────────────┼──────────────────┼───────────────┼──────
//!  CriticalLow  BelowOptimal     Optimal      AboveOptimal  CriticalHigh
//! ```
//!
//! Both optimal bounds are inclusive, both critical bounds are exclusive
//! (a reading equal to `critical_low` is only below optimal).

pub mod humidity;
pub mod source;
pub mod temperature;

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{MonitorError, MonitorResult};

pub use humidity::Humidity;
pub use source::{FixedSource, ReadingSource, SamplingBand, ScriptedSource, SimulatedSource};
pub use temperature::Temperature;

/// Soil humidity sensor (percent)
pub type HumiditySensor = Sensor<Humidity>;

/// Ambient temperature sensor (degrees Celsius)
pub type TemperatureSensor = Sensor<Temperature>;

/// Classification of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    CriticalLow,
    BelowOptimal,
    Optimal,
    AboveOptimal,
    CriticalHigh,
}

impl Band {
    pub fn is_critical(self) -> bool {
        matches!(self, Band::CriticalLow | Band::CriticalHigh)
    }
}

/// Fixed classification thresholds of a quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub critical_low: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub critical_high: f64,
}

impl Thresholds {
    pub fn band(&self, value: f64) -> Band {
        if value < self.critical_low {
            Band::CriticalLow
        } else if value > self.critical_high {
            Band::CriticalHigh
        } else if value < self.optimal_min {
            Band::BelowOptimal
        } else if value > self.optimal_max {
            Band::AboveOptimal
        } else {
            Band::Optimal
        }
    }

    pub fn is_optimal(&self, value: f64) -> bool {
        value >= self.optimal_min && value <= self.optimal_max
    }
}

/// A physical quantity a sensor can measure
pub trait Quantity: fmt::Debug + Send + Sync + 'static {
    /// Human-readable name ("Humidity")
    const NAME: &'static str;

    /// Prefix used for sensor ids derived from a unit id ("HUM")
    const ID_PREFIX: &'static str;

    /// Unit suffix used when formatting values ("%")
    const UNIT: &'static str;

    /// Value returned by `read()` while the sensor is inactive
    const SENTINEL: f64;

    const THRESHOLDS: Thresholds;

    /// Distribution used by [`SimulatedSource`]
    const SAMPLING: &'static [SamplingBand];

    /// Fixed label describing a band
    fn band_label(band: Band) -> &'static str;
}

/// A sensor measuring quantity `Q`
///
/// The sensor only changes state on an active `read()`: inactive sensors
/// return [`Quantity::SENTINEL`] and keep their last reading untouched.
#[derive(Debug)]
pub struct Sensor<Q: Quantity> {
    id: String,
    name: String,
    active: bool,
    last_reading: f64,
    last_updated: Option<DateTime<Utc>>,
    source: Box<dyn ReadingSource>,
    quantity: PhantomData<Q>,
}

impl<Q: Quantity> Sensor<Q> {
    /// Create an active sensor backed by a freshly seeded [`SimulatedSource`]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_source(id, name, SimulatedSource::new())
    }

    /// Create an active sensor backed by the given source
    pub fn with_source(
        id: impl Into<String>,
        name: impl Into<String>,
        source: impl ReadingSource + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
            last_reading: Q::SENTINEL,
            last_updated: None,
            source: Box::new(source),
            quantity: PhantomData,
        }
    }

    /// Replace the reading source, keeping the last reading
    pub fn set_source(&mut self, source: impl ReadingSource + 'static) {
        self.source = Box::new(source);
    }

    /// Produce a new reading
    ///
    /// Returns the sentinel without touching any state when inactive.
    pub fn read(&mut self) -> MonitorResult<f64> {
        if !self.active {
            trace!("{}: inactive, skipping read", self.id);
            return Ok(Q::SENTINEL);
        }

        let value = self
            .source
            .next_reading(Q::SAMPLING)
            .map_err(|source| MonitorError::SensorFailure {
                sensor_id: self.id.clone(),
                source,
            })?;

        self.last_reading = value;
        self.last_updated = Some(Utc::now());
        trace!("{}: read {}", self.id, self.format_value(value));

        Ok(value)
    }

    pub fn is_normal(&self, value: f64) -> bool {
        Q::THRESHOLDS.is_optimal(value)
    }

    pub fn band(&self, value: f64) -> Band {
        Q::THRESHOLDS.band(value)
    }

    pub fn describe_state(&self, value: f64) -> &'static str {
        Q::band_label(self.band(value))
    }

    pub fn normal_range_description(&self) -> String {
        let Thresholds {
            optimal_min,
            optimal_max,
            ..
        } = Q::THRESHOLDS;
        format!(
            "Optimal range: {optimal_min:.1}{unit} - {optimal_max:.1}{unit}",
            unit = Q::UNIT
        )
    }

    /// Format a value with one decimal and the quantity's unit
    pub fn format_value(&self, value: f64) -> String {
        format!("{value:.1}{}", Q::UNIT)
    }

    /// One-line description of the sensor and its last reading
    pub fn status_line(&self) -> String {
        format!(
            "Sensor {} ({}): {} - Last reading: {:.2} - {}",
            self.name,
            self.id,
            if self.active { "Active" } else { "Inactive" },
            self.last_reading,
            self.normal_range_description()
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Last stored reading, the sentinel before the first active read
    pub fn last_reading(&self) -> f64 {
        self.last_reading
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

impl<Q: Quantity> fmt::Display for Sensor<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.id)
    }
}
