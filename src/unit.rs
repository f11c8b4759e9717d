//! Monitored cultivation unit
//!
//! A unit owns exactly one humidity and one temperature sensor. Every
//! `poll()` reads the active sensors, then recomputes the overall status,
//! then regenerates the alert list, always in that order.
//!
//! ## Status precedence (first match wins)
//!
//! ```text
//! humidity optimal AND temperature optimal             → OPTIMAL
//! humidity < 30 OR temperature < 5 OR temperature > 40 → CRITICAL
//! anything else                                        → ATTENTION
//! ```
//!
//! Waterlogging (humidity > 80) raises an alert but never makes the unit
//! CRITICAL on its own.

use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::UnitStatus;
use crate::error::{MonitorError, MonitorResult};
use crate::sensors::{
    HumiditySensor, Quantity, ReadingSource, SimulatedSource, Temperature, TemperatureSensor,
    humidity::Humidity,
};

/// Handle to a unit shared between the scheduler, its poller and callers
///
/// Registration identity is the handle itself (`Arc::ptr_eq`), not the id.
pub type SharedUnit = Arc<Mutex<MonitoredUnit>>;

#[derive(Debug)]
pub struct MonitoredUnit {
    id: String,
    name: String,
    /// Square meters
    area: f64,
    crop: String,
    planted_at: DateTime<Utc>,
    status: UnitStatus,
    humidity: HumiditySensor,
    temperature: TemperatureSensor,
    alerts: Vec<String>,
}

impl MonitoredUnit {
    /// Create a unit whose sensors sample the simulated distributions
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        area: f64,
        crop: impl Into<String>,
    ) -> MonitorResult<Self> {
        Self::with_sources(id, name, area, crop, SimulatedSource::new(), SimulatedSource::new())
    }

    /// Create a unit with reproducible simulated sensors
    pub fn seeded(
        id: impl Into<String>,
        name: impl Into<String>,
        area: f64,
        crop: impl Into<String>,
        seed: u64,
    ) -> MonitorResult<Self> {
        Self::with_sources(
            id,
            name,
            area,
            crop,
            SimulatedSource::seeded(seed),
            SimulatedSource::seeded(seed.wrapping_add(1)),
        )
    }

    /// Create a unit with explicit reading sources for both sensors
    pub fn with_sources(
        id: impl Into<String>,
        name: impl Into<String>,
        area: f64,
        crop: impl Into<String>,
        humidity_source: impl ReadingSource + 'static,
        temperature_source: impl ReadingSource + 'static,
    ) -> MonitorResult<Self> {
        let id = id.into();
        let name = name.into();

        if id.trim().is_empty() {
            return Err(MonitorError::InvalidIdentifier(id));
        }
        validate_area(area)?;

        let humidity = HumiditySensor::with_source(
            format!("{}_{id}", Humidity::ID_PREFIX),
            format!("{} {name}", Humidity::NAME),
            humidity_source,
        );
        let temperature = TemperatureSensor::with_source(
            format!("{}_{id}", Temperature::ID_PREFIX),
            format!("{} {name}", Temperature::NAME),
            temperature_source,
        );

        Ok(Self {
            id,
            name,
            area,
            crop: crop.into(),
            planted_at: Utc::now(),
            status: UnitStatus::New,
            humidity,
            temperature,
            alerts: Vec::new(),
        })
    }

    /// Wrap the unit into a handle suitable for registration
    pub fn shared(self) -> SharedUnit {
        Arc::new(Mutex::new(self))
    }

    /// Read the active sensors, then recompute status and alerts
    ///
    /// A failing sensor aborts the poll before status and alerts change.
    #[instrument(skip(self), fields(unit = %self.id))]
    pub fn poll(&mut self) -> MonitorResult<()> {
        if self.humidity.is_active() {
            self.humidity.read()?;
        }
        if self.temperature.is_active() {
            self.temperature.read()?;
        }

        self.status = self.evaluate_status();
        self.refresh_alerts();

        debug!(status = %self.status, alerts = self.alerts.len(), "unit polled");
        Ok(())
    }

    fn evaluate_status(&self) -> UnitStatus {
        let humidity = self.humidity_reading();
        let temperature = self.temperature_reading();

        let humidity_optimal = humidity.is_some_and(|h| self.humidity.is_normal(h));
        let temperature_optimal = temperature.is_some_and(|t| self.temperature.is_normal(t));

        if humidity_optimal && temperature_optimal {
            UnitStatus::Optimal
        } else if humidity.is_some_and(|h| self.humidity.requires_urgent_irrigation(h))
            || temperature.is_some_and(|t| self.temperature.band(t).is_critical())
        {
            UnitStatus::Critical
        } else {
            UnitStatus::Attention
        }
    }

    fn refresh_alerts(&mut self) {
        self.alerts.clear();

        if let Some(h) = self.humidity_reading() {
            if self.humidity.requires_urgent_irrigation(h) {
                self.alerts
                    .push(format!("Urgent irrigation required - soil very dry ({h:.1}%)"));
            } else if self.humidity.waterlogging_risk(h) {
                self.alerts
                    .push(format!("Waterlogging risk - excess moisture ({h:.1}%)"));
            }
        }

        if let Some(t) = self.temperature_reading() {
            if self.temperature.frost_risk(t) {
                self.alerts
                    .push(format!("Frost risk - temperature very low ({t:.1}°C)"));
            } else if self.temperature.heat_stress_risk(t) {
                self.alerts
                    .push(format!("Heat-stress risk - temperature very high ({t:.1}°C)"));
            }
        }
    }

    /// Multi-line human-readable description of the unit
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== UNIT: {} ===", self.name);
        let _ = writeln!(out, "ID: {}", self.id);
        let _ = writeln!(out, "Area: {:.2} m²", self.area);
        let _ = writeln!(out, "Crop: {}", self.crop);
        let _ = writeln!(out, "Status: {}", self.status);
        let _ = writeln!(out, "Planted: {}", self.planted_at.format("%Y-%m-%d %H:%M:%S UTC"));

        out.push('\n');
        match self.humidity_reading() {
            Some(h) => {
                let _ = writeln!(out, "HUMIDITY: {}", self.humidity.format_value(h));
                let _ = writeln!(out, "   State: {}", self.humidity.describe_state(h));
                let _ = writeln!(out, "   {}", self.humidity.normal_range_description());

                let irrigation = self.humidity.recommended_irrigation(h);
                if irrigation > 0.0 {
                    let _ = writeln!(out, "   Recommended irrigation: {irrigation:.1} L/m²");
                }
            }
            None => out.push_str("HUMIDITY: no reading\n"),
        }

        out.push('\n');
        match self.temperature_reading() {
            Some(t) => {
                let _ = writeln!(out, "TEMPERATURE: {}", self.temperature.format_value(t));
                let _ = writeln!(out, "   State: {}", self.temperature.describe_state(t));
                let _ = writeln!(out, "   {}", self.temperature.normal_range_description());

                let stress = self.temperature.stress_index(t);
                if stress > 0.0 {
                    let _ = writeln!(out, "   Stress index: {stress:.0}%");
                }
            }
            None => out.push_str("TEMPERATURE: no reading\n"),
        }

        if !self.alerts.is_empty() {
            out.push_str("\nALERTS:\n");
            for alert in &self.alerts {
                let _ = writeln!(out, "   {alert}");
            }
        }

        out
    }

    /// Short remarks derived from the current readings
    pub fn recommendations(&self) -> Vec<String> {
        let mut remarks = Vec::new();

        if let Some(h) = self.humidity_reading() {
            if self.humidity.requires_urgent_irrigation(h) {
                remarks.push(format!(
                    "Irrigate immediately with {:.1} L/m²",
                    self.humidity.recommended_irrigation(h)
                ));
            } else if self.humidity.waterlogging_risk(h) {
                remarks.push("Avoid additional irrigation and improve drainage".to_string());
            }
        }

        if let Some(t) = self.temperature_reading() {
            remarks.push(self.temperature.advice(t).to_string());
        }

        if remarks.is_empty() {
            remarks.push("Optimal conditions - continue routine monitoring".to_string());
        }

        remarks
    }

    /// Current humidity, if the sensor is active and has been read
    pub fn humidity_reading(&self) -> Option<f64> {
        (self.humidity.is_active() && self.humidity.last_updated().is_some())
            .then(|| self.humidity.last_reading())
    }

    /// Current temperature, if the sensor is active and has been read
    pub fn temperature_reading(&self) -> Option<f64> {
        (self.temperature.is_active() && self.temperature.last_updated().is_some())
            .then(|| self.temperature.last_reading())
    }

    pub fn active_sensor_count(&self) -> usize {
        usize::from(self.humidity.is_active()) + usize::from(self.temperature.is_active())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn crop(&self) -> &str {
        &self.crop
    }

    pub fn planted_at(&self) -> DateTime<Utc> {
        self.planted_at
    }

    pub fn status(&self) -> UnitStatus {
        self.status
    }

    /// Alerts produced by the last poll
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn humidity(&self) -> &HumiditySensor {
        &self.humidity
    }

    pub fn humidity_mut(&mut self) -> &mut HumiditySensor {
        &mut self.humidity
    }

    pub fn temperature(&self) -> &TemperatureSensor {
        &self.temperature
    }

    pub fn temperature_mut(&mut self) -> &mut TemperatureSensor {
        &mut self.temperature
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Change the area; an invalid value leaves the unit untouched
    pub fn set_area(&mut self, area: f64) -> MonitorResult<()> {
        validate_area(area)?;
        self.area = area;
        Ok(())
    }

    pub fn set_crop(&mut self, crop: impl Into<String>) {
        self.crop = crop.into();
    }
}

impl fmt::Display for MonitoredUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {} - Status: {}",
            self.name, self.id, self.crop, self.status
        )
    }
}

fn validate_area(area: f64) -> MonitorResult<()> {
    if area.is_finite() && area > 0.0 {
        Ok(())
    } else {
        Err(MonitorError::InvalidArea(area))
    }
}
