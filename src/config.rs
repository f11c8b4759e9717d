use std::time::Duration;

use tracing::trace;

use crate::MonitoredUnit;
use crate::error::{MonitorError, MonitorResult};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Seconds between two recurring sweeps
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Seed for reproducible simulated readings
    pub seed: Option<u64>,

    /// Units to monitor (defaults to the demo collection)
    pub units: Option<Vec<UnitConfig>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            seed: None,
            units: None,
        }
    }
}

impl Config {
    /// Polling interval; zero is rejected
    pub fn interval(&self) -> MonitorResult<Duration> {
        let interval = Duration::from_secs(self.interval_secs);
        if interval.is_zero() {
            return Err(MonitorError::InvalidInterval(interval));
        }
        Ok(interval)
    }

    pub fn unit_configs(&self) -> Vec<UnitConfig> {
        self.units.clone().unwrap_or_else(demo_units)
    }

    /// Build every configured unit; the first invalid entry aborts
    ///
    /// With a seed, each unit gets its own derived seed so that units do
    /// not produce identical readings.
    pub fn build_units(&self) -> MonitorResult<Vec<MonitoredUnit>> {
        self.unit_configs()
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let seed = self.seed.map(|s| s.wrapping_add(2 * i as u64));
                unit.build(seed)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct UnitConfig {
    pub id: String,
    pub name: String,
    /// Square meters
    pub area: f64,
    pub crop: String,
    #[serde(default = "default_active")]
    pub humidity_active: bool,
    #[serde(default = "default_active")]
    pub temperature_active: bool,
}

impl UnitConfig {
    pub fn new(id: &str, name: &str, area: f64, crop: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            area,
            crop: crop.to_string(),
            humidity_active: true,
            temperature_active: true,
        }
    }

    pub fn build(&self, seed: Option<u64>) -> MonitorResult<MonitoredUnit> {
        let mut unit = match seed {
            Some(seed) => MonitoredUnit::seeded(&self.id, &self.name, self.area, &self.crop, seed),
            None => MonitoredUnit::new(&self.id, &self.name, self.area, &self.crop),
        }?;

        unit.humidity_mut().set_active(self.humidity_active);
        unit.temperature_mut().set_active(self.temperature_active);
        Ok(unit)
    }
}

/// The four plots monitored when nothing is configured
pub fn demo_units() -> Vec<UnitConfig> {
    vec![
        UnitConfig::new("LOTE001", "North plot - Tomatoes", 100.0, "Tomato"),
        UnitConfig::new("LOTE002", "South plot - Lettuce", 75.0, "Lettuce"),
        UnitConfig::new("LOTE003", "East plot - Potatoes", 150.0, "Potato"),
        UnitConfig::new("LOTE004", "West plot - Maize", 200.0, "Maize"),
    ]
}

fn default_interval() -> u64 {
    30
}

fn default_active() -> bool {
    true
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
