//! Soil humidity (percent, 0-100)

use super::{Band, Quantity, SamplingBand, Sensor, Thresholds};

/// Below this the soil needs urgent irrigation
pub const HUMIDITY_CRITICAL_LOW: f64 = 30.0;
/// Above this the unit risks waterlogging
pub const HUMIDITY_CRITICAL_HIGH: f64 = 80.0;
pub const HUMIDITY_OPTIMAL_MIN: f64 = 45.0;
pub const HUMIDITY_OPTIMAL_MAX: f64 = 65.0;

/// Irrigation volume (L/m²) suggested below the critical threshold
pub const URGENT_IRRIGATION_VOLUME: f64 = 15.0;
/// Irrigation volume (L/m²) suggested below the optimal band
pub const MODERATE_IRRIGATION_VOLUME: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Humidity;

impl Quantity for Humidity {
    const NAME: &'static str = "Humidity";
    const ID_PREFIX: &'static str = "HUM";
    const UNIT: &'static str = "%";
    const SENTINEL: f64 = -1.0;

    const THRESHOLDS: Thresholds = Thresholds {
        critical_low: HUMIDITY_CRITICAL_LOW,
        optimal_min: HUMIDITY_OPTIMAL_MIN,
        optimal_max: HUMIDITY_OPTIMAL_MAX,
        critical_high: HUMIDITY_CRITICAL_HIGH,
    };

    // 10% very dry, 20% dry, 40% optimal, 20% wet, 10% very wet
    const SAMPLING: &'static [SamplingBand] = &[
        SamplingBand::new(1, 5.0, 30.0),
        SamplingBand::new(2, 30.0, 45.0),
        SamplingBand::new(4, 45.0, 65.0),
        SamplingBand::new(2, 65.0, 80.0),
        SamplingBand::new(1, 80.0, 100.0),
    ];

    fn band_label(band: Band) -> &'static str {
        match band {
            Band::CriticalLow => "CRITICAL - Soil very dry",
            Band::CriticalHigh => "CRITICAL - Excess moisture",
            Band::BelowOptimal => "ATTENTION - Low humidity",
            Band::AboveOptimal => "ATTENTION - High humidity",
            Band::Optimal => "OPTIMAL - Adequate humidity",
        }
    }
}

impl Sensor<Humidity> {
    pub fn requires_urgent_irrigation(&self, humidity: f64) -> bool {
        humidity < HUMIDITY_CRITICAL_LOW
    }

    pub fn waterlogging_risk(&self, humidity: f64) -> bool {
        humidity > HUMIDITY_CRITICAL_HIGH
    }

    /// Suggested irrigation volume in liters per square meter
    pub fn recommended_irrigation(&self, humidity: f64) -> f64 {
        if humidity >= HUMIDITY_OPTIMAL_MIN {
            0.0
        } else if humidity < HUMIDITY_CRITICAL_LOW {
            URGENT_IRRIGATION_VOLUME
        } else {
            MODERATE_IRRIGATION_VOLUME
        }
    }
}
