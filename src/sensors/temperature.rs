//! Ambient temperature (degrees Celsius)

use super::{Band, Quantity, SamplingBand, Sensor, Thresholds};

/// Below this there is a frost risk
pub const TEMPERATURE_CRITICAL_LOW: f64 = 5.0;
/// Above this there is a heat-stress risk
pub const TEMPERATURE_CRITICAL_HIGH: f64 = 40.0;
pub const TEMPERATURE_OPTIMAL_MIN: f64 = 18.0;
pub const TEMPERATURE_OPTIMAL_MAX: f64 = 28.0;

/// Stress index at (and beyond) the critical thresholds
pub const MAX_STRESS_INDEX: f64 = 100.0;
/// Stress index reached just inside the critical thresholds
const MODERATE_STRESS_CEILING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature;

impl Quantity for Temperature {
    const NAME: &'static str = "Temperature";
    const ID_PREFIX: &'static str = "TEMP";
    const UNIT: &'static str = "°C";
    const SENTINEL: f64 = -999.0;

    const THRESHOLDS: Thresholds = Thresholds {
        critical_low: TEMPERATURE_CRITICAL_LOW,
        optimal_min: TEMPERATURE_OPTIMAL_MIN,
        optimal_max: TEMPERATURE_OPTIMAL_MAX,
        critical_high: TEMPERATURE_CRITICAL_HIGH,
    };

    // out of 12: 1 frost, 2 cool, 6 optimal, 2 warm, 1 heat wave
    const SAMPLING: &'static [SamplingBand] = &[
        SamplingBand::new(1, 2.0, 10.0),
        SamplingBand::new(2, 10.0, 18.0),
        SamplingBand::new(6, 18.0, 28.0),
        SamplingBand::new(2, 28.0, 40.0),
        SamplingBand::new(1, 40.0, 50.0),
    ];

    fn band_label(band: Band) -> &'static str {
        match band {
            Band::CriticalLow => "CRITICAL - Frost risk",
            Band::CriticalHigh => "CRITICAL - Heat wave",
            Band::BelowOptimal => "ATTENTION - Low temperature",
            Band::AboveOptimal => "ATTENTION - High temperature",
            Band::Optimal => "OPTIMAL - Adequate temperature",
        }
    }
}

impl Sensor<Temperature> {
    pub fn frost_risk(&self, temperature: f64) -> bool {
        temperature < TEMPERATURE_CRITICAL_LOW
    }

    pub fn heat_stress_risk(&self, temperature: f64) -> bool {
        temperature > TEMPERATURE_CRITICAL_HIGH
    }

    /// Thermal stress index in `[0, 100]`
    ///
    /// 0 inside the optimal band, saturated at 100 from the critical
    /// thresholds outwards, and a linear 0-50 ramp in the sub-optimal bands.
    pub fn stress_index(&self, temperature: f64) -> f64 {
        if (TEMPERATURE_OPTIMAL_MIN..=TEMPERATURE_OPTIMAL_MAX).contains(&temperature) {
            0.0
        } else if temperature <= TEMPERATURE_CRITICAL_LOW
            || temperature >= TEMPERATURE_CRITICAL_HIGH
        {
            MAX_STRESS_INDEX
        } else if temperature < TEMPERATURE_OPTIMAL_MIN {
            (TEMPERATURE_OPTIMAL_MIN - temperature)
                / (TEMPERATURE_OPTIMAL_MIN - TEMPERATURE_CRITICAL_LOW)
                * MODERATE_STRESS_CEILING
        } else {
            (temperature - TEMPERATURE_OPTIMAL_MAX)
                / (TEMPERATURE_CRITICAL_HIGH - TEMPERATURE_OPTIMAL_MAX)
                * MODERATE_STRESS_CEILING
        }
    }

    /// Short field advice for the band the temperature falls in
    pub fn advice(&self, temperature: f64) -> &'static str {
        match self.band(temperature) {
            Band::CriticalLow => "Cover crops and apply frost-protection irrigation",
            Band::CriticalHigh => "Increase irrigation, provide shade, avoid field work at peak hours",
            Band::BelowOptimal => "Consider additional protection and monitor growth",
            Band::AboveOptimal => "Increase irrigation and avoid field work during the hottest hours",
            Band::Optimal => "Ideal conditions for growth",
        }
    }
}
