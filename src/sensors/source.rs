//! Reading sources feeding the sensors
//!
//! A sensor never produces values by itself: it asks its [`ReadingSource`]
//! for the next value. The default source is [`SimulatedSource`], a weighted
//! piecewise-uniform sampler over the bands declared by the measured
//! quantity. Fixed and scripted sources exist for demos and tests.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SourceError;

/// One band of a weighted piecewise-uniform distribution
///
/// Values are drawn uniformly from `[low, high)`. The band is picked with
/// probability `weight / sum(weights)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingBand {
    pub weight: u32,
    pub low: f64,
    pub high: f64,
}

impl SamplingBand {
    pub const fn new(weight: u32, low: f64, high: f64) -> Self {
        Self { weight, low, high }
    }
}

/// Something that can produce raw readings for a sensor
pub trait ReadingSource: Send + fmt::Debug {
    /// Produce the next raw value
    ///
    /// `bands` is the sampling distribution of the measured quantity. Sources
    /// that do not simulate anything are free to ignore it.
    fn next_reading(&mut self, bands: &[SamplingBand]) -> Result<f64, SourceError>;
}

/// Random sampler following the quantity's band distribution
pub struct SimulatedSource {
    rng: StdRng,
}

impl SimulatedSource {
    /// Create a sampler seeded from the thread-local generator
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Create a reproducible sampler
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimulatedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedSource").finish_non_exhaustive()
    }
}

impl ReadingSource for SimulatedSource {
    fn next_reading(&mut self, bands: &[SamplingBand]) -> Result<f64, SourceError> {
        let total: u32 = bands.iter().map(|band| band.weight).sum();
        if total == 0 {
            return Err(SourceError::EmptyDistribution);
        }

        let mut pick = self.rng.random_range(0..total);
        for band in bands {
            if pick < band.weight {
                let offset: f64 = self.rng.random();
                return Ok(band.low + offset * (band.high - band.low));
            }
            pick -= band.weight;
        }

        // unreachable while `pick < total`
        Err(SourceError::EmptyDistribution)
    }
}

/// Source that always reports the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSource(pub f64);

impl ReadingSource for FixedSource {
    fn next_reading(&mut self, _bands: &[SamplingBand]) -> Result<f64, SourceError> {
        Ok(self.0)
    }
}

/// Source replaying a fixed sequence of values, failing once it runs dry
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: VecDeque<f64>,
}

impl ScriptedSource {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Number of values not yet consumed
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl ReadingSource for ScriptedSource {
    fn next_reading(&mut self, _bands: &[SamplingBand]) -> Result<f64, SourceError> {
        self.values.pop_front().ok_or(SourceError::Exhausted)
    }
}
