//! Helper functions for integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use agrosense::sensors::{FixedSource, ReadingSource, SamplingBand, ScriptedSource};
use agrosense::{MonitoredUnit, SharedUnit, SourceError};

pub fn create_fixed_unit(id: &str, humidity: f64, temperature: f64) -> SharedUnit {
    create_unit_with(id, FixedSource(humidity), FixedSource(temperature))
}

/// Unit whose humidity sensor fails on its first read
pub fn create_failing_unit(id: &str) -> SharedUnit {
    create_unit_with(id, ScriptedSource::default(), FixedSource(22.0))
}

/// Unit whose humidity sensor panics on read
pub fn create_panicking_unit(id: &str) -> SharedUnit {
    create_unit_with(id, PanickingSource, FixedSource(22.0))
}

pub fn create_unit_with(
    id: &str,
    humidity: impl ReadingSource + 'static,
    temperature: impl ReadingSource + 'static,
) -> SharedUnit {
    MonitoredUnit::with_sources(id, format!("Plot {id}"), 100.0, "Tomato", humidity, temperature)
        .unwrap()
        .shared()
}

#[derive(Debug)]
pub struct PanickingSource;

impl ReadingSource for PanickingSource {
    fn next_reading(&mut self, _bands: &[SamplingBand]) -> Result<f64, SourceError> {
        panic!("sensor bus fault");
    }
}

/// Source that reports a device-level fault on every read
#[derive(Debug)]
pub struct FaultySource(pub &'static str);

impl ReadingSource for FaultySource {
    fn next_reading(&mut self, _bands: &[SamplingBand]) -> Result<f64, SourceError> {
        Err(SourceError::Device(self.0.to_string()))
    }
}

/// Slow source that counts how often it was read
#[derive(Debug, Clone)]
pub struct CountingSource {
    pub reads: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl CountingSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            reads: Arc::new(AtomicUsize::new(0)),
            delay,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ReadingSource for CountingSource {
    fn next_reading(&mut self, _bands: &[SamplingBand]) -> Result<f64, SourceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(50.0)
    }
}

/// Poll `condition` until it holds or two seconds pass
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);

    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    condition()
}
