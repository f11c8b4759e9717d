//! Failure tests for the monitoring sweep
//!
//! One bad unit must never stop the sweep:
//! - Reading sources that return errors
//! - Reading sources that panic
//! - Units whose lock was poisoned elsewhere

use std::sync::Arc;

use agrosense::sensors::{FixedSource, ScriptedSource};
use agrosense::{MonitorError, MonitoringScheduler, SourceError, UnitStatus};
use assert_matches::assert_matches;

use crate::helpers::*;

#[test]
fn test_failing_sensor_surfaces_error() {
    let unit = create_failing_unit("L1");
    let mut guard = unit.lock().unwrap();

    assert_matches!(
        guard.poll(),
        Err(MonitorError::SensorFailure { sensor_id, source: SourceError::Exhausted })
            if sensor_id == "HUM_L1"
    );
    assert_eq!(guard.status(), UnitStatus::New);
}

#[test]
fn test_device_fault_names_the_sensor() {
    let unit = create_unit_with("L1", FixedSource(50.0), FaultySource("bus timeout"));
    let mut guard = unit.lock().unwrap();

    let err = guard.poll().unwrap_err();
    assert_eq!(
        err.to_string(),
        "sensor TEMP_L1 failed to produce a reading: device error: bus timeout"
    );
    assert_matches!(
        err,
        MonitorError::SensorFailure { source: SourceError::Device(msg), .. } if msg == "bus timeout"
    );
}

#[test]
fn test_failing_unit_does_not_stop_sweep() {
    let scheduler = MonitoringScheduler::new();
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));
    scheduler.register(create_failing_unit("L2"));
    scheduler.register(create_fixed_unit("L3", 20.0, 22.0));

    let report = scheduler.full_poll();

    assert_eq!(report.polled, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(scheduler.alert_count(), 2);
    assert!(scheduler.alerts().iter().all(|a| a.unit_id() != "L2"));
    assert_eq!(
        scheduler.unit("L2").unwrap().lock().unwrap().status(),
        UnitStatus::New
    );
}

#[test]
fn test_panicking_unit_does_not_stop_sweep() {
    let scheduler = MonitoringScheduler::new();
    scheduler.register(create_panicking_unit("L1"));
    scheduler.register(create_fixed_unit("L2", 20.0, 22.0));

    let report = scheduler.full_poll();
    assert_eq!(report.failed, 1);
    assert_eq!(report.polled, 1);

    // the scheduler keeps working on later sweeps
    let report = scheduler.full_poll();
    assert_eq!(report.failed, 1);
    assert_eq!(scheduler.alert_count(), 2);
    assert!(!scheduler.stats().is_empty());
}

#[test]
fn test_poisoned_unit_is_skipped() {
    let scheduler = MonitoringScheduler::new();
    let poisoned = create_fixed_unit("L1", 20.0, 22.0);
    scheduler.register(Arc::clone(&poisoned));
    scheduler.register(create_fixed_unit("L2", 20.0, 22.0));

    let handle = Arc::clone(&poisoned);
    let _ = std::thread::spawn(move || {
        let _guard = handle.lock().unwrap();
        panic!("operator thread crashed");
    })
    .join();
    assert!(poisoned.is_poisoned());

    let report = scheduler.full_poll();
    assert_eq!(report.failed, 1);
    assert_eq!(report.polled, 1);

    // read-only aggregation still sees the unit
    let counts = scheduler.status_counts();
    assert_eq!(counts[&UnitStatus::New], 1);
    assert_eq!(counts[&UnitStatus::Critical], 1);
}

#[test]
fn test_failed_unit_recovers_next_sweep() {
    let scheduler = MonitoringScheduler::new();
    let unit = create_unit_with(
        "L1",
        ScriptedSource::new([20.0]),
        ScriptedSource::new([22.0, 22.0]),
    );
    scheduler.register(Arc::clone(&unit));

    assert_eq!(scheduler.full_poll().polled, 1);
    assert_eq!(scheduler.full_poll().failed, 1);

    unit.lock()
        .unwrap()
        .humidity_mut()
        .set_source(ScriptedSource::new([50.0]));
    assert_eq!(scheduler.full_poll().polled, 1);
    assert_eq!(unit.lock().unwrap().status(), UnitStatus::Optimal);
}

#[test]
fn test_inactive_failing_sensor_is_not_an_error() {
    let unit = create_failing_unit("L1");
    let mut guard = unit.lock().unwrap();
    guard.humidity_mut().set_active(false);

    assert!(guard.poll().is_ok());
    assert!(guard.alerts().is_empty());
}
