//! Start/stop behaviour of the recurring poller

use std::sync::Arc;
use std::time::Duration;

use agrosense::config::Config;
use agrosense::sensors::FixedSource;
use agrosense::{MonitorError, MonitoringScheduler};
use assert_matches::assert_matches;

use crate::helpers::*;

const HOUR: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_start_sweeps_immediately() {
    let scheduler = MonitoringScheduler::with_interval(HOUR);
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    scheduler.start().unwrap();
    assert!(scheduler.is_running());

    assert!(wait_until(|| scheduler.alert_count() == 1).await);
    scheduler.stop();
}

#[tokio::test]
async fn test_recurring_sweeps() {
    let scheduler = MonitoringScheduler::with_interval(Duration::from_millis(10));
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    scheduler.start().unwrap();
    assert!(wait_until(|| scheduler.alert_count() >= 3).await);
    scheduler.stop();
}

#[tokio::test]
async fn test_stop_halts_future_sweeps() {
    let scheduler = MonitoringScheduler::with_interval(Duration::from_millis(10));
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    scheduler.start().unwrap();
    assert!(wait_until(|| scheduler.alert_count() >= 1).await);
    scheduler.stop();
    assert!(!scheduler.is_running());

    let after_stop = scheduler.alert_count();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(scheduler.alert_count(), after_stop);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_sweep_runs_after_stop_returns() {
    let source = CountingSource::new(Duration::from_millis(20));
    let scheduler = MonitoringScheduler::with_interval(Duration::from_millis(1));
    scheduler.register(create_unit_with("L1", source.clone(), FixedSource(22.0)));

    for _ in 0..20 {
        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        scheduler.stop();

        let after_stop = source.reads();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.reads(), after_stop);
    }
}

#[tokio::test]
async fn test_zero_interval_from_config_is_surfaced() {
    let config: Config = serde_json::from_str(r#"{ "interval_secs": 0 }"#).unwrap();
    assert_matches!(config.interval(), Err(MonitorError::InvalidInterval(_)));

    let scheduler = MonitoringScheduler::with_interval(Duration::from_secs(config.interval_secs));
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    assert_matches!(scheduler.start(), Err(MonitorError::InvalidInterval(_)));
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.alert_count(), 0);
}

#[tokio::test]
async fn test_start_and_stop_are_idempotent() {
    let scheduler = MonitoringScheduler::with_interval(HOUR);
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    scheduler.start().unwrap();
    scheduler.start().unwrap();
    assert!(scheduler.is_running());

    // a second start must not spawn a second poller
    assert!(wait_until(|| scheduler.alert_count() >= 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(scheduler.alert_count(), 1);

    scheduler.stop();
    scheduler.stop();
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn test_restart_after_stop() {
    let scheduler = MonitoringScheduler::with_interval(HOUR);
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    scheduler.start().unwrap();
    assert!(wait_until(|| scheduler.alert_count() == 1).await);
    scheduler.stop();

    scheduler.start().unwrap();
    assert!(wait_until(|| scheduler.alert_count() == 2).await);
    scheduler.stop();
}

#[tokio::test]
async fn test_poll_now_goes_through_running_poller() {
    let scheduler = MonitoringScheduler::with_interval(HOUR);
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    scheduler.start().unwrap();
    assert!(wait_until(|| scheduler.alert_count() == 1).await);

    let report = scheduler.poll_now().await;
    assert_eq!(report.polled, 1);
    assert_eq!(report.new_alerts, 1);
    assert_eq!(scheduler.alert_count(), 2);

    scheduler.stop();
}

#[tokio::test]
async fn test_poll_now_when_stopped_runs_inline() {
    let scheduler = MonitoringScheduler::new();
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));

    let report = scheduler.poll_now().await;

    assert_eq!(report.polled, 1);
    assert_eq!(scheduler.alert_count(), 1);
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn test_stats_report_running_flag() {
    let scheduler = MonitoringScheduler::with_interval(HOUR);
    scheduler.register(create_fixed_unit("L1", 50.0, 22.0));

    assert!(!scheduler.stats_snapshot().running);
    scheduler.start().unwrap();
    assert!(scheduler.stats().contains("Monitoring active: YES"));
    scheduler.stop();
    assert!(scheduler.stats().contains("Monitoring active: NO"));
}

#[tokio::test]
async fn test_dropping_scheduler_stops_poller() {
    let unit = create_fixed_unit("L1", 50.0, 22.0);

    {
        let scheduler = MonitoringScheduler::with_interval(Duration::from_millis(10));
        scheduler.register(Arc::clone(&unit));
        scheduler.start().unwrap();
        assert!(wait_until(|| unit.lock().unwrap().humidity().last_updated().is_some()).await);
    }

    // the poller held the last other reference to the registry
    assert!(wait_until(|| Arc::strong_count(&unit) == 1).await);
}
