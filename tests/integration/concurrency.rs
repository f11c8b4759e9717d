//! Concurrency tests
//!
//! Timed sweeps, manual sweeps and registration changes may all happen at
//! once; the unit list and the alert log must stay consistent.

use std::sync::Arc;
use std::time::Duration;

use agrosense::MonitoringScheduler;

use crate::helpers::*;

#[test]
fn test_parallel_full_polls_lose_no_alerts() {
    let scheduler = MonitoringScheduler::new();
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));
    scheduler.register(create_fixed_unit("L2", 50.0, 22.0));
    scheduler.register(create_fixed_unit("L3", 50.0, 1.0));

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..10 {
                    scheduler.full_poll();
                }
            });
        }
    });

    // two alerting units, eighty sweeps
    assert_eq!(scheduler.alert_count(), 160);
}

#[test]
fn test_registration_during_sweeps() {
    let scheduler = MonitoringScheduler::new();

    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..50 {
                scheduler.full_poll();
            }
        });

        for t in 0..4 {
            let scheduler = &scheduler;
            s.spawn(move || {
                for i in 0..25 {
                    scheduler.register(create_fixed_unit(&format!("T{t}-{i}"), 50.0, 22.0));
                }
                for i in 0..10 {
                    assert!(scheduler.unregister(&format!("T{t}-{i}")));
                }
            });
        }
    });

    assert_eq!(scheduler.unit_count(), 60);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timer_and_manual_polls_interleave_safely() {
    let scheduler = Arc::new(MonitoringScheduler::with_interval(Duration::from_millis(5)));
    scheduler.register(create_fixed_unit("L1", 20.0, 22.0));
    scheduler.start().unwrap();

    let mut tasks = vec![];
    for _ in 0..10 {
        let s = Arc::clone(&scheduler);
        tasks.push(tokio::spawn(async move { s.poll_now().await }));
    }
    for _ in 0..4 {
        let s = Arc::clone(&scheduler);
        tasks.push(tokio::task::spawn_blocking(move || s.full_poll()));
    }

    let mut manual = 0;
    for task in tasks {
        let report = task.await.unwrap();
        assert_eq!(report.failed, 0);
        manual += report.new_alerts;
    }

    scheduler.stop();

    let alerts = scheduler.alerts();
    assert!(alerts.len() >= manual);
    assert!(alerts.iter().all(|a| a.unit_id() == "L1"));
    assert!(alerts.iter().all(|a| a.message().starts_with("Urgent irrigation")));
}
