//! End-to-end scenarios: poll, status, alerts, recommendations

use std::sync::Arc;

use agrosense::{MonitoringScheduler, RecommendationEngine, Severity, UnitStatus};

use crate::helpers::*;

#[test]
fn test_dry_soil_scenario() {
    let unit = create_fixed_unit("LOTE001", 20.0, 22.0);
    let mut guard = unit.lock().unwrap();
    guard.poll().unwrap();

    assert_eq!(guard.status(), UnitStatus::Critical);
    assert_eq!(guard.alerts().len(), 1);
    assert!(guard.alerts()[0].contains("20.0%"));
    assert_eq!(guard.humidity().recommended_irrigation(20.0), 15.0);

    let recs = RecommendationEngine::new().recommendations_for(&guard);
    let urgent = recs
        .iter()
        .find(|r| r.title() == "URGENT IRRIGATION")
        .expect("urgent irrigation recommendation");
    assert_eq!(urgent.priority(), 1);
    assert!(urgent.action().contains("15.0 L/m²"));
    assert!(urgent.action().contains("1500.0 liters"));
}

#[test]
fn test_heat_wave_scenario() {
    let unit = create_fixed_unit("LOTE002", 55.0, 55.0);
    let mut guard = unit.lock().unwrap();
    guard.poll().unwrap();

    assert_eq!(guard.status(), UnitStatus::Critical);
    assert_eq!(guard.alerts().len(), 1);
    assert!(guard.alerts()[0].starts_with("Heat-stress risk"));
    assert_eq!(guard.temperature().stress_index(55.0), 100.0);
}

#[test]
fn test_optimal_scenario() {
    let unit = create_fixed_unit("LOTE003", 50.0, 22.0);
    let mut guard = unit.lock().unwrap();
    guard.poll().unwrap();

    assert_eq!(guard.status(), UnitStatus::Optimal);
    assert!(guard.alerts().is_empty());

    let recs = RecommendationEngine::new().recommendations_for(&guard);
    assert!(recs.iter().all(|r| r.priority() != 1));
    assert!(recs.iter().any(|r| r.title() == "MAINTENANCE"));
}

#[test]
fn test_empty_scheduler_poll() {
    let scheduler = MonitoringScheduler::new();
    let report = scheduler.full_poll();

    assert!(report.is_empty());
    assert_eq!(scheduler.alert_count(), 0);
}

#[test]
fn test_register_same_unit_twice() {
    let scheduler = MonitoringScheduler::new();
    let unit = create_fixed_unit("LOTE001", 50.0, 22.0);

    scheduler.register(Arc::clone(&unit));
    scheduler.register(Arc::clone(&unit));

    assert_eq!(scheduler.unit_count(), 1);
}

#[test]
fn test_unregister_then_register_same_id() {
    let scheduler = MonitoringScheduler::new();
    scheduler.register(create_fixed_unit("LOTE001", 50.0, 22.0));

    assert!(scheduler.unregister("LOTE001"));
    assert!(scheduler.register(create_fixed_unit("LOTE001", 20.0, 22.0)));

    let matching = scheduler
        .units()
        .into_iter()
        .filter(|u| u.lock().unwrap().id() == "LOTE001")
        .count();
    assert_eq!(matching, 1);
}

#[test]
fn test_sweep_feeds_alert_log_and_action_plan() {
    let scheduler = MonitoringScheduler::new();
    scheduler.register(create_fixed_unit("LOTE001", 20.0, 1.0));
    scheduler.register(create_fixed_unit("LOTE002", 90.0, 22.0));
    scheduler.register(create_fixed_unit("LOTE003", 50.0, 22.0));

    let report = scheduler.full_poll();
    assert_eq!(report.polled, 3);
    assert_eq!(report.new_alerts, 3);

    let alerts = scheduler.alerts();
    assert_eq!(
        alerts.iter().map(|a| a.unit_id()).collect::<Vec<_>>(),
        ["LOTE001", "LOTE001", "LOTE002"]
    );
    assert!(alerts.iter().all(|a| a.severity() == Severity::Critical));
    assert_eq!(
        alerts[2].recommendation(),
        "Suspend irrigation and improve drainage"
    );

    let counts = scheduler.status_counts();
    assert_eq!(counts[&UnitStatus::Critical], 1);
    assert_eq!(counts[&UnitStatus::Attention], 1);
    assert_eq!(counts[&UnitStatus::Optimal], 1);

    let unit = scheduler.unit("LOTE001").unwrap();
    let plan = RecommendationEngine::new().action_plan(&unit.lock().unwrap());
    assert!(plan.starts_with("=== ACTION PLAN - Plot LOTE001 ==="));
    assert!(plan.contains("1. URGENT IRRIGATION"));
    assert!(plan.contains("FROST PROTECTION"));
}
