//! Monitoring scheduler
//!
//! Owns the registered units and the global alert log. A sweep can run
//! synchronously on the caller's thread (`full_poll`) or on the recurring
//! poller actor started by `start()`. Both paths lock the same registry,
//! so sweeps never interleave and register/unregister never race a sweep.
//!
//! Lock order is registry first, then unit. Do not call into the scheduler
//! while holding a unit's lock.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::actors::messages::SweepReport;
use crate::actors::poller::PollerHandle;
use crate::error::{MonitorError, MonitorResult};
use crate::{Alert, MonitoredUnit, Severity, SharedUnit, UnitStatus};

/// Units and alert log shared between the scheduler and its poller
#[derive(Debug, Default)]
pub(crate) struct Registry {
    units: Vec<SharedUnit>,
    alerts: Vec<Alert>,
}

impl Registry {
    /// Poll every unit once and append its alerts to the log
    ///
    /// A unit that fails (error, panic, poisoned lock) is logged and
    /// skipped; the remaining units are still polled.
    pub(crate) fn sweep(&mut self) -> SweepReport {
        let mut report = SweepReport::default();

        if self.units.is_empty() {
            trace!("no units registered, skipping sweep");
            return report;
        }

        debug!(units = self.units.len(), "starting sweep");

        for unit in &self.units {
            match poll_unit(unit) {
                Ok(alerts) => {
                    report.polled += 1;
                    report.new_alerts += alerts.len();
                    self.alerts.extend(alerts);
                }
                Err((unit_id, e)) => {
                    report.failed += 1;
                    error!(unit = %unit_id, "failed to poll unit: {e}");
                }
            }
        }

        let counts = self.status_counts();
        let critical = counts.get(&UnitStatus::Critical).copied().unwrap_or_default();
        info!(
            polled = report.polled,
            failed = report.failed,
            new_alerts = report.new_alerts,
            optimal = counts.get(&UnitStatus::Optimal).copied().unwrap_or_default(),
            attention = counts.get(&UnitStatus::Attention).copied().unwrap_or_default(),
            critical,
            "sweep complete"
        );
        if critical > 0 {
            warn!(critical, "units in critical status");
        }

        report
    }

    fn status_counts(&self) -> BTreeMap<UnitStatus, usize> {
        let mut counts: BTreeMap<UnitStatus, usize> =
            UnitStatus::ALL.into_iter().map(|s| (s, 0)).collect();

        for unit in &self.units {
            *counts.entry(lock_unit(unit).status()).or_default() += 1;
        }

        counts
    }
}

/// Poll one unit, returning the global alerts its poll produced
fn poll_unit(unit: &SharedUnit) -> Result<Vec<Alert>, (String, MonitorError)> {
    let mut guard = match unit.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            let id = poisoned.get_ref().id().to_string();
            return Err((id.clone(), MonitorError::UnitUnavailable(id)));
        }
    };

    let id = guard.id().to_string();
    match panic::catch_unwind(AssertUnwindSafe(|| guard.poll())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err((id, e)),
        Err(_) => {
            let e = MonitorError::UnitUnavailable(id.clone());
            return Err((id, e));
        }
    }

    let now = Utc::now();
    Ok(guard
        .alerts()
        .iter()
        .map(|message| Alert::new(guard.id(), guard.name(), message, Severity::Critical, now))
        .collect())
}

/// Lock a unit for reading, tolerating a previous panic
fn lock_unit(unit: &SharedUnit) -> MutexGuard<'_, MonitoredUnit> {
    unit.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Point-in-time statistics of a scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub unit_count: usize,
    pub running: bool,
    /// Alerts logged since the last clear
    pub total_alerts: usize,
    pub active_sensors: usize,
    /// Two per unit
    pub sensor_slots: usize,
}

impl fmt::Display for SchedulerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SYSTEM STATISTICS ===")?;
        writeln!(f, "Monitored units: {}", self.unit_count)?;
        writeln!(
            f,
            "Monitoring active: {}",
            if self.running { "YES" } else { "NO" }
        )?;
        writeln!(f, "Total alerts: {}", self.total_alerts)?;
        writeln!(
            f,
            "Active sensors: {} of {}",
            self.active_sensors, self.sensor_slots
        )
    }
}

pub struct MonitoringScheduler {
    registry: Arc<Mutex<Registry>>,
    poller: Mutex<Option<PollerHandle>>,
    interval: Duration,
}

impl MonitoringScheduler {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        Self::with_interval(Self::DEFAULT_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            poller: Mutex::new(None),
            interval,
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poller(&self) -> MutexGuard<'_, Option<PollerHandle>> {
        self.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a unit unless this very handle is already registered
    ///
    /// Returns whether the unit was added. Two distinct handles with the
    /// same id are both accepted.
    pub fn register(&self, unit: SharedUnit) -> bool {
        let mut registry = self.registry();
        if registry.units.iter().any(|u| Arc::ptr_eq(u, &unit)) {
            debug!("unit already registered");
            return false;
        }

        debug!(unit = %lock_unit(&unit).id(), "registering unit");
        registry.units.push(unit);
        true
    }

    /// Remove the first unit with the given id
    pub fn unregister(&self, id: &str) -> bool {
        let mut registry = self.registry();
        match registry.units.iter().position(|u| lock_unit(u).id() == id) {
            Some(index) => {
                registry.units.remove(index);
                debug!(unit = %id, "unit unregistered");
                true
            }
            None => false,
        }
    }

    /// Sweep all units on the calling thread
    pub fn full_poll(&self) -> SweepReport {
        self.registry().sweep()
    }

    /// Manual "read now" sweep
    ///
    /// Goes through the poller while it runs so that the request is
    /// ordered with its timer; runs inline otherwise.
    pub async fn poll_now(&self) -> SweepReport {
        let handle = self.poller().clone();

        if let Some(handle) = handle {
            match handle.poll_now().await {
                Ok(report) => return report,
                Err(e) => debug!("{e}, polling inline"),
            }
        }

        self.full_poll()
    }

    /// Start the recurring poll; a no-op when already running
    ///
    /// The first sweep happens immediately. Requires a Tokio runtime and a
    /// non-zero interval.
    pub fn start(&self) -> MonitorResult<()> {
        let mut poller = self.poller();
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("monitoring already running");
            return Ok(());
        }

        *poller = Some(PollerHandle::spawn(Arc::clone(&self.registry), self.interval)?);
        info!(interval = ?self.interval, "monitoring started");
        Ok(())
    }

    /// Stop the recurring poll; a no-op when already stopped
    ///
    /// Waits for a sweep already in flight, so none runs once this returns.
    pub fn stop(&self) {
        let handle = self.poller().take();
        if let Some(handle) = handle {
            handle.shutdown();
            drop(self.registry());
            info!("monitoring stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.poller()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn unit_count(&self) -> usize {
        self.registry().units.len()
    }

    /// First registered unit with the given id
    pub fn unit(&self, id: &str) -> Option<SharedUnit> {
        self.registry()
            .units
            .iter()
            .find(|u| lock_unit(u).id() == id)
            .cloned()
    }

    pub fn units(&self) -> Vec<SharedUnit> {
        self.registry().units.clone()
    }

    pub fn units_by_status(&self, status: UnitStatus) -> Vec<SharedUnit> {
        self.registry()
            .units
            .iter()
            .filter(|u| lock_unit(u).status() == status)
            .cloned()
            .collect()
    }

    /// Number of units per status; every status is present
    pub fn status_counts(&self) -> BTreeMap<UnitStatus, usize> {
        self.registry().status_counts()
    }

    /// Copy of the global alert log, oldest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.registry().alerts.clone()
    }

    pub fn alert_count(&self) -> usize {
        self.registry().alerts.len()
    }

    pub fn clear_alerts(&self) {
        let mut registry = self.registry();
        info!(cleared = registry.alerts.len(), "clearing alert log");
        registry.alerts.clear();
    }

    /// Mark one logged alert as read; false if the index is out of range
    pub fn mark_alert_read(&self, index: usize) -> bool {
        match self.registry().alerts.get_mut(index) {
            Some(alert) => {
                alert.mark_as_read();
                true
            }
            None => false,
        }
    }

    pub fn stats_snapshot(&self) -> SchedulerStats {
        let running = self.is_running();
        let registry = self.registry();
        let active_sensors = registry
            .units
            .iter()
            .map(|u| lock_unit(u).active_sensor_count())
            .sum();

        SchedulerStats {
            unit_count: registry.units.len(),
            running,
            total_alerts: registry.alerts.len(),
            active_sensors,
            sensor_slots: registry.units.len() * 2,
        }
    }

    pub fn stats(&self) -> String {
        self.stats_snapshot().to_string()
    }
}

impl Default for MonitoringScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MonitoringScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
