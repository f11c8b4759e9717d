pub mod actors;
pub mod alerts;
pub mod config;
pub mod error;
pub mod recommendations;
pub mod scheduler;
pub mod sensors;
pub mod unit;
pub mod util;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use alerts::Alert;
pub use error::{MonitorError, MonitorResult, SourceError};
pub use recommendations::{Recommendation, RecommendationEngine};
pub use scheduler::{MonitoringScheduler, SchedulerStats};
pub use unit::{MonitoredUnit, SharedUnit};

/// Overall condition of a monitored unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitStatus {
    /// Never polled
    New,
    Optimal,
    Attention,
    Critical,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 4] = [
        UnitStatus::New,
        UnitStatus::Optimal,
        UnitStatus::Attention,
        UnitStatus::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UnitStatus::New => "NEW",
            UnitStatus::Optimal => "OPTIMAL",
            UnitStatus::Attention => "ATTENTION",
            UnitStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity shared by global alerts and recommendations
///
/// Severity and numeric priority are a fixed bijection:
/// `Critical` = 1, `Attention` = 2, `Informational` = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Attention,
    Informational,
}

impl Severity {
    /// Numeric priority, 1 is the most urgent
    pub fn priority(self) -> u8 {
        match self {
            Severity::Critical => 1,
            Severity::Attention => 2,
            Severity::Informational => 3,
        }
    }

    pub fn from_priority(priority: u8) -> Option<Severity> {
        match priority {
            1 => Some(Severity::Critical),
            2 => Some(Severity::Attention),
            3 => Some(Severity::Informational),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Attention => "Attention",
            Severity::Informational => "Informational",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
