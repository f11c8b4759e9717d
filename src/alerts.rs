//! Global alert log entries
//!
//! An [`Alert`] is created by the scheduler for every message found in a
//! unit's alert list during a sweep. Once created it only changes through
//! [`Alert::mark_as_read`].

use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Severity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    unit_id: String,
    unit_name: String,
    message: String,
    severity: Severity,
    timestamp: DateTime<Utc>,
    read: bool,
    recommendation: String,
}

impl Alert {
    /// Create an unread alert, deriving the recommendation from the message
    pub fn new(
        unit_id: impl Into<String>,
        unit_name: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let message = message.into();
        let recommendation = recommendation_for(&message).to_string();

        Self {
            unit_id: unit_id.into(),
            unit_name: unit_name.into(),
            message,
            severity,
            timestamp,
            read: false,
            recommendation,
        }
    }

    /// Replace the derived recommendation with an explicit one
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    pub fn mark_as_read(&mut self) {
        self.read = true;
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// 1 (critical) to 3 (informational)
    pub fn priority(&self) -> u8 {
        self.severity.priority()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Utc::now())
    }

    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.timestamp)
    }

    /// Elapsed time in the largest whole unit ("3 minute(s)")
    pub fn elapsed_description(&self) -> String {
        self.elapsed_description_at(Utc::now())
    }

    pub fn elapsed_description_at(&self, now: DateTime<Utc>) -> String {
        let elapsed = self.elapsed_at(now);

        if elapsed.num_days() > 0 {
            format!("{} day(s)", elapsed.num_days())
        } else if elapsed.num_hours() > 0 {
            format!("{} hour(s)", elapsed.num_hours())
        } else if elapsed.num_minutes() > 0 {
            format!("{} minute(s)", elapsed.num_minutes())
        } else {
            format!("{} second(s)", elapsed.num_seconds().max(0))
        }
    }

    /// "Critical - North plot (2 minute(s)) [Unread]"
    pub fn summary_line(&self) -> String {
        self.summary_line_at(Utc::now())
    }

    pub fn summary_line_at(&self, now: DateTime<Utc>) -> String {
        format!(
            "{} - {} ({}) [{}]",
            self.severity,
            self.unit_name,
            self.elapsed_description_at(now),
            if self.read { "Read" } else { "Unread" }
        )
    }

    pub fn detail_view(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ALERT", self.severity.label().to_uppercase());
        let _ = writeln!(out, "Unit: {} ({})", self.unit_name, self.unit_id);
        let _ = writeln!(out, "Date: {}", self.timestamp.to_rfc3339());
        let _ = writeln!(out, "Elapsed: {}", self.elapsed_description());
        let _ = writeln!(out, "Message: {}", self.message);
        let _ = writeln!(out, "Recommendation: {}", self.recommendation);
        let _ = writeln!(out, "State: {}", if self.read { "Read" } else { "Unread" });
        out
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

/// Derive a field action from the wording of an alert message
fn recommendation_for(message: &str) -> &'static str {
    let message = message.to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|needle| message.contains(needle));

    if mentions(&["urgent irrigation", "very dry"]) {
        "Irrigate immediately with 15 L/m² and check the irrigation system"
    } else if mentions(&["waterlogging", "excess moisture"]) {
        "Suspend irrigation and improve drainage"
    } else if mentions(&["frost", "temperature very low"]) {
        "Cover crops and apply frost-protection irrigation"
    } else if mentions(&["heat", "temperature very high"]) {
        "Increase irrigation frequency and provide shade"
    } else {
        "Monitor closely and take preventive measures"
    }
}
