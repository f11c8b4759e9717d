//! Rule-based recommendations for a monitored unit
//!
//! The engine is a pure function of a unit's current readings and status;
//! it never polls. Four independent rule groups are concatenated and then
//! stably sorted by priority:
//!
//! 1. humidity (at most one)
//! 2. temperature band (at most one) plus the thermal stress rule
//! 3. overall status (none while the unit is still NEW)
//! 4. crop care (always exactly one)

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::sensors::humidity::{HUMIDITY_OPTIMAL_MAX, HUMIDITY_OPTIMAL_MIN};
use crate::sensors::temperature::{TEMPERATURE_OPTIMAL_MAX, TEMPERATURE_OPTIMAL_MIN};
use crate::{MonitoredUnit, Severity, UnitStatus};

/// Stress index above which an extra thermal-stress entry is emitted
pub const STRESS_INDEX_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    title: String,
    description: String,
    kind: Severity,
    action: String,
    category: String,
}

impl Recommendation {
    /// Priority is always derived from `kind`
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        kind: Severity,
        action: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind,
            action: action.into(),
            category: category.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> Severity {
        self.kind
    }

    /// 1 (act now) to 3 (informational)
    pub fn priority(&self) -> u8 {
        self.kind.priority()
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_critical(&self) -> bool {
        self.kind == Severity::Critical
    }

    pub fn requires_immediate_attention(&self) -> bool {
        self.priority() == 1
    }

    pub fn urgency_label(&self) -> &'static str {
        match self.priority() {
            1 => "HIGH - Immediate action required",
            2 => "MEDIUM - Act within the next hours",
            _ => "LOW - Act when convenient",
        }
    }

    /// "Emergency irrigation Critical - URGENT IRRIGATION"
    pub fn summary_line(&self) -> String {
        format!("{} {} - {}", self.category, self.kind, self.title)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "Type: {}", self.kind)?;
        writeln!(f, "Priority: {}", self.urgency_label())?;
        writeln!(f, "Category: {}", self.category)?;
        writeln!(f, "Description: {}", self.description)?;
        write!(f, "Action: {}", self.action)
    }
}

/// Stateless generator of recommendations and action plans
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Recommendations for the unit's current state, most urgent first
    #[instrument(skip(self, unit), fields(unit = %unit.id()))]
    pub fn recommendations_for(&self, unit: &MonitoredUnit) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        recommendations.extend(humidity_rules(unit));
        recommendations.extend(temperature_rules(unit));
        recommendations.extend(status_rule(unit.status()));
        recommendations.push(crop_rule(unit.crop()));

        // stable: equal priorities keep generation order
        recommendations.sort_by_key(Recommendation::priority);

        debug!(count = recommendations.len(), "recommendations generated");
        recommendations
    }

    pub fn action_plan(&self, unit: &MonitoredUnit) -> String {
        self.action_plan_at(unit, Utc::now())
    }

    /// Render the action plan with an explicit generation timestamp
    pub fn action_plan_at(&self, unit: &MonitoredUnit, generated_at: DateTime<Utc>) -> String {
        let recommendations = self.recommendations_for(unit);

        let mut plan = String::new();
        let _ = writeln!(plan, "=== ACTION PLAN - {} ===", unit.name());
        let _ = writeln!(plan, "Unit: {} ({})", unit.name(), unit.id());
        let _ = writeln!(plan, "Crop: {}", unit.crop());
        let _ = writeln!(plan, "Status: {}", unit.status());
        let _ = writeln!(
            plan,
            "Generated: {}",
            generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        plan.push('\n');

        if recommendations.is_empty() {
            plan.push_str("No specific action required at this time.\n");
            plan.push_str("Continue routine monitoring.\n");
            return plan;
        }

        plan.push_str("RECOMMENDED ACTIONS:\n\n");
        for (i, rec) in recommendations.iter().enumerate() {
            let _ = writeln!(plan, "{}. {}", i + 1, rec.title());
            let _ = writeln!(plan, "   Priority: {}", rec.kind());
            let _ = writeln!(plan, "   Description: {}", rec.description());
            let _ = writeln!(plan, "   Action: {}", rec.action());
            plan.push('\n');
        }

        plan
    }
}

fn humidity_rules(unit: &MonitoredUnit) -> Option<Recommendation> {
    let h = unit.humidity_reading()?;
    let sensor = unit.humidity();

    if sensor.requires_urgent_irrigation(h) {
        let volume = sensor.recommended_irrigation(h);
        Some(Recommendation::new(
            "URGENT IRRIGATION",
            "Soil is very dry and needs immediate irrigation",
            Severity::Critical,
            format!(
                "Irrigate with {volume:.1} L/m² immediately. Total: {:.1} liters for the whole unit.",
                volume * unit.area()
            ),
            "Emergency irrigation",
        ))
    } else if sensor.waterlogging_risk(h) {
        Some(Recommendation::new(
            "EXCESS MOISTURE",
            "The unit is at risk of waterlogging",
            Severity::Critical,
            "Suspend all irrigation, improve drainage and consider covering the unit if it rains",
            "Moisture control",
        ))
    } else if h < HUMIDITY_OPTIMAL_MIN {
        Some(Recommendation::new(
            "IRRIGATION RECOMMENDED",
            "Soil humidity is below the optimal range",
            Severity::Attention,
            format!(
                "Irrigate with {:.0} L/m². The unit would benefit from moderate irrigation.",
                sensor.recommended_irrigation(h)
            ),
            "Preventive irrigation",
        ))
    } else if h > HUMIDITY_OPTIMAL_MAX {
        Some(Recommendation::new(
            "HUMIDITY MONITORING",
            "Humidity is at the upper limit",
            Severity::Informational,
            "Monitor closely. Avoid additional irrigation until humidity returns to the optimal range.",
            "Monitoring",
        ))
    } else {
        None
    }
}

fn temperature_rules(unit: &MonitoredUnit) -> Vec<Recommendation> {
    let Some(t) = unit.temperature_reading() else {
        return Vec::new();
    };
    let sensor = unit.temperature();
    let mut out = Vec::with_capacity(2);

    if sensor.frost_risk(t) {
        out.push(Recommendation::new(
            "FROST PROTECTION",
            "Critical frost risk",
            Severity::Critical,
            "Cover crops immediately with netting or plastic. Apply protective irrigation if possible.",
            "Frost protection",
        ));
    } else if sensor.heat_stress_risk(t) {
        out.push(Recommendation::new(
            "HEAT PROTECTION",
            "Risk of heat stress",
            Severity::Critical,
            "Increase irrigation frequency, provide shade and avoid field work at peak heat hours.",
            "Heat protection",
        ));
    } else if t < TEMPERATURE_OPTIMAL_MIN {
        out.push(Recommendation::new(
            "LOW TEMPERATURE",
            "Temperatures are below the optimal range",
            Severity::Attention,
            "Monitor growth. Consider additional protection if temperatures keep dropping.",
            "Temperature monitoring",
        ));
    } else if t > TEMPERATURE_OPTIMAL_MAX {
        out.push(Recommendation::new(
            "HIGH TEMPERATURE",
            "Temperatures are above the optimal range",
            Severity::Attention,
            "Increase irrigation and avoid field work during the hottest hours (11:00-15:00).",
            "High temperature management",
        ));
    }

    let stress = sensor.stress_index(t);
    if stress > STRESS_INDEX_THRESHOLD {
        out.push(Recommendation::new(
            "THERMAL STRESS",
            "High thermal stress index detected",
            Severity::Attention,
            format!("Stress index: {stress:.0}%. Adjust crop management to the thermal conditions."),
            "Stress analysis",
        ));
    }

    out
}

fn status_rule(status: UnitStatus) -> Option<Recommendation> {
    match status {
        UnitStatus::New => None,
        UnitStatus::Optimal => Some(Recommendation::new(
            "MAINTENANCE",
            "Optimal conditions detected",
            Severity::Informational,
            "Continue routine monitoring. Current conditions are ideal for growth.",
            "Maintenance",
        )),
        UnitStatus::Attention => Some(Recommendation::new(
            "INTENSIVE MONITORING",
            "Preventive action is required",
            Severity::Attention,
            "Increase monitoring frequency and be ready to intervene if conditions worsen.",
            "Intensive monitoring",
        )),
        UnitStatus::Critical => Some(Recommendation::new(
            "IMMEDIATE INTERVENTION",
            "Critical status requires urgent action",
            Severity::Critical,
            "Act now according to the specific alerts. The unit needs urgent attention.",
            "Immediate action",
        )),
    }
}

fn crop_rule(crop: &str) -> Recommendation {
    let (title, description, action, category) = match crop.trim().to_lowercase().as_str() {
        "tomato" | "tomatoes" | "tomate" | "tomates" => (
            "CROP CARE - TOMATO",
            "Guidance for tomato crops",
            "Tomatoes are sensitive to sudden humidity changes. Keep irrigation consistent and avoid wetting the leaves.",
            "Tomato crop",
        ),
        "lettuce" | "lettuces" | "lechuga" | "lechugas" => (
            "CROP CARE - LETTUCE",
            "Guidance for lettuce crops",
            "Lettuce needs constant humidity. In hot weather consider drip irrigation and partial shade.",
            "Lettuce crop",
        ),
        "potato" | "potatoes" | "papa" | "papas" => (
            "CROP CARE - POTATO",
            "Guidance for potato crops",
            "Potatoes need good drainage. Avoid waterlogging, which can cause disease.",
            "Potato crop",
        ),
        _ => (
            "GENERAL CROP CARE",
            "General guidance for the crop",
            "Keep routine monitoring and adjust practices to the specific conditions of the crop.",
            "General care",
        ),
    };

    Recommendation::new(title, description, Severity::Informational, action, category)
}
