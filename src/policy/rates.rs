//! Typed rate keys and rate entries.
//!
//! Lookup keys are a closed tagged union rather than free-form strings, so a
//! missing combination is a matchable case instead of a runtime string miss.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inventory::{ProjectType, SubType, UnitType};

/// The water use a per-occupant consumption rate is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionUse {
    /// Drinking and other non-flush domestic use.
    Drinking,
    /// Flushing through a pressure flush valve.
    FlushValve,
    /// Flushing through a gravity cistern tank.
    FlushTank,
}

impl ConsumptionUse {
    pub fn label(self) -> &'static str {
        match self {
            Self::Drinking => "drinking",
            Self::FlushValve => "flush-valve",
            Self::FlushTank => "flush-tank",
        }
    }
}

/// Caller-selected flushing system.
///
/// Chooses which flush consumption rate applies to occupants and visitors.
/// Supplied by the caller per calculation, never inferred from the
/// inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushSystem {
    Valve,
    Tank,
}

impl FlushSystem {
    /// The consumption rate key component this selector maps to.
    pub fn consumption_use(self) -> ConsumptionUse {
        match self {
            Self::Valve => ConsumptionUse::FlushValve,
            Self::Tank => ConsumptionUse::FlushTank,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Valve => "flush valve",
            Self::Tank => "flush tank",
        }
    }
}

/// The usage/factor component of a rate key.
///
/// Two families share this shape: consumption rates (liters per person per
/// day) and occupancy/demand factors (persons per unit, m² per visitor, or a
/// 0–1 diversity fraction). The variant fixes which family a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    /// Occupants per dwelling/space unit of the given type.
    Occupancy(UnitType),
    /// Liters per occupant per day for the given use.
    Consumption(ConsumptionUse),
    /// Liters per visitor per day for the given use.
    VisitorConsumption(ConsumptionUse),
    /// m² of sellable area per visitor. Visitor count = area ÷ this factor;
    /// the factor is a divisor, never a multiplier.
    VisitorDensity,
    /// 0–1 diversity fraction applied to a unit type's daily water demand
    /// when rolling up max demand.
    DailyDemandFactor(UnitType),
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Occupancy(unit) => write!(f, "occupancy({})", unit.label()),
            Self::Consumption(use_) => write!(f, "consumption({})", use_.label()),
            Self::VisitorConsumption(use_) => write!(f, "visitor-consumption({})", use_.label()),
            Self::VisitorDensity => write!(f, "visitor-density"),
            Self::DailyDemandFactor(unit) => write!(f, "daily-demand-factor({})", unit.label()),
        }
    }
}

/// Composite lookup key for one rate: project type × sub-type × usage/factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateKey {
    pub project_type: ProjectType,
    pub sub_type: SubType,
    pub kind: RateKind,
}

impl RateKey {
    pub fn new(project_type: ProjectType, sub_type: SubType, kind: RateKind) -> Self {
        Self {
            project_type,
            sub_type,
            kind,
        }
    }

    /// The same key with the sub-type swapped for its canonical alias target.
    pub(crate) fn with_sub_type(self, sub_type: SubType) -> Self {
        Self { sub_type, ..self }
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.project_type.label(),
            self.sub_type.label(),
            self.kind
        )
    }
}

/// A stored rate: numeric value plus unit string and optional note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub value: f64,
    /// Unit string carried for traceability, e.g. `"l/occupant/day"`.
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RateEntry {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_key_display_is_actionable() {
        let key = RateKey::new(
            ProjectType::Residential,
            SubType::Luxury,
            RateKind::Occupancy(UnitType::Bhk2),
        );
        assert_eq!(key.to_string(), "residential/luxury/occupancy(2BHK)");
    }

    #[test]
    fn with_sub_type_preserves_kind() {
        let key = RateKey::new(
            ProjectType::Residential,
            SubType::HighEnd,
            RateKind::VisitorDensity,
        );
        let canon = key.with_sub_type(SubType::Luxury);
        assert_eq!(canon.sub_type, SubType::Luxury);
        assert_eq!(canon.kind, RateKind::VisitorDensity);
        assert_eq!(canon.project_type, key.project_type);
    }
}
