//! Demand report value objects returned by the two engines.
//!
//! Reports are immutable once returned and serialize verbatim for the
//! calling persistence layer. Every reported figure is already rounded up
//! to the next whole unit; raw intermediates never leave the engine.

use serde::Serialize;

use crate::guideline::EquipmentKind;
use crate::inventory::UnitType;
use crate::policy::rates::FlushSystem;
use crate::policy::version::{PolicyId, PolicyStatus};

/// The single rate-table identity a report was computed from.
///
/// Exactly one source per report; rates from two versions never mix within
/// one calculation. The policy variant carries the lifecycle status so the
/// persistence boundary can refuse draft-derived results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySource {
    Policy { id: PolicyId, status: PolicyStatus },
    Guideline { label: String },
}

impl PolicySource {
    /// Whether persisting a calculation from this source is permissible.
    pub fn persistable(&self) -> bool {
        !matches!(
            self,
            Self::Policy {
                status: PolicyStatus::Draft,
                ..
            }
        )
    }
}

/// One electrical unit-type line within a building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectricalLineItem {
    pub unit_type: UnitType,
    pub count: u32,
    /// Load of a single unit, W.
    pub unit_w: u64,
    /// Connected load of the whole line, W.
    pub connected_w: u64,
    /// Connected load after the line's max-demand factor, W.
    pub max_demand_w: u64,
}

/// One project-level equipment line (lifts, pumps).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentLineItem {
    pub kind: EquipmentKind,
    /// Lift count, or rated pump flow in l/s.
    pub quantity: f64,
    pub unit_w: u64,
    pub connected_w: u64,
    pub max_demand_w: u64,
}

/// Electrical subtotals for one building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingElectrical {
    pub name: String,
    pub lines: Vec<ElectricalLineItem>,
    pub connected_w: u64,
    pub max_demand_w: u64,
}

/// Project-level electrical totals, W.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectricalTotals {
    pub connected_w: u64,
    pub max_demand_w: u64,
    pub essential_w: u64,
    pub fire_w: u64,
}

/// The transformer the sizing table selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformerSelection {
    /// Selected rating, kVA.
    pub rating_kva: u64,
    /// The demand the selection was made against, kVA.
    pub demand_kva: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectricalDemandReport {
    pub project: String,
    pub source: PolicySource,
    pub buildings: Vec<BuildingElectrical>,
    pub equipment: Vec<EquipmentLineItem>,
    pub totals: ElectricalTotals,
    pub transformer: TransformerSelection,
}

/// Visitor component of a visitor-driven water line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitorFigures {
    pub count: u64,
    pub demand_lpd: u64,
}

/// One water unit-type line within a building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterLineItem {
    pub unit_type: UnitType,
    pub count: u32,
    /// Resident/staff occupancy of the line.
    pub occupancy: u64,
    /// Occupant-driven demand, liters/day.
    pub occupant_lpd: u64,
    /// Present only for visitor-driven unit types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitors: Option<VisitorFigures>,
    /// Daily demand after the line's demand factor, liters/day.
    pub max_demand_lpd: u64,
}

/// Mechanical (limited-human-touch) demand categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanicalUse {
    PoolEvaporation,
    LandscapeIrrigation,
    CoolingTowerMakeup,
}

impl MechanicalUse {
    pub fn label(self) -> &'static str {
        match self {
            Self::PoolEvaporation => "pool evaporation",
            Self::LandscapeIrrigation => "landscape irrigation",
            Self::CoolingTowerMakeup => "cooling-tower makeup",
        }
    }
}

/// One mechanical demand line. Participates in totals and storage sizing
/// but not in the per-occupant breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanicalLineItem {
    pub usage: MechanicalUse,
    pub demand_lpd: u64,
}

/// Water subtotals for one building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingWater {
    pub name: String,
    pub lines: Vec<WaterLineItem>,
    pub mechanical: Vec<MechanicalLineItem>,
    pub daily_demand_lpd: u64,
    pub max_demand_lpd: u64,
}

/// Project-level water totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterTotals {
    pub occupancy: u64,
    pub daily_demand_lpd: u64,
    pub max_demand_lpd: u64,
}

/// Storage tank recommendation derived from total daily demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageRecommendation {
    /// Required storage volume (one day's supply plus buffer), liters.
    pub volume_l: u64,
    /// Tank footprint at the caller-supplied depth, m².
    pub footprint_m2: u64,
    /// Advisory square-footprint side length, m. Not a constraint.
    pub side_m: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterDemandReport {
    pub project: String,
    pub source: PolicySource,
    pub flush_system: FlushSystem,
    pub buildings: Vec<BuildingWater>,
    pub totals: WaterTotals,
    pub storage: StorageRecommendation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_sourced_reports_are_not_persistable() {
        let draft = PolicySource::Policy {
            id: PolicyId::new(1, 1),
            status: PolicyStatus::Draft,
        };
        let active = PolicySource::Policy {
            id: PolicyId::new(1, 2),
            status: PolicyStatus::Active,
        };
        let guideline = PolicySource::Guideline {
            label: "GOLD 2".to_string(),
        };
        assert!(!draft.persistable());
        assert!(active.persistable());
        assert!(guideline.persistable());
    }
}
