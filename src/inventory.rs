//! Project inventory: the read-only building/unit tree supplied per calculation.
//!
//! The engine never mutates an inventory. Structural validation happens once
//! via [`ProjectInventory::validate`] before either pipeline runs; a rejected
//! inventory aborts the calculation with `InvalidInventory`.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Broad project classification; first component of every rate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Residential,
    Commercial,
    Retail,
    Hospitality,
}

impl ProjectType {
    /// Human-readable label used in reports and CSV rows.
    pub fn label(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Retail => "retail",
            Self::Hospitality => "hospitality",
        }
    }
}

/// Market segment of a project.
///
/// Two segments may share one rate table through a policy alias entry
/// (e.g. `HighEnd` pointing at `Luxury`); the alias is policy data, not a
/// hardcoded rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubType {
    Affordable,
    MidMarket,
    Luxury,
    HighEnd,
}

impl SubType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Affordable => "affordable",
            Self::MidMarket => "mid-market",
            Self::Luxury => "luxury",
            Self::HighEnd => "high-end",
        }
    }
}

/// Closed set of unit types an inventory may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    #[serde(rename = "studio")]
    Studio,
    #[serde(rename = "1bhk")]
    Bhk1,
    #[serde(rename = "2bhk")]
    Bhk2,
    #[serde(rename = "3bhk")]
    Bhk3,
    #[serde(rename = "4bhk")]
    Bhk4,
    #[serde(rename = "penthouse")]
    Penthouse,
    #[serde(rename = "retail_unit")]
    RetailUnit,
    #[serde(rename = "office_unit")]
    OfficeUnit,
    #[serde(rename = "clubhouse")]
    Clubhouse,
}

impl UnitType {
    /// Human-readable label used in reports and CSV rows.
    pub fn label(self) -> &'static str {
        match self {
            Self::Studio => "Studio",
            Self::Bhk1 => "1BHK",
            Self::Bhk2 => "2BHK",
            Self::Bhk3 => "3BHK",
            Self::Bhk4 => "4BHK",
            Self::Penthouse => "Penthouse",
            Self::RetailUnit => "Retail unit",
            Self::OfficeUnit => "Office unit",
            Self::Clubhouse => "Clubhouse",
        }
    }

    /// Whether water demand for this unit type includes a visitor component
    /// (computed from sellable area, alongside the occupant component).
    pub fn visitor_driven(self) -> bool {
        matches!(self, Self::RetailUnit)
    }
}

/// One unit type within a building: type, per-unit area, and unit count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitGroup {
    pub unit_type: UnitType,
    /// Carpet/sellable area of a single unit in m².
    pub area_m2: f64,
    pub count: u32,
}

/// Building-level amenity figures. Zero means the amenity is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Amenities {
    /// Open swimming-pool surface area in m².
    pub pool_area_m2: f64,
    /// Irrigated landscape area in m².
    pub landscape_area_m2: f64,
    /// Cooling-tower circulation capacity in l/s.
    pub cooling_tower_capacity_lps: f64,
}

impl Amenities {
    /// Returns `true` when every amenity figure is zero.
    pub fn is_empty(&self) -> bool {
        self.pool_area_m2 == 0.0
            && self.landscape_area_m2 == 0.0
            && self.cooling_tower_capacity_lps == 0.0
    }
}

/// One building in the project hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Building {
    pub name: String,
    pub units: Vec<UnitGroup>,
    #[serde(default)]
    pub amenities: Amenities,
}

/// Project-level equipment inputs feeding the electrical pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquipmentInputs {
    pub lift_count: u32,
    /// Rated domestic water pump flow in l/s.
    pub domestic_pump_flow_lps: f64,
    /// Rated fire pump flow in l/s.
    pub fire_pump_flow_lps: f64,
}

/// The full read-only inventory for one calculation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectInventory {
    /// Project identifier as known to the calling layer.
    pub project: String,
    pub project_type: ProjectType,
    pub sub_type: SubType,
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub equipment: EquipmentInputs,
}

fn invalid(reason: impl Into<String>) -> EngineError {
    EngineError::InvalidInventory {
        reason: reason.into(),
    }
}

fn check_figure(value: f64, what: impl std::fmt::Display) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{what} must be a finite non-negative number, got {value}")));
    }
    Ok(())
}

impl ProjectInventory {
    /// Validates the inventory structure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInventory` on an empty project name or building list,
    /// a building with neither units nor amenities, a zero unit count, or
    /// any non-finite/negative area, amenity, or pump figure.
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(invalid("project name is empty"));
        }
        if self.buildings.is_empty() {
            return Err(invalid("project has no buildings"));
        }

        for building in &self.buildings {
            if building.name.trim().is_empty() {
                return Err(invalid("building name is empty"));
            }
            if building.units.is_empty() && building.amenities.is_empty() {
                return Err(invalid(format!(
                    "building `{}` has no units and no amenities",
                    building.name
                )));
            }
            for group in &building.units {
                check_figure(
                    group.area_m2,
                    format!("area of {} in `{}`", group.unit_type.label(), building.name),
                )?;
                if group.area_m2 == 0.0 {
                    return Err(invalid(format!(
                        "area of {} in `{}` is zero",
                        group.unit_type.label(),
                        building.name
                    )));
                }
                if group.count == 0 {
                    return Err(invalid(format!(
                        "count of {} in `{}` is zero",
                        group.unit_type.label(),
                        building.name
                    )));
                }
            }
            let amenities = &building.amenities;
            check_figure(
                amenities.pool_area_m2,
                format!("pool area of `{}`", building.name),
            )?;
            check_figure(
                amenities.landscape_area_m2,
                format!("landscape area of `{}`", building.name),
            )?;
            check_figure(
                amenities.cooling_tower_capacity_lps,
                format!("cooling-tower capacity of `{}`", building.name),
            )?;
        }

        check_figure(self.equipment.domestic_pump_flow_lps, "domestic pump flow")?;
        check_figure(self.equipment.fire_pump_flow_lps, "fire pump flow")?;
        Ok(())
    }

    /// Total number of dwelling/space units across all buildings.
    pub fn total_units(&self) -> u64 {
        self.buildings
            .iter()
            .flat_map(|b| b.units.iter())
            .map(|g| u64::from(g.count))
            .sum()
    }
}
