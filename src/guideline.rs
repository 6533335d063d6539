//! Guideline-keyed electrical factor tables and transformer ratings.
//!
//! Guidelines are independent, parallel rate sets named by an external
//! standard label. There is no default guideline; a project simply selects
//! one, and the selection travels into the report for traceability.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::inventory::{ProjectType, UnitType};

/// Equipment classes carrying a fixed per-unit electrical load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    /// Load per installed lift.
    Lift,
    /// Load per l/s of rated domestic pump flow.
    DomesticPump,
    /// Load per l/s of rated fire pump flow.
    FirePump,
}

impl EquipmentKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lift => "lift",
            Self::DomesticPump => "domestic pump",
            Self::FirePump => "fire pump",
        }
    }
}

/// What a factor entry applies to: a unit type's area, or an equipment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadClass {
    UnitArea(UnitType),
    Equipment(EquipmentKind),
}

impl fmt::Display for LoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitArea(unit) => write!(f, "unit-area({})", unit.label()),
            Self::Equipment(kind) => write!(f, "equipment({})", kind.label()),
        }
    }
}

/// How a line's unit load is derived from a factor entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitLoadBasis {
    /// Area-based: unit load = area × this figure.
    AreaWattsPerM2(f64),
    /// Equipment-based: unit load is this fixed figure per counted unit.
    EquipmentWatts(f64),
}

/// One guideline factor entry.
///
/// Exactly one of `watts_per_m2` / `watts_per_unit` must be populated;
/// both or neither is a configuration fault surfaced at lookup time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalFactorEntry {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watts_per_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watts_per_unit: Option<f64>,
    /// 0–1 fraction of connected load expected at peak.
    pub max_demand_factor: f64,
    /// 0–1 fraction carried by the essential (standby) supply.
    pub essential_demand_factor: f64,
    /// 0–1 fraction carried by the fire supply.
    pub fire_demand_factor: f64,
    pub active: bool,
}

impl ElectricalFactorEntry {
    /// Area-based entry with the given watt/m² figure and demand factors.
    pub fn area_based(description: impl Into<String>, watts_per_m2: f64, mdf: f64, edf: f64, fdf: f64) -> Self {
        Self {
            description: description.into(),
            watts_per_m2: Some(watts_per_m2),
            watts_per_unit: None,
            max_demand_factor: mdf,
            essential_demand_factor: edf,
            fire_demand_factor: fdf,
            active: true,
        }
    }

    /// Equipment-based entry with a fixed per-unit watt figure.
    pub fn equipment_based(description: impl Into<String>, watts_per_unit: f64, mdf: f64, edf: f64, fdf: f64) -> Self {
        Self {
            description: description.into(),
            watts_per_m2: None,
            watts_per_unit: Some(watts_per_unit),
            max_demand_factor: mdf,
            essential_demand_factor: edf,
            fire_demand_factor: fdf,
            active: true,
        }
    }
}

/// A factor entry after corruption screening: validated basis plus factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFactor {
    pub basis: UnitLoadBasis,
    pub max_demand_factor: f64,
    pub essential_demand_factor: f64,
    pub fire_demand_factor: f64,
}

/// One row of the ordered transformer rating table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerRating {
    pub rating_kva: f64,
    /// Project types this rating may be offered to; empty means all.
    #[serde(default)]
    pub project_types: Vec<ProjectType>,
}

impl TransformerRating {
    pub fn applies_to(&self, project_type: ProjectType) -> bool {
        self.project_types.is_empty() || self.project_types.contains(&project_type)
    }
}

/// One guideline's factor entries plus electrical reference data.
#[derive(Debug, Clone)]
pub struct Guideline {
    /// kW → kVA conversion factor.
    power_factor: f64,
    entries: BTreeMap<LoadClass, ElectricalFactorEntry>,
    transformer_ratings: Vec<TransformerRating>,
}

impl Guideline {
    /// Creates an empty guideline.
    ///
    /// # Panics
    ///
    /// Panics if `power_factor` is not within (0, 1].
    pub fn new(power_factor: f64) -> Self {
        assert!(power_factor > 0.0 && power_factor <= 1.0);
        Self {
            power_factor,
            entries: BTreeMap::new(),
            transformer_ratings: Vec::new(),
        }
    }

    /// Upserts one factor entry under its load class.
    pub fn upsert_entry(&mut self, load: LoadClass, entry: ElectricalFactorEntry) {
        self.entries.insert(load, entry);
    }

    pub fn push_rating(&mut self, rating: TransformerRating) {
        self.transformer_ratings.push(rating);
    }
}

/// Catalog of all known guidelines, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct GuidelineCatalog {
    guidelines: BTreeMap<String, Guideline>,
}

impl GuidelineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, guideline: Guideline) {
        self.guidelines.insert(label.into(), guideline);
    }

    /// Known guideline labels, in deterministic order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.guidelines.keys().map(String::as_str)
    }

    /// Takes an immutable snapshot of one guideline for a calculation.
    ///
    /// Inactive entries are dropped here, so the calculation sees only what
    /// lookup may legitimately return; the rating table is sorted ascending.
    ///
    /// # Errors
    ///
    /// `GuidelineNotFound` for an unknown label.
    pub fn snapshot(&self, label: &str) -> Result<GuidelineSnapshot> {
        let guideline = self
            .guidelines
            .get(label)
            .ok_or_else(|| EngineError::GuidelineNotFound {
                label: label.to_string(),
            })?;

        let entries = guideline
            .entries
            .iter()
            .filter(|(_, entry)| entry.active)
            .map(|(load, entry)| (*load, entry.clone()))
            .collect();

        let mut ratings = guideline.transformer_ratings.clone();
        ratings.sort_by(|a, b| a.rating_kva.total_cmp(&b.rating_kva));

        Ok(GuidelineSnapshot {
            label: label.to_string(),
            power_factor: guideline.power_factor,
            entries,
            transformer_ratings: ratings,
        })
    }
}

/// Immutable per-calculation view of one guideline.
#[derive(Debug, Clone)]
pub struct GuidelineSnapshot {
    label: String,
    power_factor: f64,
    entries: BTreeMap<LoadClass, ElectricalFactorEntry>,
    transformer_ratings: Vec<TransformerRating>,
}

impl GuidelineSnapshot {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn power_factor(&self) -> f64 {
        self.power_factor
    }

    /// Transformer ratings applicable to the project type, ascending.
    pub fn ratings_for(&self, project_type: ProjectType) -> impl Iterator<Item = &TransformerRating> {
        self.transformer_ratings
            .iter()
            .filter(move |r| r.applies_to(project_type))
    }

    /// Resolves and screens one factor entry.
    ///
    /// # Errors
    ///
    /// `FactorNotFound` when no active entry exists for the load class;
    /// `CorruptFactor` when the entry populates both or neither watt figure,
    /// carries a negative watt figure, or a demand factor outside 0–1.
    pub fn resolve(&self, load: LoadClass) -> Result<ResolvedFactor> {
        let entry = self
            .entries
            .get(&load)
            .ok_or_else(|| EngineError::FactorNotFound {
                guideline: self.label.clone(),
                load,
            })?;

        let basis = match (entry.watts_per_m2, entry.watts_per_unit) {
            (Some(w), None) => UnitLoadBasis::AreaWattsPerM2(w),
            (None, Some(w)) => UnitLoadBasis::EquipmentWatts(w),
            (Some(_), Some(_)) => {
                return Err(self.corrupt(load, "both watt/m² and watt/unit are populated"));
            }
            (None, None) => {
                return Err(self.corrupt(load, "neither watt/m² nor watt/unit is populated"));
            }
        };

        let watts = match basis {
            UnitLoadBasis::AreaWattsPerM2(w) | UnitLoadBasis::EquipmentWatts(w) => w,
        };
        if !watts.is_finite() || watts < 0.0 {
            return Err(self.corrupt(load, format!("watt figure {watts} is not a finite non-negative number")));
        }

        for (name, factor) in [
            ("max-demand", entry.max_demand_factor),
            ("essential-demand", entry.essential_demand_factor),
            ("fire-demand", entry.fire_demand_factor),
        ] {
            if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
                return Err(self.corrupt(load, format!("{name} factor {factor} is outside 0–1")));
            }
        }

        Ok(ResolvedFactor {
            basis,
            max_demand_factor: entry.max_demand_factor,
            essential_demand_factor: entry.essential_demand_factor,
            fire_demand_factor: entry.fire_demand_factor,
        })
    }

    fn corrupt(&self, load: LoadClass, reason: impl Into<String>) -> EngineError {
        EngineError::CorruptFactor {
            guideline: self.label.clone(),
            load,
            reason: reason.into(),
        }
    }
}
