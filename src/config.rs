//! TOML-based project files and the built-in baseline fixture.
//!
//! A project file bundles everything one calculation run needs: the
//! inventory, the policy versions with their rate tables, the guideline
//! tables, and optional project standard selections. Load from TOML with
//! [`ProjectFile::from_toml_file`] or use [`baseline_setup`] for the
//! built-in demonstration project.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::guideline::{
    ElectricalFactorEntry, EquipmentKind, Guideline, GuidelineCatalog, LoadClass,
    TransformerRating,
};
use crate::inventory::{
    Amenities, Building, EquipmentInputs, ProjectInventory, ProjectType, SubType, UnitGroup,
    UnitType,
};
use crate::policy::rates::{ConsumptionUse, RateEntry, RateKey, RateKind};
use crate::policy::store::InMemoryPolicyStore;
use crate::policy::version::{PolicyId, PolicyStatus, PolicyVersion};

/// Policy id of the active default version in the baseline fixture.
pub const BASELINE_ACTIVE_POLICY: PolicyId = PolicyId {
    number: 12,
    revision: 3,
};
/// Policy id of the draft (preview-only) version in the baseline fixture.
pub const BASELINE_DRAFT_POLICY: PolicyId = PolicyId {
    number: 13,
    revision: 1,
};
/// Guideline label carried by the baseline fixture.
pub const BASELINE_GUIDELINE: &str = "GOLD 2";

/// Everything one calculation run needs, converted to domain types.
#[derive(Debug, Clone)]
pub struct ProjectSetup {
    pub inventory: ProjectInventory,
    pub store: InMemoryPolicyStore,
    pub catalog: GuidelineCatalog,
}

/// Top-level project file parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    pub inventory: ProjectInventory,
    #[serde(default)]
    pub policies: Vec<PolicyFileEntry>,
    #[serde(default)]
    pub guidelines: Vec<GuidelineFileEntry>,
    #[serde(default)]
    pub selections: Vec<SelectionFileEntry>,
}

/// One policy version as written in a project file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFileEntry {
    pub number: u32,
    pub revision: u32,
    /// Effective date, written as a quoted `"YYYY-MM-DD"` string.
    pub effective: NaiveDate,
    #[serde(default = "draft_status")]
    pub status: PolicyStatus,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub rates: Vec<RateFileEntry>,
    #[serde(default)]
    pub aliases: Vec<AliasFileEntry>,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

fn draft_status() -> PolicyStatus {
    PolicyStatus::Draft
}

/// Flat rate row; `kind` decides which of the optional key fields apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateFileEntry {
    pub project_type: ProjectType,
    pub sub_type: SubType,
    pub kind: RateKindName,
    #[serde(default)]
    pub unit_type: Option<UnitType>,
    #[serde(default, rename = "use")]
    pub consumption_use: Option<ConsumptionUse>,
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKindName {
    Occupancy,
    Consumption,
    VisitorConsumption,
    VisitorDensity,
    DailyDemandFactor,
}

impl RateFileEntry {
    fn rate_kind(&self) -> Result<RateKind, String> {
        let unit_type = self
            .unit_type
            .ok_or_else(|| format!("rate kind `{:?}` requires `unit_type`", self.kind));
        let consumption_use = self
            .consumption_use
            .ok_or_else(|| format!("rate kind `{:?}` requires `use`", self.kind));
        match self.kind {
            RateKindName::Occupancy => Ok(RateKind::Occupancy(unit_type?)),
            RateKindName::Consumption => Ok(RateKind::Consumption(consumption_use?)),
            RateKindName::VisitorConsumption => Ok(RateKind::VisitorConsumption(consumption_use?)),
            RateKindName::VisitorDensity => Ok(RateKind::VisitorDensity),
            RateKindName::DailyDemandFactor => Ok(RateKind::DailyDemandFactor(unit_type?)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasFileEntry {
    pub from: SubType,
    pub to: SubType,
}

/// One guideline table as written in a project file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuidelineFileEntry {
    pub label: String,
    #[serde(default = "default_power_factor")]
    pub power_factor: f64,
    #[serde(default)]
    pub entries: Vec<FactorFileEntry>,
    #[serde(default)]
    pub transformer_ratings: Vec<TransformerRating>,
}

fn default_power_factor() -> f64 {
    0.9
}

/// Flat factor row; `class` decides which of the optional key fields apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorFileEntry {
    pub class: LoadClassName,
    #[serde(default)]
    pub unit_type: Option<UnitType>,
    #[serde(default)]
    pub equipment: Option<EquipmentKind>,
    pub description: String,
    #[serde(default)]
    pub watts_per_m2: Option<f64>,
    #[serde(default)]
    pub watts_per_unit: Option<f64>,
    pub max_demand_factor: f64,
    pub essential_demand_factor: f64,
    pub fire_demand_factor: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadClassName {
    UnitArea,
    Equipment,
}

impl FactorFileEntry {
    fn load_class(&self) -> Result<LoadClass, String> {
        match self.class {
            LoadClassName::UnitArea => self
                .unit_type
                .map(LoadClass::UnitArea)
                .ok_or_else(|| "factor class `unit_area` requires `unit_type`".to_string()),
            LoadClassName::Equipment => self
                .equipment
                .map(LoadClass::Equipment)
                .ok_or_else(|| "factor class `equipment` requires `equipment`".to_string()),
        }
    }
}

/// Project standard-selection record as written in a project file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionFileEntry {
    pub project: String,
    /// Policy id in display form, e.g. `"P12r3"`.
    pub policy: String,
}

impl ProjectFile {
    pub fn from_toml_file(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("failed to read project file `{}`: {err}", path.display()))?;
        Self::from_toml_str(&raw)
            .map_err(|err| format!("invalid project file `{}`: {err}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|err| err.to_string())
    }

    /// Converts the parsed file into domain types ready for the engines.
    pub fn into_setup(self) -> Result<ProjectSetup, String> {
        let mut store = InMemoryPolicyStore::new();
        let mut defaults = 0usize;
        for policy in &self.policies {
            let id = PolicyId::new(policy.number, policy.revision);
            let mut version = PolicyVersion::draft(id, policy.effective);
            version.status = policy.status;
            version.is_default = policy.default;
            version.approved_by = policy.approved_by.clone();
            if policy.default {
                defaults += 1;
            }
            for rate in &policy.rates {
                let kind = rate
                    .rate_kind()
                    .map_err(|err| format!("policy {id}: {err}"))?;
                version.rates.insert(
                    RateKey::new(rate.project_type, rate.sub_type, kind),
                    RateEntry {
                        value: rate.value,
                        unit: rate.unit.clone(),
                        note: rate.note.clone(),
                    },
                );
            }
            for alias in &policy.aliases {
                version.aliases.insert(alias.from, alias.to);
            }
            for (name, value) in &policy.parameters {
                version.parameters.insert(name.clone(), *value);
            }
            store.insert(version);
        }
        if defaults > 1 {
            return Err(format!(
                "{defaults} policy versions are marked default, expected at most one"
            ));
        }

        for selection in &self.selections {
            let id = PolicyId::parse(&selection.policy).ok_or_else(|| {
                format!(
                    "selection for `{}`: invalid policy id `{}`",
                    selection.project, selection.policy
                )
            })?;
            store
                .set_project_selection(selection.project.as_str(), id)
                .map_err(|err| format!("selection for `{}`: {err}", selection.project))?;
        }

        let mut catalog = GuidelineCatalog::new();
        for entry in &self.guidelines {
            if !(entry.power_factor > 0.0 && entry.power_factor <= 1.0) {
                return Err(format!(
                    "guideline `{}`: power factor {} is outside (0, 1]",
                    entry.label, entry.power_factor
                ));
            }
            let mut guideline = Guideline::new(entry.power_factor);
            for factor in &entry.entries {
                let load = factor
                    .load_class()
                    .map_err(|err| format!("guideline `{}`: {err}", entry.label))?;
                guideline.upsert_entry(
                    load,
                    ElectricalFactorEntry {
                        description: factor.description.clone(),
                        watts_per_m2: factor.watts_per_m2,
                        watts_per_unit: factor.watts_per_unit,
                        max_demand_factor: factor.max_demand_factor,
                        essential_demand_factor: factor.essential_demand_factor,
                        fire_demand_factor: factor.fire_demand_factor,
                        active: factor.active,
                    },
                );
            }
            for rating in &entry.transformer_ratings {
                guideline.push_rating(rating.clone());
            }
            catalog.insert(entry.label.as_str(), guideline);
        }

        Ok(ProjectSetup {
            inventory: self.inventory,
            store,
            catalog,
        })
    }
}

/// Built-in demonstration project: two identical luxury residential towers
/// plus the rate tables they price against. Used by the CLI default run and
/// shared across tests.
pub fn baseline_setup() -> ProjectSetup {
    ProjectSetup {
        inventory: baseline_inventory(),
        store: baseline_store(),
        catalog: baseline_catalog(),
    }
}

fn baseline_tower(name: &str) -> Building {
    Building {
        name: name.to_string(),
        units: vec![
            UnitGroup {
                unit_type: UnitType::Bhk2,
                area_m2: 88.26, /* 950 ft² */
                count: 38,
            },
            UnitGroup {
                unit_type: UnitType::Bhk3,
                area_m2: 125.42, /* 1350 ft² */
                count: 19,
            },
        ],
        amenities: Amenities {
            pool_area_m2: 120.0,
            landscape_area_m2: 400.0,
            cooling_tower_capacity_lps: 0.0,
        },
    }
}

fn baseline_inventory() -> ProjectInventory {
    ProjectInventory {
        project: "Meridian Heights".to_string(),
        project_type: ProjectType::Residential,
        sub_type: SubType::Luxury,
        buildings: vec![baseline_tower("Tower A"), baseline_tower("Tower B")],
        equipment: EquipmentInputs {
            lift_count: 4,
            domestic_pump_flow_lps: 12.0,
            fire_pump_flow_lps: 10.0,
        },
    }
}

fn baseline_rates(drinking_lpd: f64) -> BTreeMap<RateKey, RateEntry> {
    let key = |kind| RateKey::new(ProjectType::Residential, SubType::Luxury, kind);
    let mut rates = BTreeMap::new();

    for (unit_type, occupants) in [
        (UnitType::Studio, 2.0),
        (UnitType::Bhk1, 3.0),
        (UnitType::Bhk2, 4.0),
        (UnitType::Bhk3, 5.0),
        (UnitType::RetailUnit, 4.0),
    ] {
        rates.insert(
            key(RateKind::Occupancy(unit_type)),
            RateEntry::new(occupants, "occupants/unit"),
        );
    }

    for (use_, lpd) in [
        (ConsumptionUse::Drinking, drinking_lpd),
        (ConsumptionUse::FlushValve, 45.0),
        (ConsumptionUse::FlushTank, 35.0),
    ] {
        rates.insert(
            key(RateKind::Consumption(use_)),
            RateEntry::new(lpd, "l/occupant/day"),
        );
    }
    for (use_, lpd) in [
        (ConsumptionUse::Drinking, 15.0),
        (ConsumptionUse::FlushValve, 15.0),
        (ConsumptionUse::FlushTank, 10.0),
    ] {
        rates.insert(
            key(RateKind::VisitorConsumption(use_)),
            RateEntry::new(lpd, "l/visitor/day"),
        );
    }
    rates.insert(
        key(RateKind::VisitorDensity),
        RateEntry::new(3.0, "m2/visitor"),
    );

    for (unit_type, fraction) in [
        (UnitType::Studio, 0.9),
        (UnitType::Bhk1, 0.9),
        (UnitType::Bhk2, 0.9),
        (UnitType::Bhk3, 0.9),
        (UnitType::RetailUnit, 0.8),
    ] {
        rates.insert(
            key(RateKind::DailyDemandFactor(unit_type)),
            RateEntry::new(fraction, "fraction"),
        );
    }
    rates
}

fn baseline_parameters() -> BTreeMap<String, f64> {
    use crate::policy::snapshot::{
        PARAM_COOLING_TOWER_MAKEUP, PARAM_LANDSCAPE_IRRIGATION, PARAM_POOL_EVAPORATION,
        PARAM_STORAGE_BUFFER,
    };
    BTreeMap::from([
        (PARAM_POOL_EVAPORATION.to_string(), 8.0),
        (PARAM_LANDSCAPE_IRRIGATION.to_string(), 6.0),
        (PARAM_COOLING_TOWER_MAKEUP.to_string(), 0.02),
        (PARAM_STORAGE_BUFFER.to_string(), 0.2),
    ])
}

fn baseline_store() -> InMemoryPolicyStore {
    let mut store = InMemoryPolicyStore::new();

    let mut active = PolicyVersion::draft(
        BASELINE_ACTIVE_POLICY,
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
    );
    active.status = PolicyStatus::Active;
    active.is_default = true;
    active.approved_by = Some("S. Rao".to_string());
    active.rates = baseline_rates(90.0);
    active.aliases.insert(SubType::HighEnd, SubType::Luxury);
    active.parameters = baseline_parameters();
    store.insert(active);

    // Pending revision with a raised drinking rate; resolvable for preview
    // only via its explicit id.
    let mut draft = PolicyVersion::draft(
        BASELINE_DRAFT_POLICY,
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
    );
    draft.rates = baseline_rates(95.0);
    draft.aliases.insert(SubType::HighEnd, SubType::Luxury);
    draft.parameters = baseline_parameters();
    store.insert(draft);

    store
}

fn baseline_catalog() -> GuidelineCatalog {
    let mut guideline = Guideline::new(0.9);

    for (unit_type, watts_per_m2) in [
        (UnitType::Studio, 40.0),
        (UnitType::Bhk1, 42.0),
        (UnitType::Bhk2, 45.0),
        (UnitType::Bhk3, 48.0),
        (UnitType::Bhk4, 50.0),
        (UnitType::Penthouse, 55.0),
        (UnitType::Clubhouse, 60.0),
    ] {
        guideline.upsert_entry(
            LoadClass::UnitArea(unit_type),
            ElectricalFactorEntry::area_based(
                format!("{} lighting and small power", unit_type.label()),
                watts_per_m2,
                0.8,
                0.35,
                0.1,
            ),
        );
    }
    for (unit_type, watts_per_m2) in [(UnitType::RetailUnit, 75.0), (UnitType::OfficeUnit, 65.0)] {
        guideline.upsert_entry(
            LoadClass::UnitArea(unit_type),
            ElectricalFactorEntry::area_based(
                format!("{} lighting and small power", unit_type.label()),
                watts_per_m2,
                0.9,
                0.4,
                0.1,
            ),
        );
    }

    guideline.upsert_entry(
        LoadClass::Equipment(EquipmentKind::Lift),
        ElectricalFactorEntry::equipment_based("Passenger lift, per car", 15_000.0, 0.5, 1.0, 0.0),
    );
    guideline.upsert_entry(
        LoadClass::Equipment(EquipmentKind::DomesticPump),
        ElectricalFactorEntry::equipment_based(
            "Domestic transfer pump, per l/s rated flow",
            800.0,
            0.8,
            1.0,
            0.0,
        ),
    );
    guideline.upsert_entry(
        LoadClass::Equipment(EquipmentKind::FirePump),
        ElectricalFactorEntry::equipment_based(
            "Fire pump, per l/s rated flow",
            1_000.0,
            0.2,
            0.0,
            1.0,
        ),
    );

    for rating_kva in [
        160.0, 250.0, 315.0, 400.0, 500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0,
    ] {
        guideline.push_rating(TransformerRating {
            rating_kva,
            project_types: Vec::new(),
        });
    }

    let mut catalog = GuidelineCatalog::new();
    catalog.insert(BASELINE_GUIDELINE, guideline);
    catalog
}
