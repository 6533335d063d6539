//! Per-unit-type load, occupancy, and consumption lines.
//!
//! Everything here is hierarchy-independent: one building's unit groups in,
//! raw (unrounded) demand lines out. Roll-up and rounding happen in
//! [`super::aggregate`].

use crate::error::{EngineError, Result};
use crate::guideline::{EquipmentKind, GuidelineSnapshot, LoadClass, UnitLoadBasis};
use crate::inventory::{Amenities, Building, EquipmentInputs, ProjectType, SubType, UnitType};
use crate::policy::rates::{ConsumptionUse, FlushSystem, RateKey, RateKind};
use crate::policy::snapshot::{
    PARAM_COOLING_TOWER_MAKEUP, PARAM_LANDSCAPE_IRRIGATION, PARAM_POOL_EVAPORATION, PolicySnapshot,
};
use crate::report::MechanicalUse;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One electrical line before rounding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawElectricalLine {
    pub unit_type: UnitType,
    pub count: u32,
    pub unit_w: f64,
    pub connected_w: f64,
    pub max_demand_factor: f64,
    pub essential_demand_factor: f64,
    pub fire_demand_factor: f64,
}

/// Computes one building's electrical unit lines.
///
/// Area-based entries yield `area × watt/m²`; equipment-based entries carry
/// the fixed per-unit watt figure regardless of area. Connected load is the
/// unit load times the unit count.
pub(crate) fn electrical_unit_lines(
    building: &Building,
    snapshot: &GuidelineSnapshot,
) -> Result<Vec<RawElectricalLine>> {
    let mut lines = Vec::with_capacity(building.units.len());
    for group in &building.units {
        let factor = snapshot.resolve(LoadClass::UnitArea(group.unit_type))?;
        let unit_w = match factor.basis {
            UnitLoadBasis::AreaWattsPerM2(watts) => group.area_m2 * watts,
            UnitLoadBasis::EquipmentWatts(watts) => watts,
        };
        let connected_w = unit_w * f64::from(group.count);
        lines.push(RawElectricalLine {
            unit_type: group.unit_type,
            count: group.count,
            unit_w,
            connected_w,
            max_demand_factor: factor.max_demand_factor,
            essential_demand_factor: factor.essential_demand_factor,
            fire_demand_factor: factor.fire_demand_factor,
        });
    }
    Ok(lines)
}

/// One project-level equipment line before rounding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawEquipmentLine {
    pub kind: EquipmentKind,
    /// Lift count, or rated pump flow in l/s.
    pub quantity: f64,
    pub unit_w: f64,
    pub connected_w: f64,
    pub max_demand_factor: f64,
    pub essential_demand_factor: f64,
    pub fire_demand_factor: f64,
}

/// Computes the project-level equipment lines.
///
/// Zero-quantity equipment produces no line and triggers no lookup, so a
/// project without a fire pump does not need a fire-pump factor entry.
pub(crate) fn equipment_lines(
    equipment: &EquipmentInputs,
    snapshot: &GuidelineSnapshot,
) -> Result<Vec<RawEquipmentLine>> {
    let inputs = [
        (EquipmentKind::Lift, f64::from(equipment.lift_count)),
        (EquipmentKind::DomesticPump, equipment.domestic_pump_flow_lps),
        (EquipmentKind::FirePump, equipment.fire_pump_flow_lps),
    ];

    let mut lines = Vec::new();
    for (kind, quantity) in inputs {
        if quantity == 0.0 {
            continue;
        }
        let load = LoadClass::Equipment(kind);
        let factor = snapshot.resolve(load)?;
        let unit_w = match factor.basis {
            UnitLoadBasis::EquipmentWatts(watts) => watts,
            UnitLoadBasis::AreaWattsPerM2(_) => {
                return Err(EngineError::CorruptFactor {
                    guideline: snapshot.label().to_string(),
                    load,
                    reason: "equipment load requires a watt/unit figure, found watt/m²".to_string(),
                });
            }
        };
        lines.push(RawEquipmentLine {
            kind,
            quantity,
            unit_w,
            connected_w: unit_w * quantity,
            max_demand_factor: factor.max_demand_factor,
            essential_demand_factor: factor.essential_demand_factor,
            fire_demand_factor: factor.fire_demand_factor,
        });
    }
    Ok(lines)
}

/// Fixed key components shared by every water lookup in one calculation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WaterContext {
    pub project_type: ProjectType,
    pub sub_type: SubType,
    pub flush: FlushSystem,
}

impl WaterContext {
    fn key(&self, kind: RateKind) -> RateKey {
        RateKey::new(self.project_type, self.sub_type, kind)
    }
}

/// One water line before rounding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawWaterLine {
    pub unit_type: UnitType,
    pub count: u32,
    pub occupancy: f64,
    pub occupant_lpd: f64,
    pub visitors: f64,
    pub visitor_lpd: f64,
    pub demand_factor: f64,
}

impl RawWaterLine {
    pub fn daily_lpd(&self) -> f64 {
        self.occupant_lpd + self.visitor_lpd
    }
}

/// Computes one building's water unit lines.
///
/// Occupancy is `count × occupants-per-unit`; consumption is occupancy times
/// the drinking rate plus the flush rate the caller's selector picks.
/// Visitor-driven unit types additionally compute
/// `visitors = total area ÷ visitor-density` — the density factor is a
/// divisor, and a zero divisor is treated as corrupt rather than producing
/// an infinite visitor count.
pub(crate) fn water_unit_lines(
    building: &Building,
    snapshot: &PolicySnapshot,
    ctx: &WaterContext,
) -> Result<Vec<RawWaterLine>> {
    let flush_use = ctx.flush.consumption_use();

    let mut lines = Vec::with_capacity(building.units.len());
    for group in &building.units {
        let occupants_per_unit = snapshot.rate(ctx.key(RateKind::Occupancy(group.unit_type)))?;
        let occupancy = f64::from(group.count) * occupants_per_unit;

        let per_occupant = snapshot.rate(ctx.key(RateKind::Consumption(ConsumptionUse::Drinking)))?
            + snapshot.rate(ctx.key(RateKind::Consumption(flush_use)))?;
        let occupant_lpd = occupancy * per_occupant;

        let (visitors, visitor_lpd) = if group.unit_type.visitor_driven() {
            let density_key = ctx.key(RateKind::VisitorDensity);
            let area_per_visitor = snapshot.rate(density_key)?;
            if area_per_visitor == 0.0 {
                return Err(EngineError::CorruptRate {
                    policy: snapshot.id(),
                    key: density_key,
                    value: area_per_visitor,
                });
            }
            let total_area = group.area_m2 * f64::from(group.count);
            let visitors = total_area / area_per_visitor;

            let per_visitor = snapshot
                .rate(ctx.key(RateKind::VisitorConsumption(ConsumptionUse::Drinking)))?
                + snapshot.rate(ctx.key(RateKind::VisitorConsumption(flush_use)))?;
            (visitors, visitors * per_visitor)
        } else {
            (0.0, 0.0)
        };

        let factor_key = ctx.key(RateKind::DailyDemandFactor(group.unit_type));
        let demand_factor = snapshot.rate(factor_key)?;
        if demand_factor > 1.0 {
            return Err(EngineError::CorruptRate {
                policy: snapshot.id(),
                key: factor_key,
                value: demand_factor,
            });
        }

        lines.push(RawWaterLine {
            unit_type: group.unit_type,
            count: group.count,
            occupancy,
            occupant_lpd,
            visitors,
            visitor_lpd,
            demand_factor,
        });
    }
    Ok(lines)
}

/// One mechanical demand line before rounding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawMechanicalLine {
    pub usage: MechanicalUse,
    pub demand_lpd: f64,
}

/// Computes a building's mechanical demand lines from amenity figures and
/// calculation parameters. Absent amenities produce no line and require no
/// parameter.
pub(crate) fn mechanical_lines(
    amenities: &Amenities,
    snapshot: &PolicySnapshot,
) -> Result<Vec<RawMechanicalLine>> {
    let mut lines = Vec::new();
    if amenities.pool_area_m2 > 0.0 {
        let rate = snapshot.parameter(PARAM_POOL_EVAPORATION)?;
        lines.push(RawMechanicalLine {
            usage: MechanicalUse::PoolEvaporation,
            demand_lpd: amenities.pool_area_m2 * rate,
        });
    }
    if amenities.landscape_area_m2 > 0.0 {
        let rate = snapshot.parameter(PARAM_LANDSCAPE_IRRIGATION)?;
        lines.push(RawMechanicalLine {
            usage: MechanicalUse::LandscapeIrrigation,
            demand_lpd: amenities.landscape_area_m2 * rate,
        });
    }
    if amenities.cooling_tower_capacity_lps > 0.0 {
        let fraction = snapshot.parameter(PARAM_COOLING_TOWER_MAKEUP)?;
        lines.push(RawMechanicalLine {
            usage: MechanicalUse::CoolingTowerMakeup,
            demand_lpd: amenities.cooling_tower_capacity_lps * fraction * SECONDS_PER_DAY,
        });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::UnitGroup;
    use crate::policy::rates::RateEntry;
    use crate::policy::version::{PolicyId, PolicyVersion};
    use chrono::NaiveDate;

    fn retail_snapshot(density_m2_per_visitor: f64) -> PolicySnapshot {
        let id = PolicyId::new(5, 1);
        let mut version = PolicyVersion::draft(id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let key = |kind| RateKey::new(ProjectType::Retail, SubType::MidMarket, kind);
        version.rates.insert(
            key(RateKind::Occupancy(UnitType::RetailUnit)),
            RateEntry::new(4.0, "occupants/unit"),
        );
        version.rates.insert(
            key(RateKind::Consumption(ConsumptionUse::Drinking)),
            RateEntry::new(45.0, "l/occupant/day"),
        );
        version.rates.insert(
            key(RateKind::Consumption(ConsumptionUse::FlushValve)),
            RateEntry::new(30.0, "l/occupant/day"),
        );
        version.rates.insert(
            key(RateKind::VisitorConsumption(ConsumptionUse::Drinking)),
            RateEntry::new(15.0, "l/visitor/day"),
        );
        version.rates.insert(
            key(RateKind::VisitorConsumption(ConsumptionUse::FlushValve)),
            RateEntry::new(10.0, "l/visitor/day"),
        );
        version.rates.insert(
            key(RateKind::VisitorDensity),
            RateEntry::new(density_m2_per_visitor, "m2/visitor"),
        );
        version.rates.insert(
            key(RateKind::DailyDemandFactor(UnitType::RetailUnit)),
            RateEntry::new(0.8, "fraction"),
        );
        PolicySnapshot::from_version(&version)
    }

    fn retail_building() -> Building {
        Building {
            name: "Arcade".to_string(),
            units: vec![UnitGroup {
                unit_type: UnitType::RetailUnit,
                area_m2: 30.0,
                count: 10,
            }],
            amenities: Amenities::default(),
        }
    }

    fn retail_ctx() -> WaterContext {
        WaterContext {
            project_type: ProjectType::Retail,
            sub_type: SubType::MidMarket,
            flush: FlushSystem::Valve,
        }
    }

    #[test]
    fn visitor_count_divides_area_by_density() {
        // 300 m² at 3 m²/visitor must give 100 visitors, not 900.
        let snapshot = retail_snapshot(3.0);
        let lines = water_unit_lines(&retail_building(), &snapshot, &retail_ctx()).unwrap();
        assert_eq!(lines.len(), 1);
        assert!((lines[0].visitors - 100.0).abs() < 1e-9);
        assert!((lines[0].visitor_lpd - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn zero_visitor_density_is_corrupt() {
        let snapshot = retail_snapshot(0.0);
        let err = water_unit_lines(&retail_building(), &snapshot, &retail_ctx()).unwrap_err();
        assert!(matches!(err, EngineError::CorruptRate { .. }));
    }

    #[test]
    fn occupant_consumption_follows_flush_selector() {
        let snapshot = retail_snapshot(3.0);
        let mut version = PolicyVersion::draft(
            PolicyId::new(5, 1),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        // Rebuild with a tank rate to compare both selector branches.
        version.rates = snapshot_rates_with_tank();
        let snapshot_tank = PolicySnapshot::from_version(&version);

        let valve_lines =
            water_unit_lines(&retail_building(), &snapshot, &retail_ctx()).unwrap();
        let tank_ctx = WaterContext {
            flush: FlushSystem::Tank,
            ..retail_ctx()
        };
        let tank_lines =
            water_unit_lines(&retail_building(), &snapshot_tank, &tank_ctx).unwrap();

        // 40 occupants × (45 + 30) vs 40 × (45 + 20)
        assert!((valve_lines[0].occupant_lpd - 3000.0).abs() < 1e-9);
        assert!((tank_lines[0].occupant_lpd - 2600.0).abs() < 1e-9);
    }

    fn snapshot_rates_with_tank() -> std::collections::BTreeMap<RateKey, RateEntry> {
        let key = |kind| RateKey::new(ProjectType::Retail, SubType::MidMarket, kind);
        let mut rates = std::collections::BTreeMap::new();
        rates.insert(
            key(RateKind::Occupancy(UnitType::RetailUnit)),
            RateEntry::new(4.0, "occupants/unit"),
        );
        rates.insert(
            key(RateKind::Consumption(ConsumptionUse::Drinking)),
            RateEntry::new(45.0, "l/occupant/day"),
        );
        rates.insert(
            key(RateKind::Consumption(ConsumptionUse::FlushTank)),
            RateEntry::new(20.0, "l/occupant/day"),
        );
        rates.insert(
            key(RateKind::VisitorConsumption(ConsumptionUse::Drinking)),
            RateEntry::new(15.0, "l/visitor/day"),
        );
        rates.insert(
            key(RateKind::VisitorConsumption(ConsumptionUse::FlushTank)),
            RateEntry::new(8.0, "l/visitor/day"),
        );
        rates.insert(
            key(RateKind::VisitorDensity),
            RateEntry::new(3.0, "m2/visitor"),
        );
        rates.insert(
            key(RateKind::DailyDemandFactor(UnitType::RetailUnit)),
            RateEntry::new(0.8, "fraction"),
        );
        rates
    }

    #[test]
    fn missing_rate_aborts_line_computation() {
        let id = PolicyId::new(5, 1);
        let version = PolicyVersion::draft(id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let snapshot = PolicySnapshot::from_version(&version);
        let err = water_unit_lines(&retail_building(), &snapshot, &retail_ctx()).unwrap_err();
        assert!(matches!(err, EngineError::RateNotFound { .. }));
    }

    #[test]
    fn cooling_tower_makeup_scales_capacity_to_daily_liters() {
        let id = PolicyId::new(5, 1);
        let mut version = PolicyVersion::draft(id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        version
            .parameters
            .insert(PARAM_COOLING_TOWER_MAKEUP.to_string(), 0.02);
        let snapshot = PolicySnapshot::from_version(&version);

        let amenities = Amenities {
            pool_area_m2: 0.0,
            landscape_area_m2: 0.0,
            cooling_tower_capacity_lps: 5.0,
        };
        let lines = mechanical_lines(&amenities, &snapshot).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].usage, MechanicalUse::CoolingTowerMakeup);
        // 5 l/s × 0.02 × 86400 s
        assert!((lines[0].demand_lpd - 8640.0).abs() < 1e-9);
    }

    #[test]
    fn absent_amenities_require_no_parameters() {
        let id = PolicyId::new(5, 1);
        let version = PolicyVersion::draft(id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let snapshot = PolicySnapshot::from_version(&version);
        let lines = mechanical_lines(&Amenities::default(), &snapshot).unwrap();
        assert!(lines.is_empty());
    }
}
