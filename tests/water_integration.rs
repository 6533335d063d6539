//! Integration tests for the water demand pipeline on the baseline project.

mod common;

use mep_demand::config::{BASELINE_ACTIVE_POLICY, BASELINE_DRAFT_POLICY};
use mep_demand::engine::{WaterOptions, calculate_water_demand};
use mep_demand::error::EngineError;
use mep_demand::inventory::{SubType, UnitGroup, UnitType};
use mep_demand::policy::rates::FlushSystem;
use mep_demand::policy::resolver::PolicyRef;
use mep_demand::policy::version::PolicyStatus;
use mep_demand::report::{MechanicalUse, PolicySource, WaterDemandReport};

fn baseline_report() -> WaterDemandReport {
    let setup = common::setup();
    calculate_water_demand(
        &setup.inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &common::valve_options(),
    )
    .expect("baseline water calculation should succeed")
}

#[test]
fn baseline_totals_are_deterministic_whole_liters() {
    let report = baseline_report();

    // Per tower: 152 + 95 occupants at 135 l/day (90 drinking + 45 flush
    // valve) is 33 345 l/day, plus 960 l pool evaporation and 2 400 l
    // irrigation.
    assert_eq!(report.totals.occupancy, 494);
    assert_eq!(report.totals.daily_demand_lpd, 73_410);
    assert_eq!(report.totals.max_demand_lpd, 66_741);
    assert_eq!(report.buildings[0].daily_demand_lpd, 36_705);
    assert_eq!(report.buildings[0].max_demand_lpd, 33_371);
}

#[test]
fn storage_is_one_day_supply_plus_buffer() {
    let report = baseline_report();
    // 73 410 l/day × 1.2 buffer, 3 m deep.
    assert_eq!(report.storage.volume_l, 88_092);
    assert_eq!(report.storage.footprint_m2, 30);
    assert_eq!(report.storage.side_m, 6);
}

#[test]
fn mechanical_lines_appear_per_building_but_not_as_occupant_lines() {
    let report = baseline_report();
    for building in &report.buildings {
        let usages: Vec<MechanicalUse> =
            building.mechanical.iter().map(|line| line.usage).collect();
        assert_eq!(
            usages,
            vec![
                MechanicalUse::PoolEvaporation,
                MechanicalUse::LandscapeIrrigation,
            ]
        );
        for line in &building.lines {
            assert!(line.occupancy > 0, "occupant lines carry occupancy");
        }
    }
}

#[test]
fn flush_tank_selector_uses_the_tank_rate() {
    let setup = common::setup();
    let report = calculate_water_demand(
        &setup.inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &WaterOptions {
            flush_system: FlushSystem::Tank,
            tank_depth_m: 3.0,
        },
    )
    .expect("tank calculation should succeed");

    // 152 occupants in the 2BHK line at 125 l/day (90 drinking + 35 tank).
    assert_eq!(report.buildings[0].lines[0].occupant_lpd, 19_000);
    assert!(report.totals.daily_demand_lpd < baseline_report().totals.daily_demand_lpd);
}

#[test]
fn high_end_alias_matches_luxury_line_for_line() {
    let setup = common::setup();
    let luxury = baseline_report();

    let mut aliased_inventory = setup.inventory.clone();
    aliased_inventory.sub_type = SubType::HighEnd;
    let aliased = calculate_water_demand(
        &aliased_inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &common::valve_options(),
    )
    .expect("aliased calculation should succeed");

    assert_eq!(luxury.buildings, aliased.buildings);
    assert_eq!(luxury.totals, aliased.totals);
    assert_eq!(luxury.storage, aliased.storage);
}

#[test]
fn retail_visitors_divide_area_by_density() {
    let mut setup = common::setup();
    setup.inventory.buildings[0].units.push(UnitGroup {
        unit_type: UnitType::RetailUnit,
        area_m2: 30.0,
        count: 10,
    });
    let report = calculate_water_demand(
        &setup.inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &common::valve_options(),
    )
    .expect("retail calculation should succeed");
    let retail_line = report.buildings[0]
        .lines
        .iter()
        .find(|line| line.unit_type == UnitType::RetailUnit)
        .expect("retail line should be present");
    let visitors = retail_line.visitors.as_ref().expect("retail is visitor-driven");
    // 300 m² at 3 m²/visitor: 100 visitors, never 900.
    assert_eq!(visitors.count, 100);
}

#[test]
fn unknown_sub_type_aborts_before_any_partial_report() {
    let setup = common::setup();
    let mut inventory = setup.inventory.clone();
    inventory.sub_type = SubType::Affordable;

    let err = calculate_water_demand(
        &inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &common::valve_options(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::RateNotFound { .. }));
}

#[test]
fn draft_policy_previews_but_is_tagged_unpersistable() {
    let setup = common::setup();
    let report = calculate_water_demand(
        &setup.inventory,
        &setup.store,
        PolicyRef::Explicit(BASELINE_DRAFT_POLICY),
        &common::valve_options(),
    )
    .expect("draft preview should succeed");

    assert_eq!(
        report.source,
        PolicySource::Policy {
            id: BASELINE_DRAFT_POLICY,
            status: PolicyStatus::Draft,
        }
    );
    assert!(!report.source.persistable());

    // The draft raises drinking from 90 to 95 l/day: 152 × 140 in the
    // first 2BHK line.
    assert_eq!(report.buildings[0].lines[0].occupant_lpd, 21_280);
}

#[test]
fn default_resolution_tags_the_active_policy() {
    let report = baseline_report();
    assert_eq!(
        report.source,
        PolicySource::Policy {
            id: BASELINE_ACTIVE_POLICY,
            status: PolicyStatus::Active,
        }
    );
    assert!(report.source.persistable());
}

#[test]
fn rerunning_the_same_inputs_gives_an_identical_report() {
    assert_eq!(baseline_report(), baseline_report());
}

#[test]
fn invalid_tank_depth_is_rejected() {
    let setup = common::setup();
    let err = calculate_water_demand(
        &setup.inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &WaterOptions {
            flush_system: FlushSystem::Valve,
            tank_depth_m: 0.0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInventory { .. }));
}

#[test]
fn negative_area_is_rejected_before_resolution() {
    let setup = common::setup();
    let mut inventory = setup.inventory.clone();
    inventory.buildings[0].units[0].area_m2 = -5.0;

    let err = calculate_water_demand(
        &inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &common::valve_options(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInventory { .. }));
}
