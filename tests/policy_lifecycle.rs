//! Integration tests for policy lifecycle, default uniqueness, and the
//! resolution order the water pipeline depends on.

mod common;

use chrono::NaiveDate;
use mep_demand::config::{BASELINE_ACTIVE_POLICY, BASELINE_DRAFT_POLICY};
use mep_demand::engine::calculate_water_demand;
use mep_demand::error::EngineError;
use mep_demand::policy::resolver::{self, PolicyRef};
use mep_demand::policy::store::{InMemoryPolicyStore, PolicyRead};
use mep_demand::policy::version::{PolicyId, PolicyStatus, PolicyVersion};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
}

#[test]
fn any_activation_sequence_leaves_exactly_one_default() {
    let ids = [PolicyId::new(1, 1), PolicyId::new(1, 2), PolicyId::new(2, 1)];
    let mut store = InMemoryPolicyStore::new();
    for id in ids {
        store.insert(PolicyVersion::draft(id, date()));
    }

    for id in [ids[0], ids[2], ids[1], ids[2], ids[0]] {
        store.activate(id).unwrap();
        assert_eq!(store.default_count(), 1);
        assert!(store.version(id).unwrap().is_default);
    }
}

#[test]
fn archiving_the_default_leaves_zero_defaults_and_resolution_fails() {
    let id = PolicyId::new(1, 1);
    let mut store = InMemoryPolicyStore::new();
    store.insert(PolicyVersion::draft(id, date()));
    store.activate(id).unwrap();

    store.archive(id).unwrap();
    assert_eq!(store.default_count(), 0);
    assert_eq!(store.version(id).unwrap().status, PolicyStatus::Archived);

    let err = resolver::resolve(&store, "any", PolicyRef::ProjectDefault).unwrap_err();
    assert!(matches!(err, EngineError::NoDefaultPolicy));
}

#[test]
fn archived_versions_still_resolve_explicitly() {
    let id = PolicyId::new(1, 1);
    let mut store = InMemoryPolicyStore::new();
    store.insert(PolicyVersion::draft(id, date()));
    store.activate(id).unwrap();
    store.archive(id).unwrap();

    let snapshot = resolver::resolve(&store, "any", PolicyRef::Explicit(id)).unwrap();
    assert_eq!(snapshot.status(), PolicyStatus::Archived);
}

#[test]
fn activating_the_baseline_draft_switches_the_default() {
    let mut setup = common::setup();
    setup.store.activate(BASELINE_DRAFT_POLICY).unwrap();

    assert_eq!(setup.store.default_count(), 1);
    assert!(
        !setup
            .store
            .version(BASELINE_ACTIVE_POLICY)
            .unwrap()
            .is_default
    );

    // Default resolution now prices against the draft-turned-active rates
    // (drinking 95 instead of 90 l/day).
    let report = calculate_water_demand(
        &setup.inventory,
        &setup.store,
        PolicyRef::ProjectDefault,
        &common::valve_options(),
    )
    .expect("calculation should succeed after activation");
    assert_eq!(report.buildings[0].lines[0].occupant_lpd, 21_280);
}

#[test]
fn project_selection_overrides_the_default_per_project() {
    let mut setup = common::setup();
    setup
        .store
        .set_project_selection(setup.inventory.project.as_str(), BASELINE_DRAFT_POLICY)
        .unwrap();

    let selected =
        resolver::resolve(&setup.store, &setup.inventory.project, PolicyRef::ProjectDefault)
            .unwrap();
    assert_eq!(selected.id(), BASELINE_DRAFT_POLICY);

    let other =
        resolver::resolve(&setup.store, "some other project", PolicyRef::ProjectDefault).unwrap();
    assert_eq!(other.id(), BASELINE_ACTIVE_POLICY);

    setup
        .store
        .clear_project_selection(&setup.inventory.project);
    let cleared =
        resolver::resolve(&setup.store, &setup.inventory.project, PolicyRef::ProjectDefault)
            .unwrap();
    assert_eq!(cleared.id(), BASELINE_ACTIVE_POLICY);
}

#[test]
fn snapshots_are_isolated_from_later_store_edits() {
    use mep_demand::inventory::{ProjectType, SubType, UnitType};
    use mep_demand::policy::rates::{RateEntry, RateKey, RateKind};

    let setup = common::setup();
    let snapshot = resolver::resolve(
        &setup.store,
        &setup.inventory.project,
        PolicyRef::ProjectDefault,
    )
    .unwrap();

    let key = RateKey::new(
        ProjectType::Residential,
        SubType::Luxury,
        RateKind::Occupancy(UnitType::Bhk2),
    );
    let mut store = setup.store;
    store
        .upsert_rate(BASELINE_ACTIVE_POLICY, key, RateEntry::new(9.0, "occupants/unit"))
        .unwrap();

    // The snapshot taken before the edit still sees the original rate.
    assert_eq!(snapshot.rate(key).unwrap(), 4.0);
    let fresh = resolver::resolve(&store, "any", PolicyRef::ProjectDefault).unwrap();
    assert_eq!(fresh.rate(key).unwrap(), 9.0);
}
