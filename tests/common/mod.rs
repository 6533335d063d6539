//! Shared test fixtures for integration tests.

use mep_demand::config::{ProjectSetup, baseline_setup};
use mep_demand::engine::WaterOptions;
use mep_demand::policy::rates::FlushSystem;

/// The baseline demonstration project: two identical luxury towers.
pub fn setup() -> ProjectSetup {
    baseline_setup()
}

/// Default water options (flush valve, 3 m tank depth).
pub fn valve_options() -> WaterOptions {
    WaterOptions {
        flush_system: FlushSystem::Valve,
        tank_depth_m: 3.0,
    }
}
