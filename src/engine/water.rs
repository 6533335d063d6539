//! Water demand pipeline.
//!
//! Fixed sequence: validate inventory, resolve the policy snapshot, compute
//! occupant/visitor and mechanical lines per building, roll up, size the
//! storage tank.

use tracing::debug;

use super::aggregate::{WaterRollup, report_ceil, rollup_water};
use super::sizing::size_storage;
use super::unit_load::{WaterContext, mechanical_lines, water_unit_lines};
use crate::error::Result;
use crate::inventory::ProjectInventory;
use crate::policy::rates::FlushSystem;
use crate::policy::resolver::{self, PolicyRef};
use crate::policy::snapshot::PARAM_STORAGE_BUFFER;
use crate::policy::store::PolicyRead;
use crate::report::{
    BuildingWater, MechanicalLineItem, PolicySource, VisitorFigures, WaterDemandReport,
    WaterLineItem, WaterTotals,
};

/// Caller-supplied options for one water calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterOptions {
    /// Flush system installed across the project. The engine does not
    /// second-guess this against sub-type eligibility; the caller owns the
    /// valid-combination matrix.
    pub flush_system: FlushSystem,
    /// Storage tank water depth in m, used for the footprint figure.
    pub tank_depth_m: f64,
}

pub(crate) fn run(
    inventory: &ProjectInventory,
    store: &impl PolicyRead,
    reference: PolicyRef,
    options: &WaterOptions,
) -> Result<WaterDemandReport> {
    inventory.validate()?;
    let snapshot = resolver::resolve(store, &inventory.project, reference)?;
    let ctx = WaterContext {
        project_type: inventory.project_type,
        sub_type: inventory.sub_type,
        flush: options.flush_system,
    };

    // 1. Per-building occupant/visitor and mechanical lines
    let mut project = WaterRollup::default();
    let mut buildings = Vec::with_capacity(inventory.buildings.len());
    for building in &inventory.buildings {
        let raw_lines = water_unit_lines(building, &snapshot, &ctx)?;
        let raw_mechanical = mechanical_lines(&building.amenities, &snapshot)?;
        let rollup = rollup_water(&raw_lines, &raw_mechanical);
        project.absorb(&rollup);

        let lines = raw_lines
            .iter()
            .map(|line| WaterLineItem {
                unit_type: line.unit_type,
                count: line.count,
                occupancy: report_ceil(line.occupancy),
                occupant_lpd: report_ceil(line.occupant_lpd),
                visitors: line.unit_type.visitor_driven().then(|| VisitorFigures {
                    count: report_ceil(line.visitors),
                    demand_lpd: report_ceil(line.visitor_lpd),
                }),
                max_demand_lpd: report_ceil(line.daily_lpd() * line.demand_factor),
            })
            .collect();
        let mechanical = raw_mechanical
            .iter()
            .map(|line| MechanicalLineItem {
                usage: line.usage,
                demand_lpd: report_ceil(line.demand_lpd),
            })
            .collect();
        buildings.push(BuildingWater {
            name: building.name.clone(),
            lines,
            mechanical,
            daily_demand_lpd: report_ceil(rollup.daily_lpd),
            max_demand_lpd: report_ceil(rollup.max_demand_lpd),
        });
    }

    // 2. Storage sizing from the raw project daily demand
    let buffer_fraction = snapshot.parameter(PARAM_STORAGE_BUFFER)?;
    let storage = size_storage(project.daily_lpd, buffer_fraction, options.tank_depth_m)?;

    debug!(
        project = %inventory.project,
        policy = %snapshot.id(),
        daily_lpd = project.daily_lpd,
        max_demand_lpd = project.max_demand_lpd,
        "water pipeline complete"
    );

    Ok(WaterDemandReport {
        project: inventory.project.clone(),
        source: PolicySource::Policy {
            id: snapshot.id(),
            status: snapshot.status(),
        },
        flush_system: options.flush_system,
        buildings,
        totals: WaterTotals {
            occupancy: report_ceil(project.occupancy),
            daily_demand_lpd: report_ceil(project.daily_lpd),
            max_demand_lpd: report_ceil(project.max_demand_lpd),
        },
        storage,
    })
}
