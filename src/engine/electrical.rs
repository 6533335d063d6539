//! Electrical load pipeline.
//!
//! Fixed sequence: validate inventory, snapshot the guideline, compute unit
//! and equipment lines, roll up, size the transformer. No branching beyond
//! the per-load-class lookups.

use tracing::debug;

use super::aggregate::{ElectricalRollup, report_ceil, rollup_electrical, rollup_equipment};
use super::unit_load::{electrical_unit_lines, equipment_lines};
use crate::error::Result;
use crate::guideline::GuidelineCatalog;
use crate::inventory::ProjectInventory;
use crate::report::{
    BuildingElectrical, ElectricalDemandReport, ElectricalLineItem, ElectricalTotals,
    EquipmentLineItem, PolicySource,
};

pub(crate) fn run(
    inventory: &ProjectInventory,
    catalog: &GuidelineCatalog,
    guideline: &str,
) -> Result<ElectricalDemandReport> {
    inventory.validate()?;
    let snapshot = catalog.snapshot(guideline)?;

    // 1. Per-building unit lines and subtotals
    let mut project = ElectricalRollup::default();
    let mut buildings = Vec::with_capacity(inventory.buildings.len());
    for building in &inventory.buildings {
        let raw_lines = electrical_unit_lines(building, &snapshot)?;
        let rollup = rollup_electrical(&raw_lines);
        project.absorb(&rollup);

        let lines = raw_lines
            .iter()
            .map(|line| ElectricalLineItem {
                unit_type: line.unit_type,
                count: line.count,
                unit_w: report_ceil(line.unit_w),
                connected_w: report_ceil(line.connected_w),
                max_demand_w: report_ceil(line.connected_w * line.max_demand_factor),
            })
            .collect();
        buildings.push(BuildingElectrical {
            name: building.name.clone(),
            lines,
            connected_w: report_ceil(rollup.connected_w),
            max_demand_w: report_ceil(rollup.max_demand_w),
        });
    }

    // 2. Project-level equipment lines
    let raw_equipment = equipment_lines(&inventory.equipment, &snapshot)?;
    let equipment_rollup = rollup_equipment(&raw_equipment);
    project.absorb(&equipment_rollup);

    let equipment = raw_equipment
        .iter()
        .map(|line| EquipmentLineItem {
            kind: line.kind,
            quantity: line.quantity,
            unit_w: report_ceil(line.unit_w),
            connected_w: report_ceil(line.connected_w),
            max_demand_w: report_ceil(line.connected_w * line.max_demand_factor),
        })
        .collect();

    // 3. Transformer selection from the raw project max demand
    let transformer =
        super::sizing::select_transformer(&snapshot, inventory.project_type, project.max_demand_w)?;

    debug!(
        project = %inventory.project,
        guideline,
        connected_w = project.connected_w,
        max_demand_w = project.max_demand_w,
        "electrical pipeline complete"
    );

    Ok(ElectricalDemandReport {
        project: inventory.project.clone(),
        source: PolicySource::Guideline {
            label: snapshot.label().to_string(),
        },
        buildings,
        equipment,
        totals: ElectricalTotals {
            connected_w: report_ceil(project.connected_w),
            max_demand_w: report_ceil(project.max_demand_w),
            essential_w: report_ceil(project.essential_w),
            fire_w: report_ceil(project.fire_w),
        },
        transformer,
    })
}
