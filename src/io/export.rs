//! CSV export for demand report line items.
//!
//! One row per line item, building subtotal rows excluded; the calling
//! layer re-derives anything aggregate from the report itself.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::report::{ElectricalDemandReport, WaterDemandReport};

/// Row marker for project-level lines that belong to no building.
const PROJECT_SCOPE: &str = "(project)";

/// Schema v1 column header for electrical line-item export.
pub const ELECTRICAL_SCHEMA_V1_HEADER: &str =
    "building,line,count,unit_w,connected_w,max_demand_w";

/// Schema v1 column header for water line-item export.
pub const WATER_SCHEMA_V1_HEADER: &str =
    "building,line,count,occupancy,occupant_lpd,visitors,visitor_lpd,max_demand_lpd";

/// Exports electrical line items to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_electrical_csv(report: &ElectricalDemandReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_electrical_csv(report, buf)
}

/// Writes electrical line items as CSV to any writer.
///
/// Unit-type rows come first in building order, then the project-level
/// equipment rows. Produces deterministic output for identical reports.
pub fn write_electrical_csv(
    report: &ElectricalDemandReport,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(ELECTRICAL_SCHEMA_V1_HEADER.split(','))?;

    for building in &report.buildings {
        for line in &building.lines {
            wtr.write_record(&[
                building.name.clone(),
                line.unit_type.label().to_string(),
                line.count.to_string(),
                line.unit_w.to_string(),
                line.connected_w.to_string(),
                line.max_demand_w.to_string(),
            ])?;
        }
    }
    for line in &report.equipment {
        wtr.write_record(&[
            PROJECT_SCOPE.to_string(),
            line.kind.label().to_string(),
            line.quantity.to_string(),
            line.unit_w.to_string(),
            line.connected_w.to_string(),
            line.max_demand_w.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports water line items to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_water_csv(report: &WaterDemandReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_water_csv(report, buf)
}

/// Writes water line items as CSV to any writer.
///
/// Occupant lines carry their visitor component where present; mechanical
/// lines leave the occupant columns empty since they have no per-occupant
/// breakdown.
pub fn write_water_csv(report: &WaterDemandReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(WATER_SCHEMA_V1_HEADER.split(','))?;

    for building in &report.buildings {
        for line in &building.lines {
            let (visitors, visitor_lpd) = match &line.visitors {
                Some(v) => (v.count.to_string(), v.demand_lpd.to_string()),
                None => (String::new(), String::new()),
            };
            wtr.write_record(&[
                building.name.clone(),
                line.unit_type.label().to_string(),
                line.count.to_string(),
                line.occupancy.to_string(),
                line.occupant_lpd.to_string(),
                visitors,
                visitor_lpd,
                line.max_demand_lpd.to_string(),
            ])?;
        }
        for line in &building.mechanical {
            wtr.write_record(&[
                building.name.clone(),
                line.usage.label().to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                line.demand_lpd.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
