use crate::report::{ElectricalDemandReport, PolicySource, WaterDemandReport};

fn source_label(source: &PolicySource) -> String {
    match source {
        PolicySource::Policy { id, status } => format!("policy {id}, {}", status.label()),
        PolicySource::Guideline { label } => format!("guideline {label}"),
    }
}

pub fn print_electrical_report(report: &ElectricalDemandReport) {
    println!("\n--- Electrical Demand: {} ---", report.project);
    println!("Source: {}", source_label(&report.source));
    for building in &report.buildings {
        println!("{}:", building.name);
        for line in &building.lines {
            println!(
                "  {} x{}: {} W connected, {} W max demand",
                line.unit_type.label(),
                line.count,
                line.connected_w,
                line.max_demand_w
            );
        }
        println!(
            "  subtotal: {} W connected, {} W max demand",
            building.connected_w, building.max_demand_w
        );
    }
    for line in &report.equipment {
        println!(
            "{} x{}: {} W connected, {} W max demand",
            line.kind.label(),
            line.quantity,
            line.connected_w,
            line.max_demand_w
        );
    }
    println!(
        "Project: {} W connected, {} W max demand ({} W essential, {} W fire)",
        report.totals.connected_w,
        report.totals.max_demand_w,
        report.totals.essential_w,
        report.totals.fire_w
    );
    println!(
        "Transformer: {} kVA for {} kVA max demand",
        report.transformer.rating_kva, report.transformer.demand_kva
    );
}

pub fn print_water_report(report: &WaterDemandReport) {
    println!("\n--- Water Demand: {} ---", report.project);
    println!(
        "Source: {} ({})",
        source_label(&report.source),
        report.flush_system.label()
    );
    for building in &report.buildings {
        println!("{}:", building.name);
        for line in &building.lines {
            match &line.visitors {
                Some(v) => println!(
                    "  {} x{}: {} occupants + {} visitors, {} l/day",
                    line.unit_type.label(),
                    line.count,
                    line.occupancy,
                    v.count,
                    line.occupant_lpd + v.demand_lpd
                ),
                None => println!(
                    "  {} x{}: {} occupants, {} l/day",
                    line.unit_type.label(),
                    line.count,
                    line.occupancy,
                    line.occupant_lpd
                ),
            }
        }
        for line in &building.mechanical {
            println!("  {}: {} l/day", line.usage.label(), line.demand_lpd);
        }
        println!(
            "  subtotal: {} l/day, {} l/day max demand",
            building.daily_demand_lpd, building.max_demand_lpd
        );
    }
    println!(
        "Project: {} occupants, {} l/day, {} l/day max demand",
        report.totals.occupancy, report.totals.daily_demand_lpd, report.totals.max_demand_lpd
    );
    println!(
        "Storage: {} l ({} m² footprint, ~{} m square side)",
        report.storage.volume_l, report.storage.footprint_m2, report.storage.side_m
    );
}
