//! CLI entry point — loads a project file, runs both pipelines, prints the
//! reports, and optionally exports line items to CSV.

use std::process;

use tracing_subscriber::EnvFilter;

use mep_demand::cli::{self, CliOptions};
use mep_demand::config::{ProjectFile, ProjectSetup, baseline_setup};
use mep_demand::engine::{WaterOptions, calculate_electrical_load, calculate_water_demand};
use mep_demand::io::export::{export_electrical_csv, export_water_csv};
use mep_demand::policy::rates::FlushSystem;
use mep_demand::policy::resolver::PolicyRef;
use mep_demand::policy::version::PolicyId;
use mep_demand::reporting::{print_electrical_report, print_water_report};

/// Tank water depth assumed when the caller does not supply one, in m.
const DEFAULT_TANK_DEPTH_M: f64 = 3.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = match cli::parse_args() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            cli::print_usage();
            process::exit(2);
        }
    };

    if let Err(err) = run(&options) {
        eprintln!("error: {err}");
        process::exit(2);
    }
}

fn run(options: &CliOptions) -> Result<(), String> {
    let setup = load_setup(options)?;

    let guideline = match &options.guideline {
        Some(label) => label.clone(),
        None => single_guideline_label(&setup)?,
    };

    let policy_ref = match &options.policy {
        Some(raw) => {
            let id = PolicyId::parse(raw)
                .ok_or_else(|| format!("invalid value for --policy: `{raw}` (expected e.g. P12r3)"))?;
            PolicyRef::Explicit(id)
        }
        None => PolicyRef::ProjectDefault,
    };

    let flush_system = match options.flush.as_deref() {
        Some("tank") => FlushSystem::Tank,
        _ => FlushSystem::Valve,
    };
    let water_options = WaterOptions {
        flush_system,
        tank_depth_m: options.tank_depth_m.unwrap_or(DEFAULT_TANK_DEPTH_M),
    };

    let electrical = calculate_electrical_load(&setup.inventory, &setup.catalog, &guideline)
        .map_err(|err| err.to_string())?;
    print_electrical_report(&electrical);

    let water = calculate_water_demand(&setup.inventory, &setup.store, policy_ref, &water_options)
        .map_err(|err| err.to_string())?;
    print_water_report(&water);

    if !water.source.persistable() {
        eprintln!("note: draft policy preview; these results are not eligible for saving");
    }

    if let Some(path) = &options.electrical_csv {
        export_electrical_csv(&electrical, path)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
        println!("Electrical line items written to {}", path.display());
    }
    if let Some(path) = &options.water_csv {
        export_water_csv(&water, path)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
        println!("Water line items written to {}", path.display());
    }

    Ok(())
}

fn load_setup(options: &CliOptions) -> Result<ProjectSetup, String> {
    match &options.project {
        Some(path) => ProjectFile::from_toml_file(path)?.into_setup(),
        None => Ok(baseline_setup()),
    }
}

fn single_guideline_label(setup: &ProjectSetup) -> Result<String, String> {
    let labels: Vec<&str> = setup.catalog.labels().collect();
    match labels.as_slice() {
        [] => Err("project file defines no guidelines".to_string()),
        [label] => Ok((*label).to_string()),
        many => Err(format!(
            "--guideline is required when the project file defines several guidelines ({})",
            many.join(", ")
        )),
    }
}
