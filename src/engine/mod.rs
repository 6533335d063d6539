//! The two utility pipelines and their public entry points.
//!
//! Each pipeline is synchronous and stateless per invocation: it reads one
//! policy/guideline snapshot and one inventory, computes, and returns a
//! report. Nothing here performs storage, HTTP, or authentication calls.

pub(crate) mod aggregate;
mod electrical;
mod sizing;
mod unit_load;
mod water;

pub use water::WaterOptions;

use crate::error::Result;
use crate::guideline::GuidelineCatalog;
use crate::inventory::ProjectInventory;
use crate::policy::resolver::PolicyRef;
use crate::policy::store::PolicyRead;
use crate::report::{ElectricalDemandReport, WaterDemandReport};

/// Computes the electrical demand report for one inventory against one
/// guideline.
///
/// # Errors
///
/// Fails fast on the first invalid input, lookup miss, corrupt factor, or
/// exhausted sizing table; no partial report is ever produced.
pub fn calculate_electrical_load(
    inventory: &ProjectInventory,
    catalog: &GuidelineCatalog,
    guideline: &str,
) -> Result<ElectricalDemandReport> {
    electrical::run(inventory, catalog, guideline)
}

/// Computes the water demand report for one inventory against one resolved
/// policy version.
///
/// The reference may name an explicit version (including a draft, for
/// preview) or defer to the project selection / system default chain.
///
/// # Errors
///
/// Fails fast on the first invalid input, resolution failure, lookup miss,
/// or corrupt rate; no partial report is ever produced.
pub fn calculate_water_demand(
    inventory: &ProjectInventory,
    store: &impl PolicyRead,
    reference: PolicyRef,
    options: &WaterOptions,
) -> Result<WaterDemandReport> {
    water::run(inventory, store, reference, options)
}
