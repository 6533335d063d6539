//! Policy-driven electrical and water demand engine for MEP building
//! services.
//!
//! The crate turns a building inventory plus a versioned policy/guideline
//! rate table into demand figures and equipment sizing: transformer rating
//! on the electrical side, storage tank volume on the water side.
//! Persistence, HTTP, and authentication are external collaborators; the
//! engines here are pure load-then-compute pipelines.

pub mod cli;
pub mod config;
/// The two utility pipelines and their entry points.
pub mod engine;
pub mod error;
pub mod guideline;
pub mod inventory;
pub mod io;
/// Versioned policy store, resolution, and typed rate lookup.
pub mod policy;
pub mod report;
pub mod reporting;

pub use engine::{WaterOptions, calculate_electrical_load, calculate_water_demand};
pub use error::{EngineError, Result};
