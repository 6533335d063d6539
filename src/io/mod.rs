//! File export for demand reports.

pub mod export;
