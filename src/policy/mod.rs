//! Versioned policy repository, resolution, and typed rate lookup.

/// Typed rate keys and entries.
pub mod rates;
/// Explicit id / project selection / system default resolution.
pub mod resolver;
/// Per-calculation immutable rate bundle.
pub mod snapshot;
/// Store read contract and in-memory implementation.
pub mod store;
pub mod version;

// Re-export the main types for convenience
pub use rates::{ConsumptionUse, FlushSystem, RateEntry, RateKey, RateKind};
pub use resolver::{PolicyRef, resolve};
pub use snapshot::PolicySnapshot;
pub use store::{InMemoryPolicyStore, PolicyRead};
pub use version::{PolicyId, PolicyStatus, PolicyVersion};
