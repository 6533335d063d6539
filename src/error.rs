//! Engine error surface.
//!
//! Every variant carries the context a caller needs to act on the failure
//! (policy identity, full lookup key). Nothing is retried internally and no
//! lookup miss is ever papered over with a zero.

use thiserror::Error;

use crate::guideline::LoadClass;
use crate::policy::rates::RateKey;
use crate::policy::version::PolicyId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An explicitly requested policy version does not exist.
    #[error("policy {id} does not exist")]
    PolicyNotFound { id: PolicyId },

    /// No version carries the default flag; a configuration error, not a
    /// user error.
    #[error("no policy version is marked as the system default")]
    NoDefaultPolicy,

    /// More than one version carries the default flag. The store failed its
    /// single-default guarantee; the engine cannot repair this.
    #[error("{count} policy versions are marked default, expected exactly one")]
    DefaultPolicyConflict { count: usize },

    #[error("guideline `{label}` does not exist")]
    GuidelineNotFound { label: String },

    /// Lookup miss with no applicable alias fallback. Aborts the whole
    /// calculation; a partial report with implicit zeros is worse than none.
    #[error("policy {policy} has no rate for {key}")]
    RateNotFound { policy: PolicyId, key: RateKey },

    #[error("guideline `{guideline}` has no active factor entry for {load}")]
    FactorNotFound { guideline: String, load: LoadClass },

    /// A stored rate violates the finite/non-negative invariant.
    #[error("policy {policy} stores a corrupt rate for {key}: {value}")]
    CorruptRate {
        policy: PolicyId,
        key: RateKey,
        value: f64,
    },

    #[error("policy {policy} stores a corrupt parameter `{name}`: {value}")]
    CorruptParameter {
        policy: PolicyId,
        name: String,
        value: f64,
    },

    /// A guideline factor entry is mis-shaped (wrong load basis, factor
    /// outside 0–1, negative watt figure).
    #[error("guideline `{guideline}` factor entry for {load} is corrupt: {reason}")]
    CorruptFactor {
        guideline: String,
        load: LoadClass,
        reason: String,
    },

    #[error("policy {policy} has no calculation parameter `{name}`")]
    ParameterNotFound { policy: PolicyId, name: String },

    /// The transformer rating table is exhausted. Surfaced rather than
    /// silently picking the largest available rating.
    #[error("no transformer rating covers {demand_kva} kVA (largest in table: {largest_kva} kVA)")]
    NoSuitableRating { demand_kva: u64, largest_kva: u64 },

    #[error("invalid inventory: {reason}")]
    InvalidInventory { reason: String },
}
