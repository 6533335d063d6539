//! Immutable rate-table bundle used for one calculation.
//!
//! A snapshot is cloned out of the store once per calculation invocation and
//! never re-queried, so every lookup within one report observes the same
//! tables even if the store changes concurrently.

use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::inventory::SubType;
use crate::policy::rates::{RateEntry, RateKey};
use crate::policy::version::{PolicyId, PolicyStatus, PolicyVersion};

/// Parameter name: pool evaporation, liters per m² of pool surface per day.
pub const PARAM_POOL_EVAPORATION: &str = "pool_evaporation_lpd_per_m2";
/// Parameter name: landscape irrigation, liters per m² per day.
pub const PARAM_LANDSCAPE_IRRIGATION: &str = "landscape_irrigation_lpd_per_m2";
/// Parameter name: cooling-tower makeup as a fraction of circulated volume.
pub const PARAM_COOLING_TOWER_MAKEUP: &str = "cooling_tower_makeup_fraction";
/// Parameter name: storage buffer fraction ("1 day supply + X% buffer").
pub const PARAM_STORAGE_BUFFER: &str = "storage_buffer_fraction";

/// Fully-resolved, read-only rate tables for one policy version.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    id: PolicyId,
    status: PolicyStatus,
    rates: BTreeMap<RateKey, RateEntry>,
    parameters: BTreeMap<String, f64>,
    aliases: BTreeMap<SubType, SubType>,
}

impl PolicySnapshot {
    pub(crate) fn from_version(version: &PolicyVersion) -> Self {
        Self {
            id: version.id,
            status: version.status,
            rates: version.rates.clone(),
            parameters: version.parameters.clone(),
            aliases: version.aliases.clone(),
        }
    }

    /// Identity of the version this snapshot was taken from.
    pub fn id(&self) -> PolicyId {
        self.id
    }

    /// Lifecycle status at snapshot time; carried into every report so the
    /// persistence boundary can refuse draft-derived results.
    pub fn status(&self) -> PolicyStatus {
        self.status
    }

    /// Resolves one rate.
    ///
    /// Lookup order: exact composite key, then one retry through the
    /// sub-type alias table. A surviving miss is `RateNotFound`; a stored
    /// negative or non-finite value is `CorruptRate`. Zero is never
    /// substituted.
    pub fn rate(&self, key: RateKey) -> Result<f64> {
        if let Some(entry) = self.rates.get(&key) {
            return self.screened(key, entry);
        }
        if let Some(&canonical) = self.aliases.get(&key.sub_type) {
            let alias_key = key.with_sub_type(canonical);
            if let Some(entry) = self.rates.get(&alias_key) {
                return self.screened(alias_key, entry);
            }
        }
        Err(EngineError::RateNotFound {
            policy: self.id,
            key,
        })
    }

    fn screened(&self, key: RateKey, entry: &RateEntry) -> Result<f64> {
        if !entry.value.is_finite() || entry.value < 0.0 {
            return Err(EngineError::CorruptRate {
                policy: self.id,
                key,
                value: entry.value,
            });
        }
        Ok(entry.value)
    }

    /// Resolves one named calculation parameter.
    pub fn parameter(&self, name: &str) -> Result<f64> {
        let value = *self
            .parameters
            .get(name)
            .ok_or_else(|| EngineError::ParameterNotFound {
                policy: self.id,
                name: name.to_string(),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::CorruptParameter {
                policy: self.id,
                name: name.to_string(),
                value,
            });
        }
        Ok(value)
    }
}
