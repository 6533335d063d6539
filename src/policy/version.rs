//! Policy version identity, lifecycle state, and owned rate tables.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::inventory::SubType;
use crate::policy::rates::{RateEntry, RateKey};

/// Identity of one policy version: policy number plus revision.
///
/// Displays as `P<number>r<revision>`, e.g. `P12r3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyId {
    pub number: u32,
    pub revision: u32,
}

impl PolicyId {
    pub fn new(number: u32, revision: u32) -> Self {
        Self { number, revision }
    }

    /// Parses the display form `P<number>r<revision>` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let rest = s.strip_prefix('P').or_else(|| s.strip_prefix('p'))?;
        let (number, revision) = rest.split_once(['r', 'R'])?;
        Some(Self {
            number: number.parse().ok()?,
            revision: revision.parse().ok()?,
        })
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}r{}", self.number, self.revision)
    }
}

/// Lifecycle state of a policy version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    /// Usable for preview calculations only; results must not be persisted.
    Draft,
    Active,
    /// Terminal state.
    Archived,
}

impl PolicyStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

/// One versioned bundle of rate tables, calculation parameters, and sub-type
/// aliases, plus its lifecycle metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyVersion {
    pub id: PolicyId,
    pub effective: NaiveDate,
    pub status: PolicyStatus,
    pub is_default: bool,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Composite-key rate table. `BTreeMap` keeps iteration deterministic.
    pub rates: BTreeMap<RateKey, RateEntry>,
    /// Flat named engineering constants (evaporation rate, buffer fraction).
    pub parameters: BTreeMap<String, f64>,
    /// Explicit sub-type alias entries, e.g. `HighEnd -> Luxury`. Lookup
    /// retries through this table exactly once.
    pub aliases: BTreeMap<SubType, SubType>,
}

impl PolicyVersion {
    /// Creates an empty draft version, not marked default.
    pub fn draft(id: PolicyId, effective: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id,
            effective,
            status: PolicyStatus::Draft,
            is_default: false,
            approved_by: None,
            created_at: now,
            updated_at: now,
            rates: BTreeMap::new(),
            parameters: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}
