//! In-memory policy store and the read contract the resolver consumes.
//!
//! The real system keeps policy versions in a relational store; the engine
//! only ever sees the [`PolicyRead`] contract. [`InMemoryPolicyStore`] is the
//! reference implementation used by the CLI, fixtures, and tests. All
//! mutation goes through `&mut self`, which gives the single-writer guarantee
//! the default-uniqueness invariant relies on.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::error::{EngineError, Result};
use crate::inventory::SubType;
use crate::policy::rates::{RateEntry, RateKey};
use crate::policy::version::{PolicyId, PolicyStatus, PolicyVersion};

/// Read contract over the versioned policy repository.
pub trait PolicyRead {
    /// Fetches one version by id, regardless of status.
    fn version(&self, id: PolicyId) -> Option<&PolicyVersion>;

    /// All versions, in deterministic id order.
    fn versions(&self) -> Vec<&PolicyVersion>;

    /// The project-level standard-selection record, if one exists.
    fn project_selection(&self, project: &str) -> Option<PolicyId>;
}

/// Owned, mutable policy repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPolicyStore {
    versions: BTreeMap<PolicyId, PolicyVersion>,
    selections: BTreeMap<String, PolicyId>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a version under its own id.
    pub fn insert(&mut self, version: PolicyVersion) {
        self.versions.insert(version.id, version);
    }

    fn version_mut(&mut self, id: PolicyId) -> Result<&mut PolicyVersion> {
        self.versions
            .get_mut(&id)
            .ok_or(EngineError::PolicyNotFound { id })
    }

    /// Activates a version and makes it the system default.
    ///
    /// Clears the default flag on every other version before setting it on
    /// this one, so at most one default exists at any observable point.
    ///
    /// # Errors
    ///
    /// `PolicyNotFound` if the id is unknown.
    pub fn activate(&mut self, id: PolicyId) -> Result<()> {
        if !self.versions.contains_key(&id) {
            return Err(EngineError::PolicyNotFound { id });
        }
        for version in self.versions.values_mut() {
            version.is_default = false;
        }
        let version = self.version_mut(id)?;
        version.status = PolicyStatus::Active;
        version.is_default = true;
        version.updated_at = Utc::now();
        Ok(())
    }

    /// Archives a version. Terminal: clears the default flag if set.
    ///
    /// # Errors
    ///
    /// `PolicyNotFound` if the id is unknown.
    pub fn archive(&mut self, id: PolicyId) -> Result<()> {
        let version = self.version_mut(id)?;
        version.status = PolicyStatus::Archived;
        version.is_default = false;
        version.updated_at = Utc::now();
        Ok(())
    }

    /// Upserts one rate under its composite key. Re-insertion overwrites,
    /// never duplicates.
    pub fn upsert_rate(&mut self, id: PolicyId, key: RateKey, entry: RateEntry) -> Result<()> {
        let version = self.version_mut(id)?;
        version.rates.insert(key, entry);
        version.updated_at = Utc::now();
        Ok(())
    }

    /// Upserts one named calculation parameter.
    pub fn upsert_parameter(&mut self, id: PolicyId, name: impl Into<String>, value: f64) -> Result<()> {
        let version = self.version_mut(id)?;
        version.parameters.insert(name.into(), value);
        version.updated_at = Utc::now();
        Ok(())
    }

    /// Records a sub-type alias entry on one version.
    pub fn set_alias(&mut self, id: PolicyId, from: SubType, to: SubType) -> Result<()> {
        let version = self.version_mut(id)?;
        version.aliases.insert(from, to);
        version.updated_at = Utc::now();
        Ok(())
    }

    /// Points a project's standard selection at a version.
    ///
    /// # Errors
    ///
    /// `PolicyNotFound` if the id is unknown.
    pub fn set_project_selection(&mut self, project: impl Into<String>, id: PolicyId) -> Result<()> {
        if !self.versions.contains_key(&id) {
            return Err(EngineError::PolicyNotFound { id });
        }
        self.selections.insert(project.into(), id);
        Ok(())
    }

    pub fn clear_project_selection(&mut self, project: &str) {
        self.selections.remove(project);
    }

    /// Count of versions currently flagged default. Exposed for invariant
    /// checks in tests and diagnostics.
    pub fn default_count(&self) -> usize {
        self.versions.values().filter(|v| v.is_default).count()
    }
}

impl PolicyRead for InMemoryPolicyStore {
    fn version(&self, id: PolicyId) -> Option<&PolicyVersion> {
        self.versions.get(&id)
    }

    fn versions(&self) -> Vec<&PolicyVersion> {
        self.versions.values().collect()
    }

    fn project_selection(&self, project: &str) -> Option<PolicyId> {
        self.selections.get(project).copied()
    }
}
