//! Effective-policy resolution.
//!
//! Resolution order is explicit and enumerated: explicit version id, then
//! the project's standard-selection record, then the single system default.
//! The result is a value (a snapshot), never ambient "current policy" state.

use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::policy::snapshot::PolicySnapshot;
use crate::policy::store::PolicyRead;
use crate::policy::version::PolicyId;

/// How the caller names the policy version a calculation should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyRef {
    /// A specific version, any status. Drafts resolve here, which is how
    /// preview calculations work.
    Explicit(PolicyId),
    /// Project selection if present, otherwise the system default.
    ProjectDefault,
}

/// Resolves the single effective snapshot for one calculation.
///
/// # Errors
///
/// `PolicyNotFound` for an explicit id that does not exist,
/// `NoDefaultPolicy` when the fallback chain ends with no default version,
/// and `DefaultPolicyConflict` when the store's single-default guarantee is
/// observed broken. A project selection pointing at a missing version is
/// logged and skipped, not fatal.
pub fn resolve(
    store: &impl PolicyRead,
    project: &str,
    reference: PolicyRef,
) -> Result<PolicySnapshot> {
    if let PolicyRef::Explicit(id) = reference {
        let version = store
            .version(id)
            .ok_or(EngineError::PolicyNotFound { id })?;
        debug!(policy = %id, status = version.status.label(), "resolved explicit policy");
        return Ok(PolicySnapshot::from_version(version));
    }

    if let Some(id) = store.project_selection(project) {
        match store.version(id) {
            Some(version) => {
                debug!(project, policy = %id, "resolved project-selected policy");
                return Ok(PolicySnapshot::from_version(version));
            }
            None => {
                warn!(project, policy = %id, "project selection points at a missing policy, falling back to default");
            }
        }
    }

    let defaults: Vec<_> = store.versions().into_iter().filter(|v| v.is_default).collect();
    match defaults.as_slice() {
        [version] => {
            debug!(project, policy = %version.id, "resolved system default policy");
            Ok(PolicySnapshot::from_version(version))
        }
        [] => Err(EngineError::NoDefaultPolicy),
        many => Err(EngineError::DefaultPolicyConflict { count: many.len() }),
    }
}
