// curudroid-core/src/domain/policy_lock.rs

use serde::{Deserialize, Serialize};

use crate::domain::error::GovernanceError;

/// Pinned `(hash, version)` pair enforced at startup outside maintenance
/// mode.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PolicyLock {
    pub locked_policy_sha256: String,
    pub locked_version: String,
}

impl PolicyLock {
    /// `verify()` fails with `PolicyLockError` if the current policy hash or
    /// version diverge from what was pinned. The lock file's own absence is
    /// the caller's concern (`infrastructure::policy_lock_store`), since it
    /// precedes having a `PolicyLock` value at all.
    pub fn verify(
        &self,
        current_policy_sha256: &str,
        current_policy_version: &str,
    ) -> Result<(), GovernanceError> {
        if current_policy_sha256 != self.locked_policy_sha256 {
            return Err(GovernanceError::PolicyLockError(
                "Policy file altered outside maintenance mode.".to_string(),
            ));
        }

        if current_policy_version != self.locked_version {
            return Err(GovernanceError::PolicyLockError(
                "Policy version mismatch with locked version.".to_string(),
            ));
        }

        Ok(())
    }
}
