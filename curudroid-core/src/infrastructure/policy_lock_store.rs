// curudroid-core/src/infrastructure/policy_lock_store.rs

use std::path::Path;

use crate::domain::error::GovernanceError;
use crate::domain::policy_lock::PolicyLock;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

/// Pin the current `(hash, version)` pair. Only ever called from
/// maintenance mode.
pub fn initialize(
    path: &Path,
    current_policy_sha256: &str,
    current_policy_version: &str,
) -> Result<(), InfrastructureError> {
    let lock = PolicyLock {
        locked_policy_sha256: current_policy_sha256.to_string(),
        locked_version: current_policy_version.to_string(),
    };
    let body = serde_json::to_string_pretty(&lock)?;
    atomic_write(path, body)
}

/// Load the lock file. Its absence is a `PolicyLockError`, not an I/O
/// error: an uninitialized lock is a governance failure the runtime must
/// refuse to start under.
pub fn load(path: &Path) -> Result<PolicyLock, GovernanceError> {
    if !path.exists() {
        return Err(GovernanceError::PolicyLockError(
            "Policy lock not initialized.".to_string(),
        ));
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| GovernanceError::PolicyLockError(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| GovernanceError::PolicyLockError(e.to_string()))
}
