// curudroid-core/src/infrastructure/policy_store.rs

use std::path::Path;

use crate::domain::error::GovernanceError;
use crate::domain::policy::{sha256_hex, Policy};
use crate::infrastructure::error::InfrastructureError;

/// Load and parse the allowlist at `path`, returning both the parsed
/// `Policy` and the SHA-256 of its raw bytes -- the hash is the identity
/// checked by the Policy Lock and recorded in ledger entries.
pub fn load_policy(path: &Path) -> Result<(Policy, String), InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(format!(
            "policy file not found: {}",
            path.display()
        )));
    }

    let raw = std::fs::read_to_string(path)?;
    let policy = Policy::parse(&raw).map_err(|e| match e {
        GovernanceError::PolicyVersionMissing => {
            InfrastructureError::ConfigError("policy version missing".to_string())
        }
        other => InfrastructureError::ConfigError(other.to_string()),
    })?;
    let sha256 = sha256_hex(raw.as_bytes());

    Ok((policy, sha256))
}

/// Hash only, for callers that don't need the parsed document (the
/// Executor re-checks this independently of whatever `Plan Validator`
/// already computed, defense in depth).
pub fn compute_policy_sha256(path: &Path) -> Result<String, InfrastructureError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(sha256_hex(raw.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_and_hashes_a_valid_policy_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{"version":"1","allowed_commands":["tail"]}"#).unwrap();

        let (policy, hash) = load_policy(&path).unwrap();
        assert_eq!(policy.version, "1");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_policy_sha256(&path).unwrap());
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(
            load_policy(&path),
            Err(InfrastructureError::ConfigNotFound(_))
        ));
    }
}
