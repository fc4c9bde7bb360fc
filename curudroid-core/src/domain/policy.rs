// curudroid-core/src/domain/policy.rs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::error::GovernanceError;

/// The allowlist file. Its content hash is used as the policy's identity in
/// ledger entries and in the Policy Lock.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Policy {
    pub version: String,
    pub allowed_commands: Vec<String>,
}

impl Policy {
    /// Parse and validate the structural invariants of a policy document,
    /// raising `PolicyMalformed`/`PolicyVersionMissing`. Does not touch the
    /// filesystem -- raw bytes come from `infrastructure::policy_store`.
    pub fn parse(raw: &str) -> Result<Self, GovernanceError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| GovernanceError::PolicyMalformed(e.to_string()))?;

        if value.get("version").is_none() {
            return Err(GovernanceError::PolicyVersionMissing);
        }
        if value.get("allowed_commands").is_none() {
            return Err(GovernanceError::PolicyMalformed(
                "allowed_commands missing".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| GovernanceError::PolicyMalformed(e.to_string()))
    }

    /// Exact string equality against the first whitespace-separated token
    /// of `cmd_line` -- the allowlist is authoritative.
    pub fn is_allowed(&self, cmd_line: &str) -> bool {
        match cmd_line.split_whitespace().next() {
            Some(token) => self.allowed_commands.iter().any(|allowed| allowed == token),
            None => false,
        }
    }
}

/// SHA-256 content hash of the raw policy bytes -- the identity used by the
/// Policy Lock and the Ledger.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Minimal hex encoder so the crate doesn't need the `hex` dependency
/// purely for this one call site; `sha2::Digest::finalize` already returns
/// a fixed-size byte array.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(bytes.as_ref().len() * 2);
        for byte in bytes.as_ref() {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}
