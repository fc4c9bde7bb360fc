// curudroid-core/src/domain/ledger.rs

use serde::{Deserialize, Serialize};

use crate::domain::error::GovernanceError;
use crate::domain::policy::sha256_hex;

/// Everything hashed into `entry_hash`, i.e. the ledger entry minus the
/// hash itself.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerEntryCore {
    pub timestamp: String,
    pub plan_id: String,
    pub mode: Option<String>,
    pub plan_sha256: Option<String>,
    pub policy_sha256: Option<String>,
    pub policy_version: Option<String>,
    pub risk_score: Option<i64>,
    pub previous_hash: Option<String>,
}

/// One line of the hash-chained execution history: `core` fields flattened
/// alongside `entry_hash = SHA-256(canonical_json(core))`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub core: LedgerEntryCore,
    pub entry_hash: String,
}

/// Byte-stable JSON: sorted keys, no insignificant whitespace, `null` for
/// unspecified numeric fields. `serde_json::Value` objects are backed by a
/// `BTreeMap` (this crate never enables the `preserve_order` feature), so a
/// round-trip through `Value` sorts keys for free.
pub fn canonical_json(core: &LedgerEntryCore) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(core)?;
    serde_json::to_string(&value)
}

pub fn compute_entry_hash(core: &LedgerEntryCore) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(core)?.as_bytes()))
}

impl LedgerEntry {
    pub fn new(core: LedgerEntryCore) -> Result<Self, serde_json::Error> {
        let entry_hash = compute_entry_hash(&core)?;
        Ok(LedgerEntry { core, entry_hash })
    }

    /// Recompute `entry_hash` from `core` and compare against the stored
    /// value -- the per-entry half of the chain invariant.
    pub fn recomputed_hash_matches(&self) -> Result<bool, serde_json::Error> {
        Ok(compute_entry_hash(&self.core)? == self.entry_hash)
    }
}

pub const RECOVERY_PLAN_ID: &str = "LEDGER_RECOVERY";
pub const RECOVERY_TIMESTAMP: &str = "GENESIS_RECOVERY";

/// A fresh genesis entry written by `recover(force=true)`.
pub fn genesis_entry() -> Result<LedgerEntry, serde_json::Error> {
    LedgerEntry::new(LedgerEntryCore {
        timestamp: RECOVERY_TIMESTAMP.to_string(),
        plan_id: RECOVERY_PLAN_ID.to_string(),
        mode: Some("recovery".to_string()),
        plan_sha256: None,
        policy_sha256: None,
        policy_version: None,
        risk_score: None,
        previous_hash: None,
    })
}

/// Verify the full hash chain held in memory: first entry's
/// `previous_hash` must be `None`; each subsequent entry's `previous_hash`
/// must equal its predecessor's `entry_hash`; every `entry_hash` must
/// recompute correctly.
pub fn verify_chain(entries: &[LedgerEntry]) -> Result<(), GovernanceError> {
    let mut previous_hash: Option<String> = None;

    for (idx, entry) in entries.iter().enumerate() {
        let line = idx + 1;

        if entry.core.previous_hash != previous_hash {
            return Err(GovernanceError::LedgerIntegrityError(format!(
                "Line {line}: previous_hash mismatch. Expected={previous_hash:?} Got={:?}",
                entry.core.previous_hash
            )));
        }

        let matches = entry
            .recomputed_hash_matches()
            .map_err(|e| GovernanceError::LedgerIntegrityError(format!("Line {line}: {e}")))?;

        if !matches {
            return Err(GovernanceError::LedgerIntegrityError(format!(
                "Line {line}: entry_hash mismatch."
            )));
        }

        previous_hash = Some(entry.entry_hash.clone());
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn core(plan_id: &str, previous_hash: Option<String>) -> LedgerEntryCore {
        LedgerEntryCore {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            plan_id: plan_id.to_string(),
            mode: Some("dry-run".to_string()),
            plan_sha256: Some("abc".to_string()),
            policy_sha256: Some("def".to_string()),
            policy_version: Some("1".to_string()),
            risk_score: Some(2),
            previous_hash,
        }
    }

    #[test]
    fn first_entry_requires_null_previous_hash() {
        let genesis = LedgerEntry::new(core("plan-1", None)).unwrap();
        assert!(verify_chain(std::slice::from_ref(&genesis)).is_ok());
    }

    #[test]
    fn chain_of_n_appends_verifies() {
        let mut entries = Vec::new();
        let mut previous = None;
        for i in 0..5 {
            let entry = LedgerEntry::new(core(&format!("plan-{i}"), previous.clone())).unwrap();
            previous = Some(entry.entry_hash.clone());
            entries.push(entry);
        }
        assert!(verify_chain(&entries).is_ok());
    }

    #[test]
    fn tampering_with_any_entry_breaks_verification() {
        let mut entries = Vec::new();
        let mut previous = None;
        for i in 0..3 {
            let entry = LedgerEntry::new(core(&format!("plan-{i}"), previous.clone())).unwrap();
            previous = Some(entry.entry_hash.clone());
            entries.push(entry);
        }
        entries[1].core.risk_score = Some(9);
        assert!(verify_chain(&entries).is_err());
    }

    #[test]
    fn broken_chain_linkage_is_detected() {
        let first = LedgerEntry::new(core("plan-0", None)).unwrap();
        let second = LedgerEntry::new(core("plan-1", Some("not-the-real-hash".to_string()))).unwrap();
        assert!(verify_chain(&[first, second]).is_err());
    }

    #[test]
    fn canonical_json_is_order_independent_of_struct_declaration() {
        let a = canonical_json(&core("plan-1", None)).unwrap();
        // Re-serializing an already-sorted Value is idempotent.
        let value: serde_json::Value = serde_json::from_str(&a).unwrap();
        let b = serde_json::to_string(&value).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn genesis_entry_has_recovery_markers() {
        let genesis = genesis_entry().unwrap();
        assert_eq!(genesis.core.plan_id, RECOVERY_PLAN_ID);
        assert_eq!(genesis.core.timestamp, RECOVERY_TIMESTAMP);
        assert!(genesis.core.previous_hash.is_none());
    }
}
