// curudroid-core/src/infrastructure/ledger_store.rs

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::error::GovernanceError;
use crate::domain::ledger::{self, LedgerEntry, LedgerEntryCore};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::append_line;

/// Report fields the ledger cares about: result of a completed execution,
/// independent of how `domain::execution_report` models the rest.
pub struct ReportForLedger<'a> {
    pub plan_id: &'a str,
    pub mode: &'a str,
    pub plan_sha256: &'a str,
    pub policy_sha256: &'a str,
    pub policy_version: &'a str,
    pub risk_score: i64,
}

fn read_lines(path: &Path) -> Result<Vec<String>, InfrastructureError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::to_string)
        .filter(|line| !line.trim().is_empty())
        .collect())
}

fn parse_entries(lines: &[String]) -> Result<Vec<LedgerEntry>, GovernanceError> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str::<LedgerEntry>(line).map_err(|e| {
                GovernanceError::LedgerIntegrityError(format!(
                    "Line {}: invalid JSON: {e}",
                    idx + 1
                ))
            })
        })
        .collect()
}

/// The hash of the last appended entry, or `None` for an empty/missing
/// ledger -- becomes the next entry's `previous_hash`.
pub fn last_entry_hash(path: &Path) -> Result<Option<String>, InfrastructureError> {
    let lines = read_lines(path)?;
    Ok(lines.last().and_then(|line| {
        serde_json::from_str::<LedgerEntry>(line)
            .ok()
            .map(|entry| entry.entry_hash)
    }))
}

/// Append a new entry chained onto the current tail. Returns the appended
/// entry so the caller can log it.
pub fn append(path: &Path, report: &ReportForLedger<'_>) -> Result<LedgerEntry, InfrastructureError> {
    let previous_hash = last_entry_hash(path)?;

    let core = LedgerEntryCore {
        timestamp: Utc::now().to_rfc3339(),
        plan_id: report.plan_id.to_string(),
        mode: Some(report.mode.to_string()),
        plan_sha256: Some(report.plan_sha256.to_string()),
        policy_sha256: Some(report.policy_sha256.to_string()),
        policy_version: Some(report.policy_version.to_string()),
        risk_score: Some(report.risk_score),
        previous_hash,
    };

    let entry = LedgerEntry::new(core)?;
    append_line(path, &serde_json::to_string(&entry)?)?;

    Ok(entry)
}

pub struct VerificationReport {
    pub ok: bool,
    pub entries: usize,
    pub message: String,
}

/// Scan the full file, reconstructing and checking every `entry_hash` and
/// the chain linkage between entries. An absent or empty ledger is
/// treated as trivially OK.
pub fn verify(path: &Path) -> Result<VerificationReport, GovernanceError> {
    let lines = read_lines(path).map_err(|e| GovernanceError::LedgerIntegrityError(e.to_string()))?;

    if lines.is_empty() {
        return Ok(VerificationReport {
            ok: true,
            entries: 0,
            message: "Ledger empty/OK.".to_string(),
        });
    }

    let entries = parse_entries(&lines)?;
    ledger::verify_chain(&entries)?;

    Ok(VerificationReport {
        ok: true,
        entries: entries.len(),
        message: "Ledger integrity OK.".to_string(),
    })
}

pub struct RecoveryReport {
    pub backup_path: Option<PathBuf>,
    pub message: String,
}

/// Move the current ledger aside as `<name>.corrupted.bak` and start a
/// fresh chain from a genesis entry. The caller is responsible for
/// requiring an explicit force flag before invoking this -- recovery
/// without the force flag is a protocol error.
pub fn recover(path: &Path) -> Result<RecoveryReport, InfrastructureError> {
    if !path.exists() {
        return Ok(RecoveryReport {
            backup_path: None,
            message: "No ledger to recover.".to_string(),
        });
    }

    let backup_path = path.with_extension("corrupted.bak");
    std::fs::rename(path, &backup_path)?;

    let genesis = ledger::genesis_entry()?;
    append_line(path, &serde_json::to_string(&genesis)?)?;

    Ok(RecoveryReport {
        backup_path: Some(backup_path),
        message: "Ledger recovered with new genesis block.".to_string(),
    })
}
