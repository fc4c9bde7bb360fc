// curudroid/src/commands/ledger.rs
//
// USE CASE: Verify the ledger's hash chain, or recover from corruption.

use std::path::Path;

use curudroid_core::infrastructure::error::InfrastructureError;
use curudroid_core::infrastructure::ledger_store;

/// Returns `true` when the chain verifies clean.
pub fn verify(ledger_path: &Path) -> bool {
    match ledger_store::verify(ledger_path) {
        Ok(report) => {
            println!("{} ({} entries)", report.message, report.entries);
            report.ok
        }
        Err(e) => {
            eprintln!("[ERROR] ledger verification failed: {e}");
            false
        }
    }
}

/// Back up the current ledger and start a fresh chain. The caller must
/// already have confirmed `--force-recover` was passed; recovery without
/// the force flag is refused in `main.rs` before this runs.
pub fn recover(ledger_path: &Path) -> Result<(), InfrastructureError> {
    let report = ledger_store::recover(ledger_path)?;
    if let Some(backup) = &report.backup_path {
        println!("backed up corrupted ledger to {}", backup.display());
    }
    println!("{}", report.message);
    Ok(())
}
