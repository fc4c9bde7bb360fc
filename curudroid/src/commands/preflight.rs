// curudroid/src/commands/preflight.rs
//
// USE CASE: Startup diagnostics.

use curudroid_core::application::run_preflight;
use curudroid_core::infrastructure::{AppConfig, RuntimePaths};

/// Run every startup check and print its findings. Returns `false` when any
/// error was found -- the caller maps that to exit code 1. `maintenance`
/// skips the Policy Lock check, since `--policy-lock-init` is the only
/// thing allowed to rewrite the lock it would otherwise be checked against.
pub fn execute(config: &AppConfig, paths: &RuntimePaths, maintenance: bool) -> bool {
    let report = run_preflight(config, paths, maintenance);

    for info in &report.infos {
        println!("[INFO] {info}");
    }
    for warning in &report.warnings {
        println!("[WARN] {warning}");
    }
    for error in &report.errors {
        eprintln!("[ERROR] {error}");
    }

    report.ok()
}
