// curudroid/src/commands/observability.rs
//
// USE CASE: Print a snapshot of runtime health for --observability-report:
// metrics, the last 5 decisions, ledger status, and the currently loaded
// policy version.

use curudroid_core::infrastructure::{ledger_store, observability, policy_store, RuntimePaths};

pub fn execute(paths: &RuntimePaths) {
    println!("== metrics ==");
    let metrics = observability::load_metrics(&paths.metrics_path);
    if metrics.is_empty() {
        println!("(none recorded)");
    } else {
        for (name, value) in &metrics {
            println!("{name}: {value}");
        }
    }

    println!("== last 5 decisions ==");
    match observability::load_last_decisions(&paths.decisions_path, 5) {
        Ok(decisions) if decisions.is_empty() => println!("(none recorded)"),
        Ok(decisions) => {
            for decision in decisions {
                println!("{decision}");
            }
        }
        Err(e) => eprintln!("[ERROR] could not read decision log: {e}"),
    }

    println!("== ledger ==");
    match ledger_store::verify(&paths.ledger_path) {
        Ok(report) => println!("{} ({} entries)", report.message, report.entries),
        Err(e) => eprintln!("[ERROR] {e}"),
    }

    println!("== policy ==");
    match policy_store::load_policy(&paths.policy_path) {
        Ok((policy, sha256)) => println!("version={} sha256={sha256}", policy.version),
        Err(e) => eprintln!("[ERROR] {e}"),
    }
}
