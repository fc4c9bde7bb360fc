// curudroid/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use curudroid_core::infrastructure::{AppConfig, RuntimePaths};

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

/// Dispatch to exactly one primary action, in CLI flag priority order.
/// Returns the process exit code rather than calling `std::process::exit`
/// directly, so it stays testable.
async fn run(cli: Cli) -> i32 {
    let config = AppConfig::load();
    let paths = RuntimePaths::from_config(&config);

    if !cli.no_preflight && !commands::preflight::execute(&config, &paths, cli.policy_maintenance) {
        eprintln!("[ERROR] preflight checks failed");
        return 1;
    }

    if cli.verify_ledger {
        return if commands::ledger::verify(&paths.ledger_path) { 0 } else { 1 };
    }

    if cli.ledger_recover {
        if !cli.force_recover {
            eprintln!("[ERROR] --ledger-recover requires --force-recover");
            return 1;
        }
        return match commands::ledger::recover(&paths.ledger_path) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("[ERROR] {e}");
                1
            }
        };
    }

    if cli.policy_lock_init {
        if !cli.policy_maintenance {
            eprintln!("[ERROR] --policy-lock-init requires --policy-maintenance");
            return 1;
        }
        return match commands::policy::lock_init(&paths) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("[ERROR] {e}");
                1
            }
        };
    }

    if cli.policy_maintenance {
        commands::policy::announce_maintenance_mode();
        return 0;
    }

    if cli.observability_report {
        commands::observability::execute(&paths);
        return 0;
    }

    if cli.process_intents {
        if !config.autonomy_reactive_enabled {
            eprintln!("[ERROR] reactive autonomy disabled; set AUTONOMY_REACTIVE_ENABLED=1");
            return 1;
        }
        return match commands::autonomy::execute(&config, &paths).await {
            Ok(_) => 0,
            Err(e) => {
                eprintln!("[ERROR] {e}");
                1
            }
        };
    }

    if let Some(plan_path) = &cli.execute {
        return match commands::execute::execute(plan_path, cli.apply, cli.enable_autonomy, &config, &paths).await {
            Ok(_) => 0,
            Err(e) => {
                eprintln!("[ERROR] {e}");
                1
            }
        };
    }

    println!("curudroid: no action requested, preflight only");
    0
}
