// curudroid/src/cli.rs

use std::path::PathBuf;

use clap::Parser;

/// Local governance runtime for an autonomous agent. Each invocation
/// performs exactly one primary action, chosen by which flags are present.
#[derive(Parser, Debug)]
#[command(name = "curudroid")]
#[command(about = "Intent-to-execution governance runtime", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Skip startup checks (directories, config, plugin registration)
    #[arg(long)]
    pub no_preflight: bool,

    /// Run a plan (dry-run by default, real execution with --apply)
    #[arg(long, value_name = "PATH")]
    pub execute: Option<PathBuf>,

    /// Request real execution; pairs with --execute, else dry-run
    #[arg(long)]
    pub apply: bool,

    /// Verify the ledger's hash chain; exit 1 on mismatch
    #[arg(long)]
    pub verify_ledger: bool,

    /// Back up the ledger and rewrite a fresh genesis (requires --force-recover)
    #[arg(long)]
    pub ledger_recover: bool,

    /// Confirm a destructive --ledger-recover
    #[arg(long)]
    pub force_recover: bool,

    /// Permit Policy Lock mutation and skip lock verification at startup
    #[arg(long)]
    pub policy_maintenance: bool,

    /// Initialize/reinitialize the Policy Lock (requires --policy-maintenance)
    #[arg(long)]
    pub policy_lock_init: bool,

    /// Allow Supervisor to downgrade an --apply execution to a dry-run
    /// instead of failing it outright
    #[arg(long)]
    pub enable_autonomy: bool,

    /// Consume one intent from the reactive queue
    #[arg(long)]
    pub process_intents: bool,

    /// Print metrics, the last 5 decisions, ledger status and policy version
    #[arg(long)]
    pub observability_report: bool,
}
