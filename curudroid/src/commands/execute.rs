// curudroid/src/commands/execute.rs
//
// USE CASE: Run a plan to completion, dry-run or apply.

use std::path::Path;

use curudroid_core::application::{execute as run_plan, ExecutorPaths};
use curudroid_core::domain::execution_report::{ExecutionMode, ExecutionReport};
use curudroid_core::domain::error::GovernanceError;
use curudroid_core::infrastructure::{AppConfig, RuntimePaths};

pub async fn execute(
    plan_path: &Path,
    apply: bool,
    autonomy_enabled: bool,
    config: &AppConfig,
    paths: &RuntimePaths,
) -> Result<ExecutionReport, GovernanceError> {
    let mode = if apply { ExecutionMode::Apply } else { ExecutionMode::DryRun };

    let executor_paths = ExecutorPaths {
        policy_path: &paths.policy_path,
        results_dir: &paths.results_dir,
        approvals_dir: &paths.approvals_dir,
        ledger_path: &paths.ledger_path,
        decisions_path: &paths.decisions_path,
        metrics_path: &paths.metrics_path,
    };

    let report = run_plan(
        plan_path,
        mode,
        autonomy_enabled,
        config.curupira_risk_threshold,
        &executor_paths,
    )
    .await?;

    println!(
        "plan {} executed in {} mode: {} command(s)",
        report.plan_id,
        report.mode,
        report.results.len()
    );

    Ok(report)
}
