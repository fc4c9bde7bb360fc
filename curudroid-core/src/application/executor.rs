// curudroid-core/src/application/executor.rs

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map};

use crate::application::{plan_validator, supervisor};
use crate::domain::error::GovernanceError;
use crate::domain::execution_report::{CommandResult, ExecutionMode, ExecutionReport};
use crate::domain::plan::Plan;
use crate::domain::policy::sha256_hex;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::ledger_store::{self, ReportForLedger};
use crate::infrastructure::observability::{increment_metric, log_decision};
use crate::infrastructure::policy_store::load_policy;
use crate::infrastructure::safe_runner;

/// Every path the Executor touches, threaded explicitly rather than read
/// from ambient globals.
pub struct ExecutorPaths<'a> {
    pub policy_path: &'a Path,
    pub results_dir: &'a Path,
    pub approvals_dir: &'a Path,
    pub ledger_path: &'a Path,
    pub decisions_path: &'a Path,
    pub metrics_path: &'a Path,
}

/// The subset of a previously persisted `ExecutionReport` the apply-mode
/// drift check needs. Read back from `results_dir/<plan_id>_result.json`.
#[derive(Debug, Deserialize)]
struct PriorDryRun {
    policy_sha256: String,
    policy_version: String,
}

fn result_path(results_dir: &Path, plan_id: &str) -> PathBuf {
    results_dir.join(format!("{plan_id}_result.json"))
}

fn approval_path(approvals_dir: &Path, plan_id: &str) -> PathBuf {
    approvals_dir.join(format!("{plan_id}.approved"))
}

fn load_prior_dry_run(results_dir: &Path, plan_id: &str) -> Result<Option<PriorDryRun>, GovernanceError> {
    let path = result_path(results_dir, plan_id);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))
}

/// Require a prior dry-run report and an unchanged-or-bumped policy, then
/// an approval sentinel.
fn check_apply_preconditions(
    plan_id: &str,
    current_policy_sha256: &str,
    current_policy_version: &str,
    paths: &ExecutorPaths<'_>,
) -> Result<(), GovernanceError> {
    let Some(prior) = load_prior_dry_run(paths.results_dir, plan_id)? else {
        return Err(GovernanceError::PlanExecutionError(
            "Apply requires a prior dry-run report for this plan.".to_string(),
        ));
    };

    if prior.policy_sha256 != current_policy_sha256 {
        if prior.policy_version == current_policy_version {
            return Err(GovernanceError::PlanExecutionError(
                "Apply blocked: policy changed without version bump.".to_string(),
            ));
        }
        return Err(GovernanceError::PlanExecutionError(
            "Apply blocked: allowlist policy changed since last dry-run bump.".to_string(),
        ));
    }

    if !approval_path(paths.approvals_dir, plan_id).exists() {
        return Err(GovernanceError::PlanExecutionError("No approval file found".to_string()));
    }

    Ok(())
}

async fn run_commands(plan: &Plan, mode: &ExecutionMode) -> Result<Vec<CommandResult>, GovernanceError> {
    let mut results = Vec::with_capacity(plan.commands.len());
    for command in &plan.commands {
        match mode {
            ExecutionMode::DryRun => results.push(CommandResult::DryRun {
                command: command.command.clone(),
                dry_run: true,
                timeout_seconds: command.timeout_seconds,
            }),
            ExecutionMode::Apply => {
                let outcome = safe_runner::run(&command.command, command.timeout_seconds).await?;
                results.push(CommandResult::Applied {
                    command: outcome.command,
                    started_at: outcome.started_at,
                    finished_at: outcome.finished_at,
                    return_code: outcome.return_code,
                    stdout: outcome.stdout,
                    stderr: outcome.stderr,
                    timeout: outcome.timeout,
                    dry_run: false,
                });
            }
        }
    }
    Ok(results)
}

fn log_failure(
    decisions_path: &Path,
    metrics_path: &Path,
    plan_id: &str,
    reason: &str,
) -> Result<(), InfrastructureError> {
    let mut event = Map::new();
    event.insert("component".to_string(), json!("executor"));
    event.insert("plan_id".to_string(), json!(plan_id));
    event.insert("allowed".to_string(), json!(false));
    event.insert("reason".to_string(), json!(reason));
    log_decision(decisions_path, event)?;
    increment_metric(metrics_path, "executor_validation_failed", 1)
}

/// The full orchestration sequence, aborting on the first failure. Every
/// abort path logs exactly one `allowed=false` decision and increments
/// `executor_validation_failed` before the error propagates.
///
/// `autonomy_enabled` only matters in apply mode: when set, Supervisor is
/// consulted at `supervisor_threshold` before the apply preconditions are
/// checked, and a block downgrades the run to a dry-run instead of failing
/// it outright.
pub async fn execute(
    plan_path: &Path,
    mode: ExecutionMode,
    autonomy_enabled: bool,
    supervisor_threshold: f64,
    paths: &ExecutorPaths<'_>,
) -> Result<ExecutionReport, GovernanceError> {
    let outcome = execute_inner(plan_path, &mode, autonomy_enabled, supervisor_threshold, paths).await;

    if let Err(e) = &outcome {
        let plan_id = plan_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("<unknown>");
        let _ = log_failure(paths.decisions_path, paths.metrics_path, plan_id, &e.to_string());
    }

    outcome
}

async fn execute_inner(
    plan_path: &Path,
    mode: &ExecutionMode,
    autonomy_enabled: bool,
    supervisor_threshold: f64,
    paths: &ExecutorPaths<'_>,
) -> Result<ExecutionReport, GovernanceError> {
    let plan = plan_validator::validate(plan_path)?;

    let plan_raw = std::fs::read_to_string(plan_path)
        .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))?;
    let plan_sha256 = sha256_hex(plan_raw.as_bytes());

    let (policy, policy_sha256) = load_policy(paths.policy_path)
        .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))?;

    let mut effective_mode = mode.clone();

    if matches!(mode, ExecutionMode::Apply) {
        if autonomy_enabled {
            let decision = supervisor::review(
                &plan.id,
                Some(plan.risk_score),
                supervisor_threshold,
                paths.decisions_path,
                paths.metrics_path,
            )
            .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))?;

            if !decision.allowed {
                effective_mode = ExecutionMode::DryRun;
            }
        }

        if matches!(effective_mode, ExecutionMode::Apply) {
            check_apply_preconditions(&plan.id, &policy_sha256, &policy.version, paths)?;
        }
    }

    for command in &plan.commands {
        if !policy.is_allowed(&command.command) {
            return Err(GovernanceError::PlanExecutionError(format!(
                "command rejected by allowlist: {}",
                command.command
            )));
        }
    }

    let results = run_commands(&plan, &effective_mode).await?;

    let report = ExecutionReport {
        plan_id: plan.id.clone(),
        schema_version: plan.schema_version.clone(),
        plan_sha256,
        policy_sha256: policy_sha256.clone(),
        policy_version: policy.version.clone(),
        executed_at: Utc::now().to_rfc3339(),
        risk_score: plan.risk_score,
        source: plan.source.clone(),
        mode: effective_mode.clone(),
        results,
    };

    atomic_write(result_path(paths.results_dir, &plan.id), serde_json::to_string_pretty(&report)?)
        .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))?;

    let ledger_report = ReportForLedger {
        plan_id: &report.plan_id,
        mode: &effective_mode.to_string(),
        plan_sha256: &report.plan_sha256,
        policy_sha256: &report.policy_sha256,
        policy_version: &report.policy_version,
        risk_score: report.risk_score,
    };
    ledger_store::append(paths.ledger_path, &ledger_report)
        .map_err(|e| GovernanceError::LedgerIntegrityError(e.to_string()))?;

    let mut event = Map::new();
    event.insert("component".to_string(), json!("executor"));
    event.insert("plan_id".to_string(), json!(report.plan_id));
    event.insert("allowed".to_string(), json!(true));
    event.insert("mode".to_string(), json!(effective_mode.to_string()));
    log_decision(paths.decisions_path, event)
        .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))?;
    increment_metric(paths.metrics_path, "executor_executed", 1)
        .map_err(|e| GovernanceError::PlanExecutionError(e.to_string()))?;

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Fixture {
        _dir: tempfile::TempDir,
        plan_path: PathBuf,
        paths_owned: (PathBuf, PathBuf, PathBuf, PathBuf, PathBuf, PathBuf),
    }

    fn write_policy(dir: &Path) -> PathBuf {
        let path = dir.join("policy.json");
        std::fs::write(&path, r#"{"version":"1","allowed_commands":["tail"]}"#).unwrap();
        path
    }

    fn write_plan(dir: &Path, id: &str, risk_score: i64) -> PathBuf {
        let path = dir.join(format!("{id}.json"));
        let body = json!({
            "schema_version": "0.1",
            "id": id,
            "created_at": "2026-01-01T00:00:00Z",
            "risk_score": risk_score,
            "source": "scan_logs",
            "commands": [
                {"type": "shell", "command": "tail -n 10 logs/curudroid.log", "timeout_seconds": 5}
            ]
        });
        std::fs::write(&path, serde_json::to_string(&body).unwrap()).unwrap();
        path
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let plan_path = write_plan(dir.path(), "plan-1", 2);
        let policy_path = write_policy(dir.path());
        let results_dir = dir.path().join("results");
        let approvals_dir = dir.path().join("approvals");
        let ledger_path = dir.path().join("ledger.log");
        let decisions_path = dir.path().join("decisions.log");
        let metrics_path = dir.path().join("metrics.json");
        Fixture {
            _dir: dir,
            plan_path,
            paths_owned: (policy_path, results_dir, approvals_dir, ledger_path, decisions_path, metrics_path),
        }
    }

    impl Fixture {
        fn paths(&self) -> ExecutorPaths<'_> {
            ExecutorPaths {
                policy_path: &self.paths_owned.0,
                results_dir: &self.paths_owned.1,
                approvals_dir: &self.paths_owned.2,
                ledger_path: &self.paths_owned.3,
                decisions_path: &self.paths_owned.4,
                metrics_path: &self.paths_owned.5,
            }
        }
    }

    #[tokio::test]
    async fn scenario_s1_happy_dry_run() {
        let fixture = fixture();
        let report = execute(&fixture.plan_path, ExecutionMode::DryRun, false, 0.4, &fixture.paths())
            .await
            .unwrap();
        assert_eq!(report.mode, ExecutionMode::DryRun);
        assert!(report.results[0].is_dry_run());

        let ledger_report = ledger_store::verify(fixture.paths().ledger_path).unwrap();
        assert_eq!(ledger_report.entries, 1);
    }

    #[tokio::test]
    async fn scenario_s3_apply_without_approval_is_refused() {
        let fixture = fixture();
        execute(&fixture.plan_path, ExecutionMode::DryRun, false, 0.4, &fixture.paths())
            .await
            .unwrap();

        let err = execute(&fixture.plan_path, ExecutionMode::Apply, false, 0.4, &fixture.paths())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No approval file found"));
    }

    #[tokio::test]
    async fn scenario_s4_policy_drifted_without_version_bump_blocks_apply() {
        let fixture = fixture();
        execute(&fixture.plan_path, ExecutionMode::DryRun, false, 0.4, &fixture.paths())
            .await
            .unwrap();

        std::fs::create_dir_all(&fixture.paths_owned.2).unwrap();
        std::fs::write(
            fixture.paths_owned.2.join("plan-1.approved"),
            "approved",
        )
        .unwrap();

        std::fs::write(
            &fixture.paths_owned.0,
            r#"{"version":"1","allowed_commands":["tail","grep"]}"#,
        )
        .unwrap();

        let err = execute(&fixture.plan_path, ExecutionMode::Apply, false, 0.4, &fixture.paths())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("policy changed without version bump"));
    }

    #[tokio::test]
    async fn unapproved_command_is_rejected_by_allowlist_defense_in_depth() {
        let fixture = fixture();
        std::fs::write(
            &fixture.paths_owned.0,
            r#"{"version":"1","allowed_commands":["grep"]}"#,
        )
        .unwrap();

        let err = execute(&fixture.plan_path, ExecutionMode::DryRun, false, 0.4, &fixture.paths())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rejected by allowlist"));
    }

    #[tokio::test]
    async fn autonomy_enabled_downgrades_a_blocked_apply_to_dry_run() {
        let dir = tempdir().unwrap();
        let plan_path = write_plan(dir.path(), "plan-risky", 5);
        let policy_path = write_policy(dir.path());
        let results_dir = dir.path().join("results");
        let approvals_dir = dir.path().join("approvals");
        let ledger_path = dir.path().join("ledger.log");
        let decisions_path = dir.path().join("decisions.log");
        let metrics_path = dir.path().join("metrics.json");
        let paths = ExecutorPaths {
            policy_path: &policy_path,
            results_dir: &results_dir,
            approvals_dir: &approvals_dir,
            ledger_path: &ledger_path,
            decisions_path: &decisions_path,
            metrics_path: &metrics_path,
        };

        // No prior dry-run report and no approval sentinel exist; a plain
        // apply would fail `check_apply_preconditions`. With autonomy
        // enabled, Supervisor blocks first (risk 0.5 > threshold 0.4) and
        // the run is downgraded before preconditions are even checked.
        let report = execute(&plan_path, ExecutionMode::Apply, true, 0.4, &paths)
            .await
            .unwrap();

        assert_eq!(report.mode, ExecutionMode::DryRun);
        assert!(report.results[0].is_dry_run());
    }
}
