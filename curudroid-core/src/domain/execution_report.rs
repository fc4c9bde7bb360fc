// curudroid-core/src/domain/execution_report.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    DryRun,
    Apply,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::DryRun => write!(f, "dry-run"),
            ExecutionMode::Apply => write!(f, "apply"),
        }
    }
}

/// One entry of `ExecutionReport::results`. Dry-run and apply records have
/// deliberately different shapes -- a dry-run record never invoked the Safe
/// Runner, so it carries no process outcome.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum CommandResult {
    DryRun {
        command: String,
        dry_run: bool,
        timeout_seconds: u32,
    },
    Applied {
        command: String,
        started_at: String,
        finished_at: String,
        return_code: Option<i32>,
        stdout: String,
        stderr: String,
        timeout: bool,
        dry_run: bool,
    },
}

impl CommandResult {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, CommandResult::DryRun { .. })
    }
}

/// `{plan_id, schema_version, plan_sha256, policy_sha256, policy_version,
/// executed_at, risk_score, source, mode, results}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionReport {
    pub plan_id: String,
    pub schema_version: String,
    pub plan_sha256: String,
    pub policy_sha256: String,
    pub policy_version: String,
    pub executed_at: String,
    pub risk_score: i64,
    pub source: String,
    pub mode: ExecutionMode,
    pub results: Vec<CommandResult>,
}
