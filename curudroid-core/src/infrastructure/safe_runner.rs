// curudroid-core/src/infrastructure/safe_runner.rs

use std::time::Duration;

use chrono::Utc;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout as tokio_timeout;

use crate::domain::error::GovernanceError;

/// Raw outcome of one subprocess invocation, pre-`dry_run` tagging.
/// `application::executor` is the one that decides whether this becomes
/// `CommandResult::Applied`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub command: String,
    pub started_at: String,
    pub finished_at: String,
    pub return_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timeout: bool,
}

/// Tokenize on whitespace and spawn the child process directly -- never via
/// a shell -- capturing stdout/stderr and enforcing a wall-clock timeout.
pub async fn run(command: &str, timeout_seconds: u32) -> Result<RunOutcome, GovernanceError> {
    let tokens: Vec<&str> = command.split_whitespace().collect();
    let Some((program, args)) = tokens.split_first() else {
        return Err(GovernanceError::CommandExecutionError(
            "command must contain at least one token".to_string(),
        ));
    };

    let started_at = Utc::now().to_rfc3339();

    let spawn_result = TokioCommand::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    match tokio_timeout(Duration::from_secs(timeout_seconds as u64), spawn_result).await {
        Ok(Ok(output)) => Ok(RunOutcome {
            command: command.to_string(),
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            return_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            timeout: false,
        }),
        Ok(Err(e)) => Err(GovernanceError::CommandExecutionError(e.to_string())),
        Err(_elapsed) => Ok(RunOutcome {
            command: command.to_string(),
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            return_code: None,
            stdout: String::new(),
            stderr: "Execution timed out".to_string(),
            timeout: true,
        }),
    }
}
