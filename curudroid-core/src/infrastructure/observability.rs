// curudroid-core/src/infrastructure/observability.rs

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{append_line, atomic_write};

/// Append one decision record. Every gate logs exactly one of these per
/// invocation. `event` carries whatever component-specific fields the
/// caller assembled; a `timestamp` is stamped on regardless of whether the
/// caller already set one.
pub fn log_decision(decisions_path: &Path, mut event: Map<String, Value>) -> Result<(), InfrastructureError> {
    event.insert(
        "timestamp".to_string(),
        Value::String(format!("{}Z", Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true))),
    );
    append_line(decisions_path, &serde_json::to_string(&Value::Object(event))?)
}

/// Current counter snapshot, tolerating a missing or corrupted file by
/// returning empty -- used by the observability-report CLI command.
pub fn load_metrics(metrics_path: &Path) -> BTreeMap<String, i64> {
    std::fs::read_to_string(metrics_path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

fn save_metrics(metrics_path: &Path, metrics: &BTreeMap<String, i64>) -> Result<(), InfrastructureError> {
    atomic_write(metrics_path, serde_json::to_string_pretty(metrics)?)
}

/// Increment a named counter, tolerating a missing or corrupted metrics
/// file by restarting from empty rather than failing the caller.
pub fn increment_metric(metrics_path: &Path, name: &str, amount: i64) -> Result<(), InfrastructureError> {
    let mut metrics = load_metrics(metrics_path);
    let current = metrics.get(name).copied().unwrap_or(0);
    metrics.insert(name.to_string(), current + amount);
    save_metrics(metrics_path, &metrics)
}

/// The most recent `limit` decision-log lines, newest last -- used by the
/// observability report CLI command.
pub fn load_last_decisions(decisions_path: &Path, limit: usize) -> Result<Vec<Value>, InfrastructureError> {
    if !decisions_path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(decisions_path)?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(limit);
    lines[start..]
        .iter()
        .map(|line| serde_json::from_str(line).map_err(InfrastructureError::from))
        .collect()
}
