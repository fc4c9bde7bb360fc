// curudroid-core/src/application/supervisor.rs

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::domain::evaluator::{evaluate, Decision};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::observability::{increment_metric, log_decision};

/// The first risk gate a plan crosses. Gates at the configured
/// `curupira_risk_threshold` directly -- unlike Curupira, it does not
/// discount the threshold.
pub fn review(
    plan_id: &str,
    risk_score: Option<i64>,
    threshold: f64,
    decisions_path: &Path,
    metrics_path: &Path,
) -> Result<Decision, InfrastructureError> {
    let decision = evaluate(risk_score, threshold, "supervisor");

    let mut event = Map::new();
    event.insert("component".to_string(), json!("supervisor"));
    event.insert("plan_id".to_string(), json!(plan_id));
    event.insert("allowed".to_string(), json!(decision.allowed));
    event.insert("reason".to_string(), json!(decision.reason));
    log_decision(decisions_path, event)?;

    let metric = if decision.allowed { "supervisor_allowed" } else { "supervisor_blocked" };
    increment_metric(metrics_path, metric, 1)?;

    Ok(decision)
}
