// curudroid-core/src/application/curupira.rs

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::domain::evaluator::{curupira_effective_threshold, evaluate, Decision};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::observability::{increment_metric, log_decision};

/// The second, independent risk gate. Gates at `configured_threshold *
/// 0.8`: stricter than Supervisor by design, so that Curupira blocking
/// plans Supervisor allowed is an expected outcome, not a disagreement to
/// reconcile.
pub fn review(
    plan_id: &str,
    risk_score: Option<i64>,
    configured_threshold: f64,
    decisions_path: &Path,
    metrics_path: &Path,
) -> Result<Decision, InfrastructureError> {
    let threshold = curupira_effective_threshold(configured_threshold);
    let decision = evaluate(risk_score, threshold, "curupira");

    let mut event = Map::new();
    event.insert("component".to_string(), json!("curupira"));
    event.insert("plan_id".to_string(), json!(plan_id));
    event.insert("allowed".to_string(), json!(decision.allowed));
    event.insert("reason".to_string(), json!(decision.reason));
    log_decision(decisions_path, event)?;

    let metric = if decision.allowed { "curupira_allowed" } else { "curupira_blocked" };
    increment_metric(metrics_path, metric, 1)?;

    Ok(decision)
}
