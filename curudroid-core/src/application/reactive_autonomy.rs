// curudroid-core/src/application/reactive_autonomy.rs

use std::path::Path;

use chrono::Utc;
use serde_json::{json, Map};

use crate::application::ai_advisor_service::AiAdvisorService;
use crate::application::plan_validator;
use crate::application::{curupira, supervisor};
use crate::domain::intent::{Intent, IntentState};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::intent_store::IntentQueueStore;
use crate::infrastructure::observability::{increment_metric, log_decision};

/// Plans whose normalized risk exceeds this percentage are flagged even if
/// a gate allowed them. Kept as a defense-in-depth signal even though
/// `domain::plan::RISK_CEILING` already rejects any plan this extreme
/// before it reaches here.
const ANOMALY_RISK_PERCENT: f64 = 90.0;

/// Terminal outcome of one `process_next_intent` call.
#[derive(Debug, PartialEq, Eq)]
pub enum ReactiveOutcome {
    Empty,
    InvalidIntent,
    InvalidPlan,
    Blocked,
    ApprovedForDryRun,
}

fn detect_anomaly(risk_score: i64, allowed: bool) -> bool {
    allowed && (risk_score as f64 * 10.0) > ANOMALY_RISK_PERCENT
}

/// Drain exactly one pending intent, advancing it to a terminal state.
/// Any single gate block wins; both gates allowing moves the intent to
/// `approved_for_dry_run`. The AI Advisor is consulted purely for its log
/// entry -- its recommendation never participates in the decision.
pub async fn process_next_intent(
    config: &AppConfig,
    queue: &IntentQueueStore,
    decisions_path: &Path,
    metrics_path: &Path,
) -> Result<ReactiveOutcome, InfrastructureError> {
    let Some(intent) = queue.dequeue()? else {
        increment_metric(metrics_path, "reactive_empty", 1)?;
        return Ok(ReactiveOutcome::Empty);
    };

    increment_metric(metrics_path, "intents_processed", 1)?;

    if intent.validate_structure().is_err() {
        mark_terminal(queue, &intent, IntentState::Error)?;
        increment_metric(metrics_path, "reactive_invalid_intent", 1)?;
        return Ok(ReactiveOutcome::InvalidIntent);
    }

    let Some(plan) = load_referenced_plan(&intent) else {
        mark_terminal(queue, &intent, IntentState::Error)?;
        increment_metric(metrics_path, "reactive_invalid_plan", 1)?;
        return Ok(ReactiveOutcome::InvalidPlan);
    };

    let advisor = AiAdvisorService::from_config(config);
    let timestamp = Utc::now().to_rfc3339();
    let _ = advisor
        .analyze(&plan, &json!({"source": "reactive_autonomy"}), &timestamp, decisions_path)
        .await;

    let mut allowed = if config.supervisor_enabled {
        supervisor::review(
            &plan.id,
            Some(plan.risk_score),
            config.curupira_risk_threshold,
            decisions_path,
            metrics_path,
        )?
        .allowed
    } else {
        true
    };

    if allowed && config.curupira_enabled {
        let decision = curupira::review(
            &plan.id,
            Some(plan.risk_score),
            config.curupira_risk_threshold,
            decisions_path,
            metrics_path,
        )?;
        allowed = allowed && decision.allowed;
    }

    if detect_anomaly(plan.risk_score, allowed) {
        increment_metric(metrics_path, "anomaly_detected", 1)?;
    }

    if allowed {
        mark_terminal(queue, &intent, IntentState::ApprovedForDryRun)?;
        increment_metric(metrics_path, "intents_dry_run", 1)?;
        increment_metric(metrics_path, "reactive_approved", 1)?;
        Ok(ReactiveOutcome::ApprovedForDryRun)
    } else {
        mark_terminal(queue, &intent, IntentState::Blocked)?;
        increment_metric(metrics_path, "intents_blocked", 1)?;
        increment_metric(metrics_path, "reactive_blocked", 1)?;
        Ok(ReactiveOutcome::Blocked)
    }
}

fn mark_terminal(
    queue: &IntentQueueStore,
    intent: &Intent,
    state: IntentState,
) -> Result<(), InfrastructureError> {
    if let Some(id) = intent.id.as_deref() {
        queue.set_status(id, state)?;
    }
    Ok(())
}

fn load_referenced_plan(intent: &Intent) -> Option<crate::domain::plan::Plan> {
    let plan_path = intent.plan_path.as_ref()?;
    plan_validator::validate(Path::new(plan_path)).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_config(threshold: f64) -> AppConfig {
        AppConfig {
            log_level: "INFO".to_string(),
            ai_provider: "none".to_string(),
            ai_api_key: String::new(),
            ai_model: "gpt-4o-mini".to_string(),
            ai_timeout_seconds: 5.0,
            telegram_token: String::new(),
            curupira_risk_threshold: threshold,
            executor_risk_threshold: 0.4,
            log_dir: "logs".to_string(),
            data_dir: "data".to_string(),
            supervisor_enabled: true,
            curupira_enabled: true,
            autonomy_reactive_enabled: true,
            curupira_transport: "auto".to_string(),
            curupira_backend_url: String::new(),
            curupira_backend_timeout: 5.0,
            curupira_local_entrypoint: "curupira/run.py".to_string(),
        }
    }

    fn write_plan(dir: &Path, id: &str, risk_score: i64) -> String {
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
        path.to_string_lossy().to_string()
    }

    fn enqueue_intent(queue: &IntentQueueStore, plan_path: String) {
        queue
            .enqueue(Intent {
                intent: "scan_logs".to_string(),
                reason: "operator request".to_string(),
                confidence: 0.8,
                created_at: Utc::now(),
                id: None,
                priority: 1,
                status: IntentState::Pending,
                plan_path: Some(plan_path),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn empty_queue_reports_empty_outcome() {
        let dir = tempdir().unwrap();
        let queue = IntentQueueStore::new(dir.path().join("intents_queue.json"));
        let config = sample_config(0.4);

        let outcome = process_next_intent(
            &config,
            &queue,
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ReactiveOutcome::Empty);
    }

    #[tokio::test]
    async fn scenario_s6_both_gates_block() {
        let dir = tempdir().unwrap();
        let queue = IntentQueueStore::new(dir.path().join("intents_queue.json"));
        let plan_path = write_plan(dir.path(), "plan-s6", 6);
        enqueue_intent(&queue, plan_path);
        let config = sample_config(0.4);

        let outcome = process_next_intent(
            &config,
            &queue,
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ReactiveOutcome::Blocked);
    }

    #[tokio::test]
    async fn low_risk_plan_is_approved_for_dry_run() {
        let dir = tempdir().unwrap();
        let queue = IntentQueueStore::new(dir.path().join("intents_queue.json"));
        let plan_path = write_plan(dir.path(), "plan-low", 1);
        enqueue_intent(&queue, plan_path);
        let config = sample_config(0.5);

        let outcome = process_next_intent(
            &config,
            &queue,
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ReactiveOutcome::ApprovedForDryRun);
    }

    #[tokio::test]
    async fn disabled_gates_auto_allow_a_plan_that_would_otherwise_block() {
        let dir = tempdir().unwrap();
        let queue = IntentQueueStore::new(dir.path().join("intents_queue.json"));
        let plan_path = write_plan(dir.path(), "plan-gates-off", 5);
        enqueue_intent(&queue, plan_path);
        let mut config = sample_config(0.4);
        config.supervisor_enabled = false;
        config.curupira_enabled = false;

        let outcome = process_next_intent(
            &config,
            &queue,
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ReactiveOutcome::ApprovedForDryRun);
    }

    #[tokio::test]
    async fn missing_plan_path_is_invalid_plan() {
        let dir = tempdir().unwrap();
        let queue = IntentQueueStore::new(dir.path().join("intents_queue.json"));
        queue
            .enqueue(Intent {
                intent: "scan_logs".to_string(),
                reason: "operator request".to_string(),
                confidence: 0.8,
                created_at: Utc::now(),
                id: None,
                priority: 1,
                status: IntentState::Pending,
                plan_path: None,
            })
            .unwrap();
        let config = sample_config(0.4);

        let outcome = process_next_intent(
            &config,
            &queue,
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ReactiveOutcome::InvalidPlan);
    }
}
