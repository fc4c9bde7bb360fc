// curudroid-core/src/application/plan_generator.rs

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::application::plugin_registry::PluginKind;
use crate::domain::plan::{risk_score_from_estimate, Command, CommandType, Plan, SCHEMA_VERSION};
use crate::domain::plugin::{validate_contract, PluginCommand};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::curupira_transport::{consult, CurupiraOpinion};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::intent_store::latest_approved_intent;
use crate::infrastructure::observability::{increment_metric, log_decision};

const DEFAULT_COMMAND_TIMEOUT_SECONDS: u32 = 10;

/// Result of one plan-generation pass: either a generated plan, or a
/// deny-by-default rejection. Both variants persist an artifact pair so
/// the outcome is auditable either way.
pub struct GeneratedArtifact {
    pub plan: Plan,
    pub json_path: PathBuf,
    pub plan_path: PathBuf,
    pub rejected: bool,
    pub curupira_opinion: Option<CurupiraOpinion>,
}

fn command_from_argv(argv: &PluginCommand) -> Command {
    Command {
        kind: CommandType::Shell,
        command: argv.argv.join(" "),
        timeout_seconds: DEFAULT_COMMAND_TIMEOUT_SECONDS,
    }
}

/// Drop commands that fail structural validation (forbidden chars/
/// substrings, oversized timeout) rather than let the Plan Generator
/// propose something the Executor would refuse outright. Each dropped
/// command is recorded, not silently discarded.
fn normalize_commands(raw_commands: &[PluginCommand]) -> (Vec<Command>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut warnings = Vec::new();

    for plugin_command in raw_commands {
        let candidate = command_from_argv(plugin_command);
        match candidate.validate_structure() {
            Ok(()) => accepted.push(candidate),
            Err(e) => warnings.push(format!(
                "dropped unsafe command '{}': {e}",
                candidate.command
            )),
        }
    }

    (accepted, warnings)
}

fn plan_text(plan: &Plan) -> String {
    let mut lines = vec![
        format!("Plan {}", plan.id),
        format!("source: {}", plan.source),
        format!("risk_score: {}", plan.risk_score),
        format!("created_at: {}", plan.created_at),
        "commands:".to_string(),
    ];
    for command in &plan.commands {
        lines.push(format!("  - {} (timeout {}s)", command.command, command.timeout_seconds));
    }
    lines.join("\n")
}

fn write_artifact_pair(plans_dir: &Path, plan: &Plan) -> Result<(PathBuf, PathBuf), InfrastructureError> {
    let json_path = plans_dir.join(format!("{}.json", plan.id));
    let plan_path = plans_dir.join(format!("{}.plan", plan.id));
    atomic_write(&json_path, serde_json::to_string_pretty(plan)?)?;
    atomic_write(&plan_path, plan_text(plan))?;
    Ok((json_path, plan_path))
}

/// Generate a plan for the most recently approved intent, or produce a
/// deny-by-default REJECTED artifact when no plugin matches. Returns
/// `Ok(None)` only when there is no approved intent to act on at all.
pub async fn generate_plan(
    config: &AppConfig,
    approved_dir: &Path,
    plans_dir: &Path,
    decisions_path: &Path,
    metrics_path: &Path,
) -> Result<Option<GeneratedArtifact>, InfrastructureError> {
    let Some((_intent_path, intent)) = latest_approved_intent(approved_dir)? else {
        return Ok(None);
    };

    let timestamp = Utc::now().to_rfc3339();
    let plan_id = format!("{}_{}", timestamp.replace([':', '-'], "").replace('.', ""), intent.intent);

    let plugin = PluginKind::from_intent_name(&intent.intent);

    let (commands, risk_estimate, mut warnings, rejected_reason) = match plugin {
        None => (Vec::new(), 0.0, Vec::new(), Some("no plugin registered for intent".to_string())),
        Some(kind) => {
            let result = kind.as_plugin().run(&intent);
            if let Err(e) = validate_contract(&result) {
                (Vec::new(), 0.0, Vec::new(), Some(format!("plugin contract violation: {e}")))
            } else {
                let (commands, warnings) = normalize_commands(&result.commands);
                let mut assumptions = result.assumptions.clone();
                assumptions.extend(warnings.clone());
                if commands.is_empty() {
                    (
                        Vec::new(),
                        result.risk_estimate,
                        assumptions,
                        Some("no commands survived safety normalization".to_string()),
                    )
                } else if result.risk_estimate > config.executor_risk_threshold {
                    (
                        commands,
                        result.risk_estimate,
                        assumptions,
                        Some(format!(
                            "risk_estimate above threshold ({} > {})",
                            result.risk_estimate, config.executor_risk_threshold
                        )),
                    )
                } else {
                    (commands, result.risk_estimate, assumptions, None)
                }
            }
        }
    };

    let rejected = rejected_reason.is_some();
    if let Some(reason) = &rejected_reason {
        warnings.push(reason.clone());
    }
    let commands = if rejected { Vec::new() } else { commands };

    let plan = Plan {
        schema_version: SCHEMA_VERSION.to_string(),
        id: plan_id.clone(),
        created_at: timestamp.clone(),
        risk_score: risk_score_from_estimate(risk_estimate) as i64,
        source: intent.intent.clone(),
        commands,
    };

    let (json_path, plan_path) = write_artifact_pair(plans_dir, &plan)?;

    let curupira_opinion = if !rejected && risk_estimate >= config.curupira_risk_threshold {
        let context = json!({"plan_id": plan.id, "risk_estimate": risk_estimate});
        Some(consult(config, &intent.intent, &context).await)
    } else {
        None
    };

    let mut event = Map::new();
    event.insert("component".to_string(), json!("plan_generator"));
    event.insert("plan_id".to_string(), json!(plan.id));
    event.insert("status".to_string(), json!(if rejected { "rejected" } else { "generated" }));
    event.insert("risk_estimate".to_string(), json!(risk_estimate));
    if !warnings.is_empty() {
        event.insert("assumptions".to_string(), json!(warnings));
    }
    if let Some(opinion) = &curupira_opinion {
        event.insert("curupira_status".to_string(), json!(opinion.status));
    }
    log_decision(decisions_path, event)?;

    let metric = if rejected { "plan_generator_rejected" } else { "plan_generator_generated" };
    increment_metric(metrics_path, metric, 1)?;

    Ok(Some(GeneratedArtifact {
        plan,
        json_path,
        plan_path,
        rejected,
        curupira_opinion,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::intent::{Intent, IntentState};
    use tempfile::tempdir;

    fn sample_config() -> AppConfig {
        AppConfig {
            log_level: "INFO".to_string(),
            ai_provider: "none".to_string(),
            ai_api_key: String::new(),
            ai_model: "gpt-4o-mini".to_string(),
            ai_timeout_seconds: 5.0,
            telegram_token: String::new(),
            curupira_risk_threshold: 0.9,
            executor_risk_threshold: 0.9,
            log_dir: "logs".to_string(),
            data_dir: "data".to_string(),
            supervisor_enabled: true,
            curupira_enabled: true,
            autonomy_reactive_enabled: false,
            curupira_transport: "auto".to_string(),
            curupira_backend_url: String::new(),
            curupira_backend_timeout: 5.0,
            curupira_local_entrypoint: "curupira/run.py".to_string(),
        }
    }

    fn write_intent(dir: &Path, filename: &str, intent_name: &str) {
        let intent = Intent {
            intent: intent_name.to_string(),
            reason: "operator request".to_string(),
            confidence: 0.8,
            created_at: Utc::now(),
            id: Some("intent_1".to_string()),
            priority: 1,
            status: IntentState::Approved,
            plan_path: None,
        };
        std::fs::write(dir.join(filename), serde_json::to_string(&intent).unwrap()).unwrap();
    }

    #[tokio::test]
    async fn no_approved_intent_yields_none() {
        let dir = tempdir().unwrap();
        let config = sample_config();
        let result = generate_plan(
            &config,
            &dir.path().join("approved"),
            &dir.path().join("plans"),
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn known_intent_generates_a_plan_artifact_pair() {
        let dir = tempdir().unwrap();
        let approved = dir.path().join("approved");
        std::fs::create_dir_all(&approved).unwrap();
        write_intent(&approved, "20260101T000000.json", "scan_logs");

        let config = sample_config();
        let artifact = generate_plan(
            &config,
            &approved,
            &dir.path().join("plans"),
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(!artifact.rejected);
        assert!(artifact.json_path.exists());
        assert!(artifact.plan_path.exists());
        assert_eq!(artifact.plan.source, "scan_logs");
        assert!(!artifact.plan.commands.is_empty());
    }

    #[tokio::test]
    async fn unknown_intent_is_rejected_by_default() {
        let dir = tempdir().unwrap();
        let approved = dir.path().join("approved");
        std::fs::create_dir_all(&approved).unwrap();
        write_intent(&approved, "20260101T000000.json", "reboot_host");

        let config = sample_config();
        let artifact = generate_plan(
            &config,
            &approved,
            &dir.path().join("plans"),
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(artifact.rejected);
        assert!(artifact.plan.commands.is_empty());
    }

    #[tokio::test]
    async fn summarize_logs_python_command_is_dropped_by_allowlist_not_structure() {
        // `python -m ai.curupira_adapter` passes structural validation;
        // rejection happens one layer up, at the Policy allowlist, which
        // this generator does not consult.
        let dir = tempdir().unwrap();
        let approved = dir.path().join("approved");
        std::fs::create_dir_all(&approved).unwrap();
        write_intent(&approved, "20260101T000000.json", "summarize_logs");

        let config = sample_config();
        let artifact = generate_plan(
            &config,
            &approved,
            &dir.path().join("plans"),
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(!artifact.rejected);
        assert!(artifact
            .plan
            .commands
            .iter()
            .any(|c| c.command.starts_with("python")));
    }

    #[tokio::test]
    async fn risk_estimate_above_executor_threshold_is_rejected() {
        let dir = tempdir().unwrap();
        let approved = dir.path().join("approved");
        std::fs::create_dir_all(&approved).unwrap();
        write_intent(&approved, "20260101T000000.json", "summarize_logs");

        let mut config = sample_config();
        config.executor_risk_threshold = 0.3;
        let artifact = generate_plan(
            &config,
            &approved,
            &dir.path().join("plans"),
            &dir.path().join("decisions.log"),
            &dir.path().join("metrics.json"),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(artifact.rejected);
        assert!(artifact.plan.commands.is_empty());
    }
}
