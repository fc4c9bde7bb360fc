// curudroid-core/src/application/ai_advisor_service.rs

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::domain::ai_advisor::{normalize, AiRecommendation, RawAdvisorResponse};
use crate::domain::plan::Plan;
use crate::domain::policy::sha256_hex;
use crate::infrastructure::ai_transport::{AiProvider, NullProvider, OpenAiProvider};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::observability::log_decision;

/// Orchestrates one consultative round-trip: select a provider from config,
/// build a sanitized context, call the provider, normalize the result, and
/// log exactly one outcome. Never changes a decision; a caller that
/// ignores the return value still gets a correctly governed plan.
pub struct AiAdvisorService {
    provider: Arc<dyn AiProvider>,
}

impl AiAdvisorService {
    /// Select `NullProvider` for `ai_provider=none` (or any unrecognized
    /// value) and `OpenAiProvider` for `ai_provider=openai`.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider: Arc<dyn AiProvider> = match config.ai_provider.as_str() {
            "openai" => Arc::new(OpenAiProvider::new(
                config.ai_api_key.clone(),
                config.ai_model.clone(),
                config.ai_timeout_seconds,
            )),
            _ => Arc::new(NullProvider),
        };
        AiAdvisorService { provider }
    }

    /// Drop fields an advisory consultation never needs to see beyond plan
    /// identity and shape: no raw command strings leave the host.
    fn sanitize_plan(plan: &Plan) -> Value {
        json!({
            "id": plan.id,
            "source": plan.source,
            "risk_score": plan.risk_score,
            "command_count": plan.commands.len(),
        })
    }

    fn sanitize_context(context: &Value) -> Value {
        match context {
            Value::Object(map) => {
                let mut sanitized = Map::new();
                for (key, value) in map {
                    if key != "api_key" && key != "token" && key != "secret" {
                        sanitized.insert(key.clone(), value.clone());
                    }
                }
                Value::Object(sanitized)
            }
            other => other.clone(),
        }
    }

    /// A stable identity for the consulted context, recorded in the decision
    /// log so repeated identical consultations are recognizable without
    /// storing the payload twice.
    fn stable_hash(plan: &Value, context: &Value) -> String {
        let combined = serde_json::to_string(&json!({"plan": plan, "context": context}))
            .unwrap_or_default();
        sha256_hex(combined.as_bytes())
    }

    /// Build the context passed to the provider and log the consultation's
    /// outcome (`status` one of `success`, `no_recommendation`, `error`).
    /// The advisory result is returned to the caller for logging or display
    /// only -- the pipeline's `allowed`/`blocked` outcome never reads it.
    pub async fn analyze(
        &self,
        plan: &Plan,
        context: &Value,
        timestamp: &str,
        decisions_path: &Path,
    ) -> Result<Option<AiRecommendation>, InfrastructureError> {
        if self.provider.provider_name() == "none" {
            return Ok(None);
        }

        let sanitized_plan = Self::sanitize_plan(plan);
        let sanitized_context = Self::sanitize_context(context);
        let context_hash = Self::stable_hash(&sanitized_plan, &sanitized_context);

        let mut event = Map::new();
        event.insert("component".to_string(), json!("ai_advisor"));
        event.insert("plan_id".to_string(), json!(plan.id));
        event.insert("provider".to_string(), json!(self.provider.provider_name()));
        event.insert("context_hash".to_string(), json!(context_hash));

        let outcome = self.provider.recommend(&sanitized_plan, &sanitized_context).await;

        let recommendation = match outcome {
            Ok(Some(raw_value)) => {
                let raw: RawAdvisorResponse = serde_json::from_value(raw_value).unwrap_or_default();
                let recommendation =
                    normalize(raw, self.provider.provider_name(), self.provider.model_name(), timestamp);
                event.insert("status".to_string(), json!("success"));
                event.insert(
                    "suggested_action".to_string(),
                    serde_json::to_value(recommendation.suggested_action).unwrap_or(Value::Null),
                );
                Some(recommendation)
            }
            Ok(None) => {
                event.insert("status".to_string(), json!("no_recommendation"));
                None
            }
            Err(error) => {
                event.insert("status".to_string(), json!("error"));
                event.insert("error".to_string(), json!(error.to_string()));
                None
            }
        };

        log_decision(decisions_path, event)?;
        Ok(recommendation)
    }
}
