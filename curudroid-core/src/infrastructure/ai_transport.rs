// curudroid-core/src/infrastructure/ai_transport.rs

use std::time::Duration;

use serde_json::Value;

use crate::infrastructure::error::InfrastructureError;

/// A consultative backend for the AI Advisor. `recommend` returns raw,
/// unnormalized provider JSON -- normalization happens in
/// `domain::ai_advisor::normalize`, which this layer never touches.
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    fn provider_name(&self) -> &str;
    fn model_name(&self) -> &str;
    async fn recommend(&self, plan: &Value, context: &Value) -> Result<Option<Value>, InfrastructureError>;
}

/// The `AI_PROVIDER=none` backend: always silent, never logs. When the
/// configured provider is `none` the advisor returns nothing and must not
/// log.
pub struct NullProvider;

#[async_trait::async_trait]
impl AiProvider for NullProvider {
    fn provider_name(&self) -> &str {
        "none"
    }

    fn model_name(&self) -> &str {
        "null"
    }

    async fn recommend(&self, _plan: &Value, _context: &Value) -> Result<Option<Value>, InfrastructureError> {
        Ok(None)
    }
}

/// `AI_PROVIDER=openai`: a single-turn consultative request. The system
/// prompt explicitly forbids suggesting direct execution commands --
/// enforced by prompt, not by this crate.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    timeout_seconds: f64,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, timeout_seconds: f64) -> Self {
        OpenAiProvider {
            api_key,
            model,
            timeout_seconds: timeout_seconds.clamp(0.5, 30.0),
        }
    }
}

#[async_trait::async_trait]
impl AiProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn recommend(&self, plan: &Value, context: &Value) -> Result<Option<Value>, InfrastructureError> {
        if self.api_key.is_empty() {
            return Ok(None);
        }

        let payload = serde_json::json!({
            "model": self.model,
            "input": [
                {
                    "role": "system",
                    "content": [{
                        "type": "input_text",
                        "text": "You are a consultative safety advisor. Never suggest direct \
                                 execution commands. Respond only in JSON with keys: \
                                 suggested_action, risk_assessment, confidence, explanation.",
                    }],
                },
                {
                    "role": "user",
                    "content": [{
                        "type": "input_text",
                        "text": serde_json::json!({"plan": plan, "context": context}).to_string(),
                    }],
                },
            ],
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(self.timeout_seconds))
            .build()
            .map_err(|e| InfrastructureError::BackendUnavailable(e.to_string()))?;

        let response = client
            .post("https://api.openai.com/v1/responses")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| InfrastructureError::BackendUnavailable(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| InfrastructureError::BackendUnavailable(e.to_string()))?;

        let output = body.get("output").and_then(Value::as_array);
        let Some(output) = output else {
            return Ok(None);
        };

        for item in output {
            let Some(contents) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for content in contents {
                if let Some(text) = content.get("text").and_then(Value::as_str) {
                    let parsed: Value = serde_json::from_str(text)?;
                    if !parsed.is_object() {
                        return Err(InfrastructureError::BackendUnavailable(
                            "AI response must be a JSON object".to_string(),
                        ));
                    }
                    return Ok(Some(parsed));
                }
            }
        }

        Ok(None)
    }
}
