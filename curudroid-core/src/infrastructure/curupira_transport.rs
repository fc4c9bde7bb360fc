// curudroid-core/src/infrastructure/curupira_transport.rs

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command as TokioCommand;

use crate::infrastructure::config::AppConfig;

/// Normalized outcome of consulting Curupira, regardless of transport.
/// Always advisory: the caller decides what, if anything, to do with it.
#[derive(Debug, Serialize, Clone)]
pub struct CurupiraOpinion {
    pub intent: String,
    pub reason: String,
    pub confidence: f64,
    pub source: String,
    pub status: String,
    pub ts: String,
}

#[derive(Debug, Deserialize)]
struct BackendResponse {
    response: Option<String>,
    confidence: Option<f64>,
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn unavailable(intent: &str, reason: String) -> CurupiraOpinion {
    CurupiraOpinion {
        intent: intent.to_string(),
        reason,
        confidence: 0.0,
        source: "curupira".to_string(),
        status: "backend_unavailable".to_string(),
        ts: now(),
    }
}

/// Dispatch to `auto`/`http`/`subprocess` as configured; `auto` tries the
/// HTTP backend first and falls back to the local subprocess only when the
/// backend is unavailable.
pub async fn consult(config: &AppConfig, intent: &str, context: &Value) -> CurupiraOpinion {
    match config.curupira_transport.as_str() {
        "http" => run_http(config, intent, context).await,
        "subprocess" => run_subprocess(config, intent, context).await,
        _ => {
            let http_result = run_http(config, intent, context).await;
            if http_result.status == "backend_unavailable" {
                run_subprocess(config, intent, context).await
            } else {
                http_result
            }
        }
    }
}

async fn run_http(config: &AppConfig, intent: &str, context: &Value) -> CurupiraOpinion {
    if config.curupira_backend_url.is_empty() {
        return unavailable(intent, "CURUPIRA_BACKEND_URL absent".to_string());
    }

    let payload = serde_json::json!({
        "user_id": "curudroid",
        "message": intent,
        "context": context,
    });

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs_f64(config.curupira_backend_timeout.max(0.5)))
        .build()
    {
        Ok(client) => client,
        Err(e) => return unavailable(intent, format!("failed to build HTTP client: {e}")),
    };

    let response = client
        .post(format!("{}/api/message", config.curupira_backend_url))
        .json(&payload)
        .send()
        .await;

    let response = match response {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            return CurupiraOpinion {
                intent: intent.to_string(),
                reason: format!("HTTP error from Curupira backend: {}", r.status()),
                confidence: 0.0,
                source: "curupira".to_string(),
                status: "backend_error".to_string(),
                ts: now(),
            }
        }
        Err(e) => return unavailable(intent, format!("failed to connect to Curupira backend: {e}")),
    };

    match response.json::<BackendResponse>().await {
        Ok(parsed) => CurupiraOpinion {
            intent: intent.to_string(),
            reason: parsed.response.unwrap_or_else(|| "no backend response".to_string()),
            confidence: parsed.confidence.unwrap_or(0.6),
            source: "curupira".to_string(),
            status: "backend_response".to_string(),
            ts: now(),
        },
        Err(_) => CurupiraOpinion {
            intent: intent.to_string(),
            reason: "invalid JSON from Curupira backend".to_string(),
            confidence: 0.2,
            source: "curupira".to_string(),
            status: "backend_invalid_json".to_string(),
            ts: now(),
        },
    }
}

async fn run_subprocess(config: &AppConfig, intent: &str, context: &Value) -> CurupiraOpinion {
    let stdin_payload = match serde_json::to_string(context) {
        Ok(s) => s,
        Err(e) => return unavailable(intent, format!("failed to encode context: {e}")),
    };

    let output = tokio::time::timeout(Duration::from_secs(30), async {
        use tokio::io::AsyncWriteExt;
        let mut child = TokioCommand::new("python")
            .arg(&config.curupira_local_entrypoint)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(stdin_payload.as_bytes()).await?;
        }

        child.wait_with_output().await
    })
    .await;

    let output = match output {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return CurupiraOpinion {
                intent: intent.to_string(),
                reason: format!(
                    "failed to execute local Curupira ({}): {e}",
                    config.curupira_local_entrypoint
                ),
                confidence: 0.0,
                source: "curupira".to_string(),
                status: "execution_error".to_string(),
                ts: now(),
            }
        }
        Err(_elapsed) => {
            return CurupiraOpinion {
                intent: intent.to_string(),
                reason: "local Curupira invocation timed out".to_string(),
                confidence: 0.0,
                source: "curupira".to_string(),
                status: "execution_error".to_string(),
                ts: now(),
            }
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return CurupiraOpinion {
            intent: intent.to_string(),
            reason: if stderr.is_empty() {
                "unknown Curupira error".to_string()
            } else {
                stderr
            },
            confidence: 0.0,
            source: "curupira".to_string(),
            status: "runtime_error".to_string(),
            ts: now(),
        };
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        return CurupiraOpinion {
            intent: intent.to_string(),
            reason: "Curupira emitted no explicit response".to_string(),
            confidence: 0.0,
            source: "curupira".to_string(),
            status: "no_opinion".to_string(),
            ts: now(),
        };
    }

    match serde_json::from_str::<Value>(&stdout) {
        Ok(Value::Object(mut map)) => {
            map.entry("source").or_insert_with(|| Value::String("curupira".to_string()));
            map.entry("status").or_insert_with(|| Value::String("json_response".to_string()));
            map.insert("ts".to_string(), Value::String(now()));
            let confidence = map.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
            CurupiraOpinion {
                intent: intent.to_string(),
                reason: map
                    .get("reason")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                confidence,
                source: "curupira".to_string(),
                status: map
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("json_response")
                    .to_string(),
                ts: now(),
            }
        }
        _ => {
            let truncated: String = stdout.chars().take(800).collect();
            CurupiraOpinion {
                intent: intent.to_string(),
                reason: truncated,
                confidence: 0.2,
                source: "curupira".to_string(),
                status: "text_response".to_string(),
                ts: now(),
            }
        }
    }
}
