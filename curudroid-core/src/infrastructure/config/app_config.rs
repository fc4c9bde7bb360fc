// curudroid-core/src/infrastructure/config/app_config.rs

use std::env;

const ALLOWED_LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

pub const DEFAULT_CURUPIRA_RISK_THRESHOLD: f64 = 0.4;
pub const DEFAULT_EXECUTOR_RISK_THRESHOLD: f64 = 0.4;
pub const DEFAULT_SUPERVISOR_ENABLED: bool = true;
pub const DEFAULT_CURUPIRA_ENABLED: bool = true;
pub const DEFAULT_AUTONOMY_REACTIVE_ENABLED: bool = false;
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_TIMEOUT_SECONDS: f64 = 5.0;

/// Conservative, fully environment-derived runtime configuration. Loaded
/// once at startup and threaded through as an immutable value -- never a
/// global.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub ai_provider: String,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_timeout_seconds: f64,
    pub telegram_token: String,
    pub curupira_risk_threshold: f64,
    pub executor_risk_threshold: f64,
    pub log_dir: String,
    pub data_dir: String,
    pub supervisor_enabled: bool,
    pub curupira_enabled: bool,
    pub autonomy_reactive_enabled: bool,

    /// `"auto" | "http" | "subprocess"`.
    pub curupira_transport: String,
    pub curupira_backend_url: String,
    pub curupira_backend_timeout: f64,
    pub curupira_local_entrypoint: String,
}

fn read_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn read_float(name: &str, default: f64) -> f64 {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<f64>().unwrap_or(default),
        _ => default,
    }
}

fn read_float_clamped(name: &str, default: f64, min: f64, max: f64) -> f64 {
    read_float(name, default).clamp(min, max)
}

fn read_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

impl AppConfig {
    /// Read every variable with a conservative default; never fails -- an
    /// unparsable value silently falls back to the default instead.
    pub fn load() -> Self {
        AppConfig {
            log_level: read_string("LOG_LEVEL", "INFO").to_uppercase(),
            ai_provider: read_string("AI_PROVIDER", "none").to_lowercase(),
            ai_api_key: read_string("AI_API_KEY", ""),
            ai_model: read_string("AI_MODEL", DEFAULT_AI_MODEL),
            ai_timeout_seconds: read_float_clamped(
                "AI_TIMEOUT_SECONDS",
                DEFAULT_AI_TIMEOUT_SECONDS,
                0.5,
                30.0,
            ),
            telegram_token: read_string("TELEGRAM_TOKEN", ""),
            curupira_risk_threshold: read_float(
                "CURUPIRA_RISK_THRESHOLD",
                DEFAULT_CURUPIRA_RISK_THRESHOLD,
            ),
            executor_risk_threshold: read_float(
                "EXECUTOR_RISK_THRESHOLD",
                DEFAULT_EXECUTOR_RISK_THRESHOLD,
            ),
            log_dir: read_string("LOG_DIR", "logs"),
            data_dir: read_string("DATA_DIR", "data"),
            supervisor_enabled: read_bool("SUPERVISOR_ENABLED", DEFAULT_SUPERVISOR_ENABLED),
            curupira_enabled: read_bool("CURUPIRA_ENABLED", DEFAULT_CURUPIRA_ENABLED),
            autonomy_reactive_enabled: read_bool(
                "AUTONOMY_REACTIVE_ENABLED",
                DEFAULT_AUTONOMY_REACTIVE_ENABLED,
            ),
            curupira_transport: read_string("CURUPIRA_TRANSPORT", "auto").to_lowercase(),
            curupira_backend_url: read_string("CURUPIRA_BACKEND_URL", "")
                .trim_end_matches('/')
                .to_string(),
            curupira_backend_timeout: read_float("CURUPIRA_BACKEND_TIMEOUT", 5.0),
            curupira_local_entrypoint: read_string(
                "CURUPIRA_LOCAL_ENTRYPOINT",
                "curupira/run.py",
            ),
        }
    }

    /// Split diagnostics: errors can break the core, warnings describe
    /// optional integrations left unconfigured.
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !ALLOWED_LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!("invalid LOG_LEVEL: {}", self.log_level));
        }

        if !(0.0..=1.0).contains(&self.curupira_risk_threshold) {
            errors.push(
                "invalid CURUPIRA_RISK_THRESHOLD: expected a value between 0.0 and 1.0"
                    .to_string(),
            );
        }

        if !(0.0..=1.0).contains(&self.executor_risk_threshold) {
            errors.push(
                "invalid EXECUTOR_RISK_THRESHOLD: expected a value between 0.0 and 1.0"
                    .to_string(),
            );
        }

        if matches!(self.ai_provider.as_str(), "none" | "" | "disabled" | "off") {
            warnings.push("AI: disabled (AI_PROVIDER not configured)".to_string());
        } else if self.ai_api_key.is_empty() {
            warnings.push(format!(
                "AI: disabled (AI_API_KEY missing for provider '{}')",
                self.ai_provider
            ));
        }

        if self.telegram_token.is_empty() {
            warnings.push("Telegram: disabled (TELEGRAM_TOKEN missing)".to_string());
        }

        if self.curupira_transport == "http" && self.curupira_backend_url.is_empty() {
            warnings.push("CURUPIRA_BACKEND_URL absent: http transport has no backend".to_string());
        }

        (errors, warnings)
    }
}

/// Redact a secret for logs: empty becomes `(absent)`, short values collapse
/// to `***`, longer ones keep a 3-char prefix and 2-char suffix.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return "(absent)".to_string();
    }
    if value.len() <= 6 {
        return "***".to_string();
    }
    format!("{}***{}", &value[..3], &value[value.len() - 2..])
}

pub fn config_summary(config: &AppConfig) -> String {
    format!(
        "Config: LOG_LEVEL={}, AI_PROVIDER={}, AI_API_KEY={}, AI_MODEL={}, TELEGRAM_TOKEN={}, \
         CURUPIRA_RISK_THRESHOLD={}, EXECUTOR_RISK_THRESHOLD={}, LOG_DIR={}, DATA_DIR={}",
        config.log_level,
        config.ai_provider,
        mask_secret(&config.ai_api_key),
        config.ai_model,
        mask_secret(&config.telegram_token),
        config.curupira_risk_threshold,
        config.executor_risk_threshold,
        config.log_dir,
        config.data_dir,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_secret_handles_empty_and_short_values() {
        assert_eq!(mask_secret(""), "(absent)");
        assert_eq!(mask_secret("abcdef"), "***");
    }

    #[test]
    fn mask_secret_keeps_prefix_and_suffix_for_long_values() {
        assert_eq!(mask_secret("sk-abcdefgh12"), "sk-***12");
    }

    #[test]
    fn validate_flags_out_of_range_threshold() {
        let config = AppConfig {
            log_level: "INFO".to_string(),
            ai_provider: "none".to_string(),
            ai_api_key: String::new(),
            ai_model: "gpt-4o-mini".to_string(),
            ai_timeout_seconds: 5.0,
            telegram_token: String::new(),
            curupira_risk_threshold: 1.4,
            executor_risk_threshold: 0.4,
            log_dir: "logs".to_string(),
            data_dir: "data".to_string(),
            supervisor_enabled: true,
            curupira_enabled: true,
            autonomy_reactive_enabled: false,
            curupira_transport: "auto".to_string(),
            curupira_backend_url: String::new(),
            curupira_backend_timeout: 5.0,
            curupira_local_entrypoint: "curupira/run.py".to_string(),
        };
        let (errors, _warnings) = config.validate();
        assert!(errors.iter().any(|e| e.contains("CURUPIRA_RISK_THRESHOLD")));
    }

    #[test]
    fn validate_warns_about_missing_integrations() {
        let config = AppConfig {
            log_level: "INFO".to_string(),
            ai_provider: "none".to_string(),
            ai_api_key: String::new(),
            ai_model: "gpt-4o-mini".to_string(),
            ai_timeout_seconds: 5.0,
            telegram_token: String::new(),
            curupira_risk_threshold: 0.4,
            executor_risk_threshold: 0.4,
            log_dir: "logs".to_string(),
            data_dir: "data".to_string(),
            supervisor_enabled: true,
            curupira_enabled: true,
            autonomy_reactive_enabled: false,
            curupira_transport: "auto".to_string(),
            curupira_backend_url: String::new(),
            curupira_backend_timeout: 5.0,
            curupira_local_entrypoint: "curupira/run.py".to_string(),
        };
        let (errors, warnings) = config.validate();
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 2);
    }
}
