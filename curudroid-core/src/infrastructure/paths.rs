// curudroid-core/src/infrastructure/paths.rs

use std::path::{Path, PathBuf};

/// Every persisted-state location the runtime touches, all relative to the
/// process working directory. `AppConfig::log_dir`/`data_dir` govern only
/// the log and metrics/queue/lock destinations named after them; the rest
/// of the tree stays at fixed relative paths.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub policy_path: PathBuf,
    pub policy_lock_path: PathBuf,
    pub metrics_path: PathBuf,
    pub intents_queue_path: PathBuf,
    pub decisions_path: PathBuf,
    pub ledger_path: PathBuf,
    pub intents_dir: PathBuf,
    pub approved_dir: PathBuf,
    pub rejected_dir: PathBuf,
    pub plans_dir: PathBuf,
    pub approvals_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl RuntimePaths {
    /// Root everything at `base` (the process cwd in production, a temp dir
    /// in tests). Keeps the relative layout of the original source intact
    /// while making it possible to sandbox a whole run.
    pub fn rooted_at(base: &Path) -> Self {
        RuntimePaths {
            policy_path: base.join("core/policy/allowlist.json"),
            policy_lock_path: base.join("data/policy_lock.json"),
            metrics_path: base.join("data/autonomy_metrics.json"),
            intents_queue_path: base.join("data/intents_queue.json"),
            decisions_path: base.join("logs/decisions.log"),
            ledger_path: base.join("ai/history/execution_history.log"),
            intents_dir: base.join("ai/intents"),
            approved_dir: base.join("ai/approved"),
            rejected_dir: base.join("ai/rejected"),
            plans_dir: base.join("ai/plans"),
            approvals_dir: base.join("ai/approvals"),
            results_dir: base.join("ai/results"),
        }
    }

    pub fn default_rooted() -> Self {
        RuntimePaths::rooted_at(Path::new("."))
    }

    /// Production layout: `DATA_DIR`/`LOG_DIR` govern only the paths named
    /// after them; the `ai/`/`core/` tree stays fixed relative to the
    /// working directory regardless of either variable.
    pub fn from_config(config: &crate::infrastructure::config::AppConfig) -> Self {
        let data_dir = Path::new(&config.data_dir);
        let log_dir = Path::new(&config.log_dir);
        let mut paths = RuntimePaths::rooted_at(Path::new("."));
        paths.policy_lock_path = data_dir.join("policy_lock.json");
        paths.metrics_path = data_dir.join("autonomy_metrics.json");
        paths.intents_queue_path = data_dir.join("intents_queue.json");
        paths.decisions_path = log_dir.join("decisions.log");
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_paths_match_documented_layout() {
        let paths = RuntimePaths::rooted_at(Path::new("."));
        assert_eq!(paths.ledger_path, PathBuf::from("./ai/history/execution_history.log"));
        assert_eq!(paths.policy_lock_path, PathBuf::from("./data/policy_lock.json"));
        assert_eq!(paths.decisions_path, PathBuf::from("./logs/decisions.log"));
    }

    #[test]
    fn from_config_honors_data_dir_and_log_dir_only() {
        use crate::infrastructure::config::AppConfig;

        let config = AppConfig {
            log_level: "INFO".to_string(),
            ai_provider: "none".to_string(),
            ai_api_key: String::new(),
            ai_model: "gpt-4o-mini".to_string(),
            ai_timeout_seconds: 5.0,
            telegram_token: String::new(),
            curupira_risk_threshold: 0.4,
            executor_risk_threshold: 0.4,
            log_dir: "custom_logs".to_string(),
            data_dir: "custom_data".to_string(),
            supervisor_enabled: true,
            curupira_enabled: true,
            autonomy_reactive_enabled: false,
            curupira_transport: "auto".to_string(),
            curupira_backend_url: String::new(),
            curupira_backend_timeout: 5.0,
            curupira_local_entrypoint: "curupira/run.py".to_string(),
        };

        let paths = RuntimePaths::from_config(&config);
        assert_eq!(paths.metrics_path, PathBuf::from("custom_data/autonomy_metrics.json"));
        assert_eq!(paths.decisions_path, PathBuf::from("custom_logs/decisions.log"));
        assert_eq!(paths.ledger_path, PathBuf::from("./ai/history/execution_history.log"));
    }
}
