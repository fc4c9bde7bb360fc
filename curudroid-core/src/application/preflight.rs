// curudroid-core/src/application/preflight.rs

use std::path::Path;

use crate::application::plugin_registry::{check_registration, PluginKind, PluginStatus};
use crate::domain::policy_lock::PolicyLock;
use crate::infrastructure::config::{config_summary, AppConfig};
use crate::infrastructure::paths::RuntimePaths;
use crate::infrastructure::policy_lock_store;
use crate::infrastructure::policy_store::load_policy;

/// Startup diagnostics report. `ok()` is `errors.is_empty()` -- warnings
/// never block startup.
#[derive(Debug, Default)]
pub struct PreflightReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
}

impl PreflightReport {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

fn check_directory_writable(name: &str, path: &Path, report: &mut PreflightReport) {
    if let Err(e) = std::fs::create_dir_all(path) {
        report.errors.push(format!("cannot access directory '{name}' ({}): {e}", path.display()));
        return;
    }

    let probe = path.join(".preflight_write_test");
    match std::fs::write(&probe, "ok") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            report.infos.push(format!("directory OK: {name} ({})", path.display()));
        }
        Err(e) => {
            report.errors.push(format!("cannot access directory '{name}' ({}): {e}", path.display()));
        }
    }
}

fn check_directories(config: &AppConfig, report: &mut PreflightReport) {
    check_directory_writable("logs", Path::new(&config.log_dir), report);
    check_directory_writable("data", Path::new(&config.data_dir), report);
}

fn check_config(config: &AppConfig, report: &mut PreflightReport) {
    let (errors, warnings) = config.validate();
    report.errors.extend(errors);
    report.warnings.extend(warnings);
}

/// Register every compile-time plugin and check its declared env vars.
fn check_plugins(report: &mut PreflightReport) {
    for kind in PluginKind::ALL {
        let plugin = kind.as_plugin();
        let (status, missing) = check_registration(kind, |name| std::env::var(name).ok());
        match status {
            PluginStatus::Ok => {
                report.infos.push(format!("plugin {} v{}: OK", plugin.plugin_id(), plugin.version()));
            }
            PluginStatus::Disabled => {
                report.warnings.push(format!(
                    "plugin {}: DISABLED (missing env vars: {})",
                    plugin.plugin_id(),
                    missing.join(", ")
                ));
            }
            PluginStatus::Error => {
                report.errors.push(format!("plugin {}: ERROR", plugin.plugin_id()));
            }
        }
    }
}

/// Load the current policy and its lock, verifying the pinned hash/version
/// pair still matches. Skipped entirely in maintenance mode, where lock
/// mutation is expected. Any failure here -- a missing lock, a missing
/// policy, or a drifted hash/version -- is a hard startup error.
fn check_policy_lock(paths: &RuntimePaths, report: &mut PreflightReport) {
    let (policy, policy_sha256) = match load_policy(&paths.policy_path) {
        Ok(pair) => pair,
        Err(e) => {
            report.errors.push(format!("policy lock check failed: {e}"));
            return;
        }
    };

    let lock = match policy_lock_store::load(&paths.policy_lock_path) {
        Ok(lock) => lock,
        Err(e) => {
            report.errors.push(format!("policy lock check failed: {e}"));
            return;
        }
    };

    match PolicyLock::verify(&lock, &policy_sha256, &policy.version) {
        Ok(()) => report.infos.push("policy lock OK".to_string()),
        Err(e) => report.errors.push(format!("policy lock check failed: {e}")),
    }
}

/// Run every startup check and collect its findings. `maintenance` skips
/// the Policy Lock check -- lock mutation via `--policy-lock-init` is only
/// reachable in that mode, and startup must not fail closed against the
/// lock it's about to rewrite.
pub fn run_preflight(config: &AppConfig, paths: &RuntimePaths, maintenance: bool) -> PreflightReport {
    let mut report = PreflightReport::default();

    check_directories(config, &mut report);
    check_config(config, &mut report);
    check_plugins(&mut report);

    if maintenance {
        report.infos.push("policy maintenance mode: lock verification skipped".to_string());
    } else {
        check_policy_lock(paths, &mut report);
    }

    report.infos.push(config_summary(config));
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            log_level: "INFO".to_string(),
            ai_provider: "none".to_string(),
            ai_api_key: String::new(),
            ai_model: "gpt-4o-mini".to_string(),
            ai_timeout_seconds: 5.0,
            telegram_token: String::new(),
            curupira_risk_threshold: 0.4,
            executor_risk_threshold: 0.4,
            log_dir: dir.join("logs").to_string_lossy().to_string(),
            data_dir: dir.join("data").to_string_lossy().to_string(),
            supervisor_enabled: true,
            curupira_enabled: true,
            autonomy_reactive_enabled: false,
            curupira_transport: "auto".to_string(),
            curupira_backend_url: String::new(),
            curupira_backend_timeout: 5.0,
            curupira_local_entrypoint: "curupira/run.py".to_string(),
        }
    }

    fn paths_with_locked_policy(dir: &Path) -> RuntimePaths {
        let policy_path = dir.join("policy.json");
        std::fs::write(&policy_path, r#"{"version":"1","allowed_commands":["tail"]}"#).unwrap();
        let (_, policy_sha256) = load_policy(&policy_path).unwrap();
        let policy_lock_path = dir.join("policy_lock.json");
        policy_lock_store::initialize(&policy_lock_path, &policy_sha256, "1").unwrap();

        let mut paths = RuntimePaths::rooted_at(dir);
        paths.policy_path = policy_path;
        paths.policy_lock_path = policy_lock_path;
        paths
    }

    #[test]
    fn writable_directories_and_valid_config_pass() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let paths = paths_with_locked_policy(dir.path());
        let report = run_preflight(&config, &paths, false);
        assert!(report.ok());
        assert!(report.infos.iter().any(|i| i.contains("directory OK: logs")));
    }

    #[test]
    fn summarize_logs_plugin_without_ai_env_vars_warns_not_errors() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let paths = paths_with_locked_policy(dir.path());
        let report = run_preflight(&config, &paths, false);
        assert!(report.ok());
        assert!(report.warnings.iter().any(|w| w.contains("summarize_logs")));
    }

    #[test]
    fn missing_policy_lock_outside_maintenance_fails_closed() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let paths = RuntimePaths::rooted_at(dir.path());
        let report = run_preflight(&config, &paths, false);
        assert!(!report.ok());
        assert!(report.errors.iter().any(|e| e.contains("policy lock check failed")));
    }

    #[test]
    fn maintenance_mode_skips_the_policy_lock_check() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let paths = RuntimePaths::rooted_at(dir.path());
        let report = run_preflight(&config, &paths, true);
        assert!(report.ok());
        assert!(report.infos.iter().any(|i| i.contains("lock verification skipped")));
    }

    #[test]
    fn drifted_policy_lock_fails_closed() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let paths = paths_with_locked_policy(dir.path());
        std::fs::write(
            &paths.policy_path,
            r#"{"version":"1","allowed_commands":["tail","grep"]}"#,
        )
        .unwrap();
        let report = run_preflight(&config, &paths, false);
        assert!(!report.ok());
        assert!(report.errors.iter().any(|e| e.contains("policy lock check failed")));
    }
}
