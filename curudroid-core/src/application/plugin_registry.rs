// curudroid-core/src/application/plugin_registry.rs

use crate::domain::intent::{Intent, IntentState};
use crate::domain::plugin::{validate_contract, Plugin, PluginCommand, PluginMetadata, PluginRunResult};

/// Every plugin known at build time, in place of dynamic module discovery:
/// a fixed enum is easier to audit than a directory scan, and a host
/// constrained enough to need this runtime shouldn't be loading arbitrary
/// code off disk at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    ScanLogs,
    SummarizeLogs,
    HealthCheck,
}

impl PluginKind {
    pub const ALL: [PluginKind; 3] = [PluginKind::ScanLogs, PluginKind::SummarizeLogs, PluginKind::HealthCheck];

    /// Match an intent's `intent` field to a known plugin id. `None` is the
    /// deny-by-default case the Plan Generator turns into an empty-commands
    /// REJECTED artifact.
    pub fn from_intent_name(name: &str) -> Option<PluginKind> {
        PluginKind::ALL.into_iter().find(|kind| kind.as_plugin().plugin_id() == name)
    }

    pub fn as_plugin(&self) -> &'static dyn Plugin {
        match self {
            PluginKind::ScanLogs => &ScanLogs,
            PluginKind::SummarizeLogs => &SummarizeLogs,
            PluginKind::HealthCheck => &HealthCheck,
        }
    }
}

/// Status of a plugin's registration-time contract check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginStatus {
    Ok,
    Disabled,
    Error,
}

fn probe_intent(plugin_id: &str) -> Intent {
    Intent {
        intent: plugin_id.to_string(),
        reason: "registration contract probe".to_string(),
        confidence: 1.0,
        created_at: chrono::Utc::now(),
        id: None,
        priority: 1,
        status: IntentState::Pending,
        plan_path: None,
    }
}

/// Check a plugin's declared `required_env_vars` against the process
/// environment, via an injected lookup so this stays testable without
/// mutating real env state. If the env vars are present, also invokes the
/// plugin with a probe intent and validates the result against the plugin
/// contract, so a plugin that declares itself ready but returns a malformed
/// `PluginRunResult` registers as `Error` instead of `Ok`.
pub fn check_registration<F>(kind: PluginKind, env_lookup: F) -> (PluginStatus, Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    let plugin = kind.as_plugin();
    let missing: Vec<String> = plugin
        .required_env_vars()
        .iter()
        .filter(|name| env_lookup(name).is_none())
        .map(|name| (*name).to_string())
        .collect();

    if !missing.is_empty() {
        return (PluginStatus::Disabled, missing);
    }

    (probe_and_validate(plugin), missing)
}

fn probe_and_validate(plugin: &dyn Plugin) -> PluginStatus {
    let probe = probe_intent(plugin.plugin_id());
    let result = plugin.run(&probe);
    match validate_contract(&result) {
        Ok(()) => PluginStatus::Ok,
        Err(_) => PluginStatus::Error,
    }
}

fn command(argv: &[&str], description: &str) -> PluginCommand {
    PluginCommand {
        argv: argv.iter().map(|s| s.to_string()).collect(),
        description: description.to_string(),
    }
}

/// Tails and greps the local log file for anomalies.
pub struct ScanLogs;

impl PluginMetadata for ScanLogs {
    fn plugin_id(&self) -> &'static str {
        "scan_logs"
    }

    fn version(&self) -> &'static str {
        "1.1.0"
    }

    fn required_env_vars(&self) -> &'static [&'static str] {
        &[]
    }
}

impl Plugin for ScanLogs {
    fn run(&self, _intent: &Intent) -> PluginRunResult {
        PluginRunResult {
            success: true,
            commands: vec![
                command(
                    &["tail", "-n", "50", "logs/curudroid.log"],
                    "tail the most recent runtime log lines",
                ),
                command(&["grep", "ERROR", "logs/curudroid.log"], "surface ERROR lines"),
                command(&["grep", "WARN", "logs/curudroid.log"], "surface WARN lines"),
            ],
            risk_estimate: 0.2,
            assumptions: vec!["logs/curudroid.log exists and is readable".to_string()],
        }
    }
}

/// Tails the log and consults Curupira for a summary opinion. The second
/// command is why this plugin declares an AI provider's env vars: the
/// summary is generated by the external consultation, not locally.
pub struct SummarizeLogs;

impl PluginMetadata for SummarizeLogs {
    fn plugin_id(&self) -> &'static str {
        "summarize_logs"
    }

    fn version(&self) -> &'static str {
        "1.1.0"
    }

    fn required_env_vars(&self) -> &'static [&'static str] {
        &["AI_PROVIDER", "AI_API_KEY"]
    }
}

impl Plugin for SummarizeLogs {
    fn run(&self, _intent: &Intent) -> PluginRunResult {
        PluginRunResult {
            success: true,
            commands: vec![
                command(&["tail", "-n", "100", "logs/curudroid.log"], "gather recent log context"),
                command(
                    &["python", "-m", "ai.curupira_adapter"],
                    "ask Curupira for a summary opinion",
                ),
            ],
            risk_estimate: 0.45,
            assumptions: vec!["an AI provider is configured and reachable".to_string()],
        }
    }
}

/// Checks for a recent heartbeat and recent error/warning activity.
pub struct HealthCheck;

impl PluginMetadata for HealthCheck {
    fn plugin_id(&self) -> &'static str {
        "health_check"
    }

    fn version(&self) -> &'static str {
        "1.1.0"
    }

    fn required_env_vars(&self) -> &'static [&'static str] {
        &[]
    }
}

impl Plugin for HealthCheck {
    fn run(&self, _intent: &Intent) -> PluginRunResult {
        PluginRunResult {
            success: true,
            commands: vec![
                command(&["tail", "-n", "10", "logs/boot.log"], "confirm the most recent boot"),
                command(&["grep", "Heartbeat", "logs/curudroid.log"], "find the latest heartbeat"),
                command(
                    &["grep", "-E", "ERROR|WARN", "logs/curudroid.log"],
                    "flag recent degraded health",
                ),
            ],
            risk_estimate: 0.3,
            assumptions: vec!["logs/boot.log exists since the last boot".to_string()],
        }
    }
}
