// curudroid-core/src/domain/plugin.rs

use serde::{Deserialize, Serialize};

use crate::domain::intent::Intent;

/// One proposed subprocess invocation, prior to becoming a `Command`.
/// `argv` is pre-tokenized: a plugin never builds a shell string.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PluginCommand {
    pub argv: Vec<String>,
    pub description: String,
}

/// The contract every plugin's `run(intent)` must return:
/// `{success, commands, risk_estimate, assumptions}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PluginRunResult {
    pub success: bool,
    pub commands: Vec<PluginCommand>,
    pub risk_estimate: f64,
    pub assumptions: Vec<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PluginContractError {
    #[error("risk_estimate must be in [0, 1], got {0}")]
    RiskEstimateOutOfRange(String),
    #[error("command at index {0} has an empty argv")]
    EmptyArgv(usize),
    #[error("required environment variable not set: {0}")]
    MissingRequiredEnvVar(String),
}

/// A plugin's static identity, checked by the registry before it is ever
/// invoked: `plugin_id`, `version`, `required_env_vars`.
pub trait PluginMetadata {
    fn plugin_id(&self) -> &'static str;
    fn version(&self) -> &'static str;
    fn required_env_vars(&self) -> &'static [&'static str];
}

/// The one method every plugin implements. The missing-declared-env-var
/// check lives in the registry, not here, so the domain layer never
/// touches `std::env` directly.
pub trait Plugin: PluginMetadata {
    fn run(&self, intent: &Intent) -> PluginRunResult;
}

/// Validate a plugin's declared result against the contract.
/// Registration-time env var checks are a separate concern
/// (`application::plugin_registry`), since they require reading the
/// process environment.
pub fn validate_contract(result: &PluginRunResult) -> Result<(), PluginContractError> {
    if !(0.0..=1.0).contains(&result.risk_estimate) {
        return Err(PluginContractError::RiskEstimateOutOfRange(format!(
            "{}",
            result.risk_estimate
        )));
    }

    for (idx, command) in result.commands.iter().enumerate() {
        if command.argv.is_empty() {
            return Err(PluginContractError::EmptyArgv(idx));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_result() -> PluginRunResult {
        PluginRunResult {
            success: true,
            commands: vec![PluginCommand {
                argv: vec!["tail".to_string(), "-n".to_string(), "50".to_string()],
                description: "tail recent log lines".to_string(),
            }],
            risk_estimate: 0.2,
            assumptions: vec![],
        }
    }

    #[test]
    fn accepts_well_formed_result() {
        assert!(validate_contract(&ok_result()).is_ok());
    }

    #[test]
    fn rejects_risk_estimate_out_of_range() {
        let mut result = ok_result();
        result.risk_estimate = 1.5;
        assert!(matches!(
            validate_contract(&result),
            Err(PluginContractError::RiskEstimateOutOfRange(_))
        ));
    }

    #[test]
    fn rejects_empty_argv() {
        let mut result = ok_result();
        result.commands[0].argv.clear();
        assert!(matches!(
            validate_contract(&result),
            Err(PluginContractError::EmptyArgv(0))
        ));
    }
}
