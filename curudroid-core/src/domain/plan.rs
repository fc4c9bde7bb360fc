// curudroid-core/src/domain/plan.rs

use serde::{Deserialize, Serialize};

use crate::domain::error::GovernanceError;

pub const SCHEMA_VERSION: &str = "0.1";
pub const RISK_CEILING: u8 = 5;
pub const MAX_TIMEOUT_SECONDS: u32 = 30;

/// Characters that may never appear in a `Command::command` string.
/// Anything here would let a token escape the `Safe Runner`'s no-shell
/// tokenization.
pub const FORBIDDEN_CHARS: &[char] = &[
    '|', '&', ';', '<', '>', '`', '\\', '$', '!', '{', '}', '(', ')', '*', '?', '[', ']', '~',
];

/// Substrings that are forbidden regardless of tokenization (destructive or
/// privilege-escalating regardless of surrounding shell metacharacters).
pub const FORBIDDEN_SUBSTRINGS: &[&str] = &["rm ", "rm-", "sudo", "reboot", "shutdown", "dd "];

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Shell,
    Python,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub command: String,
    pub timeout_seconds: u32,
}

impl Command {
    /// Leading whitespace-separated token, used both for allowlist
    /// membership and for Safe Runner tokenization.
    pub fn leading_token(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }

    /// Pure structural validation: timeout ceiling and forbidden
    /// chars/substrings. Allowlist membership is a separate concern (the
    /// Policy is external state, checked by the Plan Validator and again by
    /// the Executor for defense in depth).
    pub fn validate_structure(&self) -> Result<(), GovernanceError> {
        if self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(GovernanceError::PlanValidationError {
                field: "timeout_seconds".to_string(),
                reason: "timeout_seconds exceeds maximum allowed".to_string(),
            });
        }

        for ch in FORBIDDEN_CHARS {
            if self.command.contains(*ch) {
                return Err(GovernanceError::PlanValidationError {
                    field: "command".to_string(),
                    reason: format!("forbidden character detected in command: {ch}"),
                });
            }
        }

        for pattern in FORBIDDEN_SUBSTRINGS {
            if self.command.contains(pattern) {
                return Err(GovernanceError::PlanValidationError {
                    field: "command".to_string(),
                    reason: format!("forbidden pattern detected in command: {pattern}"),
                });
            }
        }

        if self.leading_token().is_none() {
            return Err(GovernanceError::PlanValidationError {
                field: "command".to_string(),
                reason: "command must contain at least one token".to_string(),
            });
        }

        Ok(())
    }
}

/// Concrete, bounded, immutable command list derived from an intent.
/// Owned by the Plan Generator until persisted; immutable and read-only
/// for the Executor thereafter.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Plan {
    pub schema_version: String,
    pub id: String,
    pub created_at: String,
    pub risk_score: i64,
    pub source: String,
    pub commands: Vec<Command>,
}

impl Plan {
    /// All structural invariants except the JSON parse/load step itself,
    /// which is the caller's (infrastructure's) concern.
    pub fn validate_structure(&self) -> Result<(), GovernanceError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(GovernanceError::PlanValidationError {
                field: "schema_version".to_string(),
                reason: "unsupported schema_version".to_string(),
            });
        }

        if self.risk_score < 0 || self.risk_score > 10 {
            return Err(GovernanceError::PlanValidationError {
                field: "risk_score".to_string(),
                reason: "risk_score must be an integer in [0, 10]".to_string(),
            });
        }

        if self.risk_score > RISK_CEILING as i64 {
            return Err(GovernanceError::PlanValidationError {
                field: "risk_score".to_string(),
                reason: "risk_score exceeds execution threshold".to_string(),
            });
        }

        chrono::DateTime::parse_from_rfc3339(&self.created_at).map_err(|_| {
            GovernanceError::PlanValidationError {
                field: "created_at".to_string(),
                reason: "created_at must be a valid ISO 8601 timestamp".to_string(),
            }
        })?;

        if self.commands.is_empty() {
            return Err(GovernanceError::PlanValidationError {
                field: "commands".to_string(),
                reason: "commands must be a non-empty list".to_string(),
            });
        }

        for command in &self.commands {
            command.validate_structure()?;
        }

        Ok(())
    }
}

/// Convert a Plan Generator risk_estimate (`f64` in `[0,1]`) into the
/// integer `risk_score` (`[0,10]`) carried by an executable Plan.
pub fn risk_score_from_estimate(risk_estimate: f64) -> u8 {
    let clamped = risk_estimate.clamp(0.0, 1.0);
    (clamped * 10.0).round() as u8
}
