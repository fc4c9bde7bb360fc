// curudroid-core/src/domain/intent.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an `Intent`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum IntentState {
    Pending,
    Processing,
    Approved,
    Rejected,
    Blocked,
    ApprovedForDryRun,
    Error,
}

/// A symbolic request naming a plugin; a declaration of desire, not of
/// action. Persisted one-per-file in the approval directories.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Intent {
    pub intent: String,
    pub reason: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub id: Option<String>,

    /// Higher values are drained first by Reactive Autonomy.
    #[serde(default = "default_priority")]
    pub priority: i64,

    #[serde(default = "default_state")]
    pub status: IntentState,

    /// Populated once a plan has been generated for this intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<String>,
}

fn default_priority() -> i64 {
    1
}

fn default_state() -> IntentState {
    IntentState::Pending
}

#[derive(Debug, Clone)]
pub struct IntentValidationError(pub String);

impl std::fmt::Display for IntentValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IntentValidationError {}

impl Intent {
    /// Structural validation: `reason` must be at least 5 characters and
    /// `confidence` must fall in `[0, 1]`.
    pub fn validate_structure(&self) -> Result<(), IntentValidationError> {
        if self.reason.len() < 5 {
            return Err(IntentValidationError(
                "reason must be at least 5 characters".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(IntentValidationError(
                "confidence must be within [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}
