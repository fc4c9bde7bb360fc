// curudroid-core/src/application/plan_validator.rs

use std::path::Path;

use crate::domain::error::GovernanceError;
use crate::domain::plan::Plan;

/// Load JSON from `path` and run every structural invariant. Success
/// returns the parsed plan verbatim.
pub fn validate(path: &Path) -> Result<Plan, GovernanceError> {
    if !path.exists() {
        return Err(GovernanceError::PlanValidationError {
            field: "path".to_string(),
            reason: format!("plan file not found: {}", path.display()),
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|e| GovernanceError::PlanValidationError {
        field: "path".to_string(),
        reason: e.to_string(),
    })?;

    let plan: Plan = serde_json::from_str(&raw).map_err(|e| GovernanceError::PlanValidationError {
        field: "<root>".to_string(),
        reason: format!("invalid JSON format: {e}"),
    })?;

    plan.validate_structure()?;
    Ok(plan)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_plan_json() -> &'static str {
        r#"{
            "schema_version": "0.1",
            "id": "20260101T000000Z_scan_logs",
            "created_at": "2026-01-01T00:00:00Z",
            "risk_score": 2,
            "source": "scan_logs",
            "commands": [
                {"type": "shell", "command": "tail -n 50 logs/curudroid.log", "timeout_seconds": 5}
            ]
        }"#
    }

    #[test]
    fn validates_a_well_formed_plan_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, valid_plan_json()).unwrap();

        let plan = validate(&path).unwrap();
        assert_eq!(plan.id, "20260101T000000Z_scan_logs");
    }

    #[test]
    fn missing_file_is_a_validation_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(validate(&path).is_err());
    }

    #[test]
    fn invalid_json_is_a_validation_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(validate(&path).is_err());
    }
}
