// curudroid-core/src/domain/evaluator.rs

use serde::{Deserialize, Serialize};

/// The bound a caller may act under after an `allowed=true` decision.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum MaxMode {
    None,
    DryRun,
}

/// Output of either risk gate: `{allowed, reason, max_mode}`. Supervisor
/// and Curupira produce the same shape from the same rule, at different
/// thresholds, independently of one another.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Decision {
    pub allowed: bool,
    pub reason: String,
    pub max_mode: MaxMode,
}

/// Evaluate a risk gate: blocks when `risk_score` is absent, otherwise
/// allows with `max_mode=dry-run` iff `risk_score / 10 <= threshold`.
/// Shared by `application::supervisor` and `application::curupira`, which
/// differ only in which `threshold` they pass in (Curupira's is
/// `configured_threshold * 0.8`).
pub fn evaluate(risk_score: Option<i64>, threshold: f64, gate_name: &str) -> Decision {
    let Some(risk_score) = risk_score else {
        return Decision {
            allowed: false,
            reason: "risk_score missing or non-numeric".to_string(),
            max_mode: MaxMode::None,
        };
    };

    let normalized_risk = risk_score as f64 / 10.0;

    if normalized_risk <= threshold {
        Decision {
            allowed: true,
            reason: format!(
                "{gate_name}: normalized_risk {normalized_risk:.3} <= threshold {threshold:.3}"
            ),
            max_mode: MaxMode::DryRun,
        }
    } else {
        Decision {
            allowed: false,
            reason: format!(
                "{gate_name}: normalized_risk {normalized_risk:.3} > threshold {threshold:.3}"
            ),
            max_mode: MaxMode::None,
        }
    }
}

/// Curupira's effective threshold is always a fixed fraction of the
/// configured one -- never independently configured.
pub fn curupira_effective_threshold(configured_threshold: f64) -> f64 {
    configured_threshold * 0.8
}
