// curudroid-core/src/domain/ai_advisor.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    DryRun,
    Block,
    Review,
    Proceed,
}

impl Default for SuggestedAction {
    fn default() -> Self {
        SuggestedAction::Review
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Medium
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: f64,
}

impl Default for RiskAssessment {
    fn default() -> Self {
        RiskAssessment {
            level: RiskLevel::default(),
            score: 0.5,
        }
    }
}

/// Normalized advisory output. Never authoritative: the pipeline's outcome
/// never depends on any field here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiRecommendation {
    pub suggested_action: SuggestedAction,
    pub risk_assessment: RiskAssessment,
    pub confidence: f64,
    pub explanation: String,
    pub provider: String,
    pub model: String,
    pub timestamp: String,
}

/// Raw, possibly-malformed provider output prior to normalization. Every
/// field is optional because a real provider transport returns opaque JSON
/// that this crate does not control.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawAdvisorResponse {
    pub suggested_action: Option<String>,
    pub risk_assessment: Option<RawRiskAssessment>,
    pub confidence: Option<f64>,
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawRiskAssessment {
    pub level: Option<String>,
    pub score: Option<f64>,
}

fn clamp_unit(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        default
    }
}

/// Map an arbitrary provider string onto the closed `SuggestedAction` enum,
/// defaulting to `"review"` for anything unrecognized.
fn normalize_suggested_action(raw: Option<&str>) -> SuggestedAction {
    match raw {
        Some("dry_run") => SuggestedAction::DryRun,
        Some("block") => SuggestedAction::Block,
        Some("review") => SuggestedAction::Review,
        Some("proceed") => SuggestedAction::Proceed,
        _ => SuggestedAction::Review,
    }
}

fn normalize_risk_level(raw: Option<&str>) -> RiskLevel {
    match raw {
        Some("low") => RiskLevel::Low,
        Some("medium") => RiskLevel::Medium,
        Some("high") => RiskLevel::High,
        _ => RiskLevel::Medium,
    }
}

/// Build a normalized recommendation from raw provider output. Idempotent:
/// re-normalizing an already-normalized recommendation is a fixed point,
/// because every closed enum/clamp here maps its own valid values back to
/// themselves.
pub fn normalize(
    raw: RawAdvisorResponse,
    provider: &str,
    model: &str,
    timestamp: &str,
) -> AiRecommendation {
    let risk_assessment = match raw.risk_assessment {
        Some(raw_assessment) => RiskAssessment {
            level: normalize_risk_level(raw_assessment.level.as_deref()),
            score: raw_assessment
                .score
                .map(|s| clamp_unit(s, 0.5))
                .unwrap_or(0.5),
        },
        None => RiskAssessment::default(),
    };

    AiRecommendation {
        suggested_action: normalize_suggested_action(raw.suggested_action.as_deref()),
        risk_assessment,
        confidence: raw.confidence.map(|c| clamp_unit(c, 0.0)).unwrap_or(0.0),
        explanation: raw.explanation.unwrap_or_default(),
        provider: provider.to_string(),
        model: model.to_string(),
        timestamp: timestamp.to_string(),
    }
}
