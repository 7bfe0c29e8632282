//! Composite risk assessment
//!
//! Sums the five signal scores into a total, normalizes a confidence value,
//! and applies the single bot threshold. The per-evaluator flags are carried
//! in the audit reasons only; the verdict is a function of the sum alone.

use serde::{Deserialize, Serialize};

use super::RiskLimits;
use crate::signals::{
    BehaviorSample, evaluate_behavior, evaluate_email, evaluate_fingerprint, evaluate_phone,
    evaluate_user_agent,
};

/// Score at which confidence saturates to 1.0.
const CONFIDENCE_SCALE: f64 = 100.0;

/// One signup attempt's submitted evidence. Built once per request from the
/// wire payload plus transport metadata; never persisted itself.
#[derive(Debug, Clone, Default)]
pub struct VerificationRequest {
    pub email: String,
    pub phone: Option<String>,
    /// Caller IP as seen by the transport layer.
    pub network_origin: String,
    pub user_agent: String,
    pub behavior: Option<BehaviorSample>,
    /// Opaque JSON blob produced client-side; may be empty.
    pub device_fingerprint: String,
}

/// The combined verdict over all five signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: u32,
    /// Risk score normalized into [0, 1], saturating at 100 points.
    pub confidence: f64,
    pub is_bot: bool,
    /// All evaluator reasons in evaluator order. Internal audit data, never
    /// returned to the caller.
    pub reasons: Vec<String>,
}

/// Assess a request against the default limits.
pub fn assess(request: &VerificationRequest) -> RiskAssessment {
    assess_with_limits(request, &RiskLimits::default())
}

pub fn assess_with_limits(request: &VerificationRequest, limits: &RiskLimits) -> RiskAssessment {
    let reports = [
        evaluate_email(&request.email),
        evaluate_phone(request.phone.as_deref().unwrap_or("")),
        evaluate_user_agent(&request.user_agent),
        evaluate_behavior(request.behavior.as_ref()),
        evaluate_fingerprint(&request.device_fingerprint),
    ];

    let risk_score: u32 = reports.iter().map(|r| r.score).sum();
    let mut reasons = Vec::new();
    for report in reports {
        reasons.extend(report.reasons);
    }

    RiskAssessment {
        risk_score,
        confidence: (f64::from(risk_score) / CONFIDENCE_SCALE).min(1.0),
        is_bot: risk_score >= limits.bot_score_threshold,
        reasons,
    }
}
