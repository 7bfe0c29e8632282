//! Signal evaluators for signup risk scoring
//!
//! Five independent, stateless evaluators, each turning one piece of
//! submitted evidence into a partial risk score plus audit reasons:
//! - Email address shape and domain reputation
//! - Phone number plausibility
//! - User-agent bot signatures
//! - Behavioral form-interaction timing
//! - Client device fingerprint
//!
//! Evaluators are pure functions: same input, same verdict, no shared state.

pub mod behavior;
pub mod email;
pub mod fingerprint;
pub mod patterns;
pub mod phone;
pub mod user_agent;

pub use behavior::{BehaviorSample, evaluate_behavior};
pub use email::{evaluate_email, evaluate_email_with};
pub use fingerprint::evaluate_fingerprint;
pub use patterns::{DomainAgeCheck, SuspiciousTldList};
pub use phone::evaluate_phone;
pub use user_agent::evaluate_user_agent;

use serde::Serialize;

/// Partial verdict produced by a single evaluator.
///
/// `flagged` is the evaluator's own threshold applied to its own score. It is
/// recorded for audit but deliberately not consumed by the composite
/// assessor, which works from the summed score alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalReport {
    pub score: u32,
    pub reasons: Vec<String>,
    pub flagged: bool,
}

impl SignalReport {
    /// A verdict carrying no evidence either way.
    pub fn clean() -> Self {
        Self {
            score: 0,
            reasons: Vec::new(),
            flagged: false,
        }
    }

    pub(crate) fn add(&mut self, points: u32, reason: &str) {
        self.score += points;
        self.reasons.push(reason.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_report() {
        let report = SignalReport::clean();
        assert_eq!(report.score, 0);
        assert!(report.reasons.is_empty());
        assert!(!report.flagged);
    }
}
