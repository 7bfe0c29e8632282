//! Composite risk assessment and the verification workflow
//!
//! - `assessment` - combines the five signal evaluators into one verdict
//! - `rate_limit` - per-origin signup admission over the activity log
//! - `verifier` - the orchestrator gating on bans and rate limits

pub mod assessment;
pub mod rate_limit;
pub mod verifier;

pub use assessment::{RiskAssessment, VerificationRequest, assess, assess_with_limits};
pub use rate_limit::SignupRateLimiter;
pub use verifier::{HumanVerifier, VerificationOutcome};

use chrono::Duration;

/// Operational thresholds for the verification workflow.
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Total score at and above which a request is classified as a bot.
    pub bot_score_threshold: u32,
    /// Signup attempts admitted per origin within the window.
    pub signup_attempt_limit: i64,
    /// Trailing window over which signup attempts are counted.
    pub signup_window: Duration,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            bot_score_threshold: 70,
            signup_attempt_limit: 3,
            signup_window: Duration::hours(1),
        }
    }
}
