//! Verification workflow
//!
//! The orchestrator for one signup attempt: gate on the ban ledger and the
//! signup rate limit, assess the five signals, persist the outcome, return
//! the verdict. Each request runs exactly once, synchronously; there is no
//! retry or resumable state.
//!
//! Every persistence failure along the way fails open: a broken store never
//! blocks a signup, and a failed audit write never changes the verdict.

use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::assessment::{RiskAssessment, VerificationRequest, assess_with_limits};
use super::rate_limit::SignupRateLimiter;
use super::RiskLimits;
use crate::store::{
    ActivityType, BanStore, BannedIdentity, SuspiciousActivityRecord, SuspiciousActivityStore,
};

/// Result of one verification run.
#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    /// Assessed below the bot threshold.
    Human(RiskAssessment),
    /// Assessed at or above the bot threshold.
    Bot(RiskAssessment),
    /// Rejected before assessment: identity or origin is on the ban ledger.
    Banned,
    /// Rejected before assessment: too many recent attempts from the origin.
    RateLimited,
}

pub struct HumanVerifier {
    activity: Arc<dyn SuspiciousActivityStore>,
    bans: Arc<dyn BanStore>,
    rate_limiter: SignupRateLimiter,
    limits: RiskLimits,
}

impl HumanVerifier {
    pub fn new(
        activity: Arc<dyn SuspiciousActivityStore>,
        bans: Arc<dyn BanStore>,
        limits: RiskLimits,
    ) -> Self {
        let rate_limiter = SignupRateLimiter::new(
            activity.clone(),
            limits.signup_attempt_limit,
            limits.signup_window,
        );
        Self {
            activity,
            bans,
            rate_limiter,
            limits,
        }
    }

    /// Run one signup attempt through the full workflow.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        // Banned identities are rejected before any evaluator work is spent.
        if self.is_banned(&request.email, &request.network_origin).await {
            warn!(origin = %request.network_origin, "Rejected signup from banned identity");
            return VerificationOutcome::Banned;
        }

        if !self.rate_limiter.check(&request.network_origin).await {
            warn!(origin = %request.network_origin, "Signup rate limit exceeded");
            return VerificationOutcome::RateLimited;
        }

        self.log_activity(
            &request.email,
            ActivityType::SignupAttempt,
            json!({ "userAgent": request.user_agent }),
            &request.network_origin,
        )
        .await;

        let assessment = assess_with_limits(request, &self.limits);

        if assessment.is_bot {
            info!(
                risk_score = assessment.risk_score,
                origin = %request.network_origin,
                "Signup classified as bot"
            );
            let details =
                serde_json::to_value(&assessment).unwrap_or_else(|_| json!({}));
            self.log_activity(
                &request.email,
                ActivityType::HumanVerificationFailed,
                details,
                &request.network_origin,
            )
            .await;
            VerificationOutcome::Bot(assessment)
        } else {
            self.log_activity(
                &request.email,
                ActivityType::HumanVerificationPassed,
                json!({ "riskScore": assessment.risk_score }),
                &request.network_origin,
            )
            .await;
            VerificationOutcome::Human(assessment)
        }
    }

    /// Record an externally validated CAPTCHA completion.
    pub async fn record_captcha(&self, email: &str, captcha_response: &str, origin: &str) {
        self.log_activity(
            email,
            ActivityType::CaptchaCompleted,
            json!({ "captchaResponse": captcha_response }),
            origin,
        )
        .await;
    }

    /// Append an administrative ban. Unlike the read paths this surfaces the
    /// store error: an admin must know their ban did not land.
    pub async fn ban(
        &self,
        email: &str,
        reason: &str,
        evidence: serde_json::Value,
        origin: &str,
    ) -> Result<(), String> {
        self.bans
            .insert(BannedIdentity::new(email, reason, evidence, origin))
            .await?;
        warn!(email = %email, reason = %reason, "Identity banned");
        Ok(())
    }

    async fn is_banned(&self, email: &str, origin: &str) -> bool {
        match self.bans.matches(email, origin).await {
            Ok(matched) => matched,
            Err(e) => {
                error!(error = %e, "Ban ledger read failed, treating as not banned");
                false
            }
        }
    }

    async fn log_activity(
        &self,
        identity: &str,
        activity_type: ActivityType,
        details: serde_json::Value,
        origin: &str,
    ) {
        let record = SuspiciousActivityRecord::new(identity, activity_type, details, origin);
        if let Err(e) = self.activity.append(record).await {
            // Audit writes must never change the response.
            error!(error = %e, "Failed to append activity record");
        }
    }
}
