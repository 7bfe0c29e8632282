//! Integration tests for the trust scoring engine
//!
//! These tests verify end-to-end functionality of the verification workflow:
//! signal assessment, ban gating, signup rate limiting, audit logging, and
//! the fail-open behavior of every persistence path.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use trustgate::{
    ActivityType, BanStore, BannedIdentity, BehaviorSample, HumanVerifier, InMemoryActivityStore,
    InMemoryBanStore, RiskLimits, SuspiciousActivityRecord, SuspiciousActivityStore,
    VerificationOutcome, VerificationRequest, assess,
};

// ============================================================================
// Test Helpers
// ============================================================================

const HUMAN_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                        (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Create a request that scores zero across all five signals.
fn human_request(email: &str, origin: &str) -> VerificationRequest {
    VerificationRequest {
        email: email.to_string(),
        phone: Some("+1 (206) 867-5309".to_string()),
        network_origin: origin.to_string(),
        user_agent: HUMAN_UA.to_string(),
        behavior: Some(BehaviorSample {
            form_completion_millis: Some(24_000),
            mouse_movement_count: Some(61),
            keystroke_intervals_millis: Some(vec![140, 95, 210, 170, 120]),
        }),
        device_fingerprint: r#"{"webdriver":false,"plugins":["pdf-viewer"]}"#.to_string(),
    }
}

fn build_verifier() -> (Arc<InMemoryActivityStore>, Arc<InMemoryBanStore>, HumanVerifier) {
    let activity = Arc::new(InMemoryActivityStore::new());
    let bans = Arc::new(InMemoryBanStore::new());
    let verifier = HumanVerifier::new(activity.clone(), bans.clone(), RiskLimits::default());
    (activity, bans, verifier)
}

struct FailingActivityStore;

#[async_trait]
impl SuspiciousActivityStore for FailingActivityStore {
    async fn append(&self, _record: SuspiciousActivityRecord) -> Result<(), String> {
        Err("store unavailable".to_string())
    }
    async fn count_signup_attempts(
        &self,
        _origin: &str,
        _since: DateTime<Utc>,
    ) -> Result<i64, String> {
        Err("store unavailable".to_string())
    }
    async fn recent(
        &self,
        _identity: Option<&str>,
        _limit: i64,
    ) -> Result<Vec<SuspiciousActivityRecord>, String> {
        Err("store unavailable".to_string())
    }
    async fn counts_since(
        &self,
        _since: DateTime<Utc>,
    ) -> Result<trustgate::ActivityCounts, String> {
        Err("store unavailable".to_string())
    }
}

struct FailingBanStore;

#[async_trait]
impl BanStore for FailingBanStore {
    async fn insert(&self, _record: BannedIdentity) -> Result<(), String> {
        Err("store unavailable".to_string())
    }
    async fn matches(&self, _email: &str, _origin: &str) -> Result<bool, String> {
        Err("store unavailable".to_string())
    }
    async fn recent(&self, _limit: i64) -> Result<Vec<BannedIdentity>, String> {
        Err("store unavailable".to_string())
    }
    async fn count(&self) -> Result<i64, String> {
        Err("store unavailable".to_string())
    }
}

// ============================================================================
// End-to-End Verification Tests
// ============================================================================

mod verification_flow {
    use super::*;

    #[tokio::test]
    async fn test_human_signup_passes_and_is_audited() {
        let (activity, _bans, verifier) = build_verifier();

        let outcome = verifier
            .verify(&human_request("jane.doe@example.com", "198.51.100.7"))
            .await;

        let VerificationOutcome::Human(assessment) = outcome else {
            panic!("clean request should verify as human");
        };
        assert_eq!(assessment.risk_score, 0);
        assert!(!assessment.is_bot);

        let records = activity.recent(None, 10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].activity_type,
            ActivityType::HumanVerificationPassed
        );
        assert_eq!(records[1].activity_type, ActivityType::SignupAttempt);
        assert_eq!(records[0].details["riskScore"], 0);
    }

    #[tokio::test]
    async fn test_bot_email_and_webdriver_fingerprint_are_rejected() {
        let (activity, _bans, verifier) = build_verifier();

        let mut request = human_request("test1234@test.com", "203.0.113.20");
        request.device_fingerprint = r#"{"webdriver":true}"#.to_string();

        let outcome = verifier.verify(&request).await;

        let VerificationOutcome::Bot(assessment) = outcome else {
            panic!("bot-shaped request should be rejected");
        };
        // Email pattern (+40) plus WebDriver flag (+90).
        assert_eq!(assessment.risk_score, 130);
        assert!(assessment.is_bot);

        let records = activity.recent(None, 10).await.unwrap();
        assert_eq!(
            records[0].activity_type,
            ActivityType::HumanVerificationFailed
        );
        // The failed record carries the full assessment for audit.
        assert_eq!(records[0].details["riskScore"], 130);
        assert!(records[0].details["reasons"].is_array());
    }

    #[tokio::test]
    async fn test_borderline_score_below_threshold_passes() {
        let (_activity, _bans, verifier) = build_verifier();

        // Missing fingerprint (+30) and invalid phone run (+30) stay below 70.
        let mut request = human_request("jane.doe@example.com", "198.51.100.8");
        request.device_fingerprint = String::new();
        request.phone = Some("2025123456".to_string());

        let outcome = verifier.verify(&request).await;
        let VerificationOutcome::Human(assessment) = outcome else {
            panic!("score 60 should pass");
        };
        assert_eq!(assessment.risk_score, 60);
    }

    #[tokio::test]
    async fn test_evaluators_are_idempotent() {
        let mut request = human_request("bot777@startup.xyz", "203.0.113.5");
        request.user_agent = "Mozilla/5.0 (HeadlessChrome/120.0)".to_string();

        let first = assess(&request);
        let second = assess(&request);

        assert_eq!(first.risk_score, second.risk_score);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.reasons, second.reasons);
    }
}

// ============================================================================
// Ban Ledger Tests
// ============================================================================

mod ban_ledger {
    use super::*;

    #[tokio::test]
    async fn test_banned_email_is_rejected_before_assessment() {
        let (activity, _bans, verifier) = build_verifier();

        verifier
            .ban(
                "scammer@example.com",
                "confirmed fraud ring",
                json!({"riskScore": 210}),
                "203.0.113.50",
            )
            .await
            .unwrap();

        let outcome = verifier
            .verify(&human_request("scammer@example.com", "198.51.100.9"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::Banned));

        // A ban rejection spends no evaluator work and logs no attempt.
        let records = activity.recent(None, 10).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_banned_origin_blocks_other_emails() {
        let (_activity, _bans, verifier) = build_verifier();

        verifier
            .ban(
                "scammer@example.com",
                "confirmed fraud ring",
                json!({}),
                "203.0.113.50",
            )
            .await
            .unwrap();

        let outcome = verifier
            .verify(&human_request("new-identity@example.com", "203.0.113.50"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::Banned));
    }

    #[tokio::test]
    async fn test_repeat_bans_are_all_recorded() {
        let (_activity, bans, verifier) = build_verifier();

        for i in 0..2 {
            verifier
                .ban(
                    "scammer@example.com",
                    "fraud",
                    json!({"occurrence": i}),
                    "203.0.113.50",
                )
                .await
                .unwrap();
        }

        assert_eq!(bans.count().await.unwrap(), 2);
        let recent = bans.recent(10).await.unwrap();
        assert_eq!(recent[0].evidence["occurrence"], 1);
    }
}

// ============================================================================
// Signup Rate Limit Tests
// ============================================================================

mod signup_rate_limit {
    use super::*;

    #[tokio::test]
    async fn test_fourth_attempt_from_origin_is_limited() {
        let (_activity, _bans, verifier) = build_verifier();

        for i in 0..3 {
            let outcome = verifier
                .verify(&human_request(
                    &format!("attempt{}@example.com", i),
                    "203.0.113.9",
                ))
                .await;
            assert!(
                matches!(outcome, VerificationOutcome::Human(_)),
                "attempt {} should be admitted",
                i
            );
        }

        let outcome = verifier
            .verify(&human_request("attempt3@example.com", "203.0.113.9"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::RateLimited));

        // A different origin is unaffected in the same window.
        let outcome = verifier
            .verify(&human_request("elsewhere@example.com", "198.51.100.30"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::Human(_)));
    }

    #[tokio::test]
    async fn test_stale_attempts_fall_out_of_the_window() {
        let activity = Arc::new(InMemoryActivityStore::new());
        let verifier = HumanVerifier::new(
            activity.clone(),
            Arc::new(InMemoryBanStore::new()),
            RiskLimits::default(),
        );

        for _ in 0..3 {
            let mut record = SuspiciousActivityRecord::new(
                "old@example.com",
                ActivityType::SignupAttempt,
                json!({}),
                "203.0.113.9",
            );
            record.timestamp = Utc::now() - Duration::hours(2);
            activity.append(record).await.unwrap();
        }

        let outcome = verifier
            .verify(&human_request("fresh@example.com", "203.0.113.9"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::Human(_)));
    }
}

// ============================================================================
// Fail-Open Tests
// ============================================================================

mod fail_open {
    use super::*;

    #[tokio::test]
    async fn test_ban_read_failure_admits_the_signup() {
        let verifier = HumanVerifier::new(
            Arc::new(InMemoryActivityStore::new()),
            Arc::new(FailingBanStore),
            RiskLimits::default(),
        );

        let outcome = verifier
            .verify(&human_request("jane.doe@example.com", "198.51.100.7"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::Human(_)));
    }

    #[tokio::test]
    async fn test_activity_failure_keeps_the_verdict() {
        let verifier = HumanVerifier::new(
            Arc::new(FailingActivityStore),
            Arc::new(InMemoryBanStore::new()),
            RiskLimits::default(),
        );

        // Rate-limit read fails open; audit write failures are swallowed.
        let outcome = verifier
            .verify(&human_request("jane.doe@example.com", "198.51.100.7"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::Human(_)));

        let mut bot = human_request("spammer99999@mailinator.com", "203.0.113.66");
        bot.device_fingerprint = r#"{"webdriver":true}"#.to_string();
        let outcome = verifier.verify(&bot).await;
        let VerificationOutcome::Bot(assessment) = outcome else {
            panic!("verdict must not change when logging fails");
        };
        assert_eq!(assessment.risk_score, 190);
    }
}

// ============================================================================
// CAPTCHA Logging Tests
// ============================================================================

mod captcha {
    use super::*;

    #[tokio::test]
    async fn test_captcha_completion_is_appended() {
        let (activity, _bans, verifier) = build_verifier();

        verifier
            .record_captcha("jane.doe@example.com", "03AGdBq26x", "198.51.100.7")
            .await;

        let records = activity.recent(None, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].activity_type, ActivityType::CaptchaCompleted);
        assert_eq!(records[0].identity, "jane.doe@example.com");
        assert_eq!(records[0].details["captchaResponse"], "03AGdBq26x");
    }

    #[tokio::test]
    async fn test_captcha_records_do_not_count_against_rate_limit() {
        let (_activity, _bans, verifier) = build_verifier();

        for _ in 0..5 {
            verifier
                .record_captcha("jane.doe@example.com", "03AGdBq26x", "203.0.113.9")
                .await;
        }

        let outcome = verifier
            .verify(&human_request("jane.doe@example.com", "203.0.113.9"))
            .await;
        assert!(matches!(outcome, VerificationOutcome::Human(_)));
    }
}

// ============================================================================
// Audit Query Tests
// ============================================================================

mod audit_queries {
    use super::*;

    #[tokio::test]
    async fn test_stats_aggregate_outcomes() {
        let (activity, bans, verifier) = build_verifier();

        verifier
            .verify(&human_request("jane.doe@example.com", "198.51.100.7"))
            .await;
        let mut bot = human_request("bot4242@example.com", "203.0.113.20");
        bot.device_fingerprint = r#"{"webdriver":true}"#.to_string();
        verifier.verify(&bot).await;
        verifier
            .record_captcha("jane.doe@example.com", "03AGdBq26x", "198.51.100.7")
            .await;
        verifier
            .ban("scammer@example.com", "fraud", json!({}), "203.0.113.50")
            .await
            .unwrap();

        let since = Utc::now() - Duration::hours(24);
        let counts = activity.counts_since(since).await.unwrap();
        assert_eq!(counts.signup_attempts, 2);
        assert_eq!(counts.verifications_passed, 1);
        assert_eq!(counts.verifications_failed, 1);
        assert_eq!(counts.captchas_completed, 1);
        assert_eq!(counts.distinct_origins, 2);
        assert_eq!(bans.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_activity_filters_by_identity() {
        let (activity, _bans, verifier) = build_verifier();

        verifier
            .verify(&human_request("jane.doe@example.com", "198.51.100.7"))
            .await;
        verifier
            .verify(&human_request("john.roe@example.com", "198.51.100.8"))
            .await;

        let records = activity
            .recent(Some("jane.doe@example.com"), 100)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.identity == "jane.doe@example.com"));
    }

    #[tokio::test]
    async fn test_concurrent_verifications_all_get_audited() {
        let (activity, _bans, verifier) = build_verifier();
        let verifier = Arc::new(verifier);

        let mut handles = vec![];
        for i in 0..10 {
            let verifier = verifier.clone();
            handles.push(tokio::spawn(async move {
                verifier
                    .verify(&human_request(
                        &format!("user.{}@example.com", i),
                        &format!("10.1.0.{}", i),
                    ))
                    .await
            }));
        }

        for handle in handles {
            let outcome = handle.await.unwrap();
            assert!(matches!(outcome, VerificationOutcome::Human(_)));
        }

        let records = activity.recent(None, 100).await.unwrap();
        assert_eq!(records.len(), 20);
    }
}
