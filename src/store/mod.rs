//! Persistence ports for the trust engine
//!
//! Two append-mostly stores sit behind trait ports so the verification
//! workflow can be wired to PostgreSQL in production and to in-memory fakes
//! in tests:
//! - `SuspiciousActivityStore` - append-only audit trail of every
//!   verification outcome, also the rate limiter's counting source
//! - `BanStore` - permanent ledger of blocked identities
//!
//! Callers treat every port failure as fail-open; the store implementations
//! report errors, they never decide policy.

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::{InMemoryActivityStore, InMemoryBanStore};
pub use pool::DatabasePool;
pub use postgres::{ActivityRepository, BanRepository};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a suspicious-activity record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    SignupAttempt,
    HumanVerificationPassed,
    HumanVerificationFailed,
    CaptchaCompleted,
}

impl ActivityType {
    /// Storage tag, stable across releases.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::SignupAttempt => "signup_attempt",
            ActivityType::HumanVerificationPassed => "human_verification_passed",
            ActivityType::HumanVerificationFailed => "human_verification_failed",
            ActivityType::CaptchaCompleted => "captcha_completed",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "signup_attempt" => Some(ActivityType::SignupAttempt),
            "human_verification_passed" => Some(ActivityType::HumanVerificationPassed),
            "human_verification_failed" => Some(ActivityType::HumanVerificationFailed),
            "captcha_completed" => Some(ActivityType::CaptchaCompleted),
            _ => None,
        }
    }
}

/// One appended audit entry. Never mutated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousActivityRecord {
    /// The email the attempt was made under.
    pub identity: String,
    pub activity_type: ActivityType,
    /// Outcome payload: the risk assessment, or the CAPTCHA submission.
    pub details: Value,
    pub network_origin: String,
    pub timestamp: DateTime<Utc>,
}

impl SuspiciousActivityRecord {
    pub fn new(
        identity: impl Into<String>,
        activity_type: ActivityType,
        details: Value,
        network_origin: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            activity_type,
            details,
            network_origin: network_origin.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A permanently blocked identity, written only by an explicit
/// administrative decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannedIdentity {
    pub email: String,
    pub reason: String,
    pub evidence: Value,
    pub network_origin: String,
    pub banned_at: DateTime<Utc>,
}

impl BannedIdentity {
    pub fn new(
        email: impl Into<String>,
        reason: impl Into<String>,
        evidence: Value,
        network_origin: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            reason: reason.into(),
            evidence,
            network_origin: network_origin.into(),
            banned_at: Utc::now(),
        }
    }
}

/// Aggregate counters over the activity log for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub signup_attempts: i64,
    pub verifications_passed: i64,
    pub verifications_failed: i64,
    pub captchas_completed: i64,
    pub distinct_origins: i64,
}

/// Append-only audit trail of verification outcomes.
#[async_trait]
pub trait SuspiciousActivityStore: Send + Sync {
    /// Append one record. Records are independent inserts; concurrent
    /// writers never overwrite each other.
    async fn append(&self, record: SuspiciousActivityRecord) -> Result<(), String>;

    /// Count signup attempts from one origin since the given instant.
    async fn count_signup_attempts(
        &self,
        origin: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, String>;

    /// Most-recent records, newest first, optionally filtered by identity.
    async fn recent(
        &self,
        identity: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SuspiciousActivityRecord>, String>;

    /// Aggregate counters since the given instant.
    async fn counts_since(&self, since: DateTime<Utc>) -> Result<ActivityCounts, String>;
}

/// Permanent ledger of banned identities.
#[async_trait]
pub trait BanStore: Send + Sync {
    /// Append a ban record. Repeat bans for the same identity are each
    /// recorded; dedup is not required.
    async fn insert(&self, record: BannedIdentity) -> Result<(), String>;

    /// True iff any record matches the email OR the network origin.
    async fn matches(&self, email: &str, origin: &str) -> Result<bool, String>;

    /// Most-recent bans, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<BannedIdentity>, String>;

    async fn count(&self) -> Result<i64, String>;
}
