//! In-memory store implementations
//!
//! Back the verification workflow in tests and in deployments that run
//! without PostgreSQL (`postgres_enabled = false`). Append-only semantics
//! match the SQL implementations; nothing is ever removed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    ActivityCounts, ActivityType, BanStore, BannedIdentity, SuspiciousActivityRecord,
    SuspiciousActivityStore,
};

#[derive(Default)]
pub struct InMemoryActivityStore {
    records: Arc<RwLock<Vec<SuspiciousActivityRecord>>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SuspiciousActivityStore for InMemoryActivityStore {
    async fn append(&self, record: SuspiciousActivityRecord) -> Result<(), String> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn count_signup_attempts(
        &self,
        origin: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, String> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| {
                r.activity_type == ActivityType::SignupAttempt
                    && r.network_origin == origin
                    && r.timestamp >= since
            })
            .count() as i64)
    }

    async fn recent(
        &self,
        identity: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SuspiciousActivityRecord>, String> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| identity.map_or(true, |id| r.identity == id))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn counts_since(&self, since: DateTime<Utc>) -> Result<ActivityCounts, String> {
        let records = self.records.read().await;
        let mut counts = ActivityCounts::default();
        let mut origins = std::collections::HashSet::new();

        for record in records.iter().filter(|r| r.timestamp >= since) {
            match record.activity_type {
                ActivityType::SignupAttempt => counts.signup_attempts += 1,
                ActivityType::HumanVerificationPassed => counts.verifications_passed += 1,
                ActivityType::HumanVerificationFailed => counts.verifications_failed += 1,
                ActivityType::CaptchaCompleted => counts.captchas_completed += 1,
            }
            origins.insert(record.network_origin.clone());
        }

        counts.distinct_origins = origins.len() as i64;
        Ok(counts)
    }
}

#[derive(Default)]
pub struct InMemoryBanStore {
    records: Arc<RwLock<Vec<BannedIdentity>>>,
}

impl InMemoryBanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BanStore for InMemoryBanStore {
    async fn insert(&self, record: BannedIdentity) -> Result<(), String> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn matches(&self, email: &str, origin: &str) -> Result<bool, String> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .any(|r| r.email == email || r.network_origin == origin))
    }

    async fn recent(&self, limit: i64) -> Result<Vec<BannedIdentity>, String> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, String> {
        Ok(self.records.read().await.len() as i64)
    }
}
