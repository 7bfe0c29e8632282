//! Per-origin signup admission
//!
//! Counts signup attempts in the activity log over a trailing window. This
//! limiter is deliberately read-then-compare: two concurrent requests from
//! the same origin can both be admitted at the boundary, which the engine
//! tolerates.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::warn;

use crate::store::SuspiciousActivityStore;

pub struct SignupRateLimiter {
    activity: Arc<dyn SuspiciousActivityStore>,
    limit: i64,
    window: Duration,
}

impl SignupRateLimiter {
    pub fn new(activity: Arc<dyn SuspiciousActivityStore>, limit: i64, window: Duration) -> Self {
        Self {
            activity,
            limit,
            window,
        }
    }

    /// True when the origin may attempt another signup. Fails open on store
    /// errors: availability of signup wins over strict enforcement.
    pub async fn check(&self, origin: &str) -> bool {
        let since = Utc::now() - self.window;
        match self.activity.count_signup_attempts(origin, since).await {
            Ok(count) => count < self.limit,
            Err(e) => {
                warn!(origin = %origin, error = %e, "Rate limit read failed, admitting request");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ActivityType, InMemoryActivityStore, SuspiciousActivityRecord};
    use serde_json::json;

    fn attempt(origin: &str) -> SuspiciousActivityRecord {
        SuspiciousActivityRecord::new(
            "jane.doe@example.com",
            ActivityType::SignupAttempt,
            json!({}),
            origin,
        )
    }

    #[tokio::test]
    async fn test_fourth_attempt_in_window_is_denied() {
        let store = Arc::new(InMemoryActivityStore::new());
        let limiter = SignupRateLimiter::new(store.clone(), 3, Duration::hours(1));

        for _ in 0..3 {
            store.append(attempt("203.0.113.9")).await.unwrap();
        }

        assert!(!limiter.check("203.0.113.9").await);
        assert!(limiter.check("198.51.100.1").await);
    }

    #[tokio::test]
    async fn test_attempts_outside_window_do_not_count() {
        let store = Arc::new(InMemoryActivityStore::new());
        let limiter = SignupRateLimiter::new(store.clone(), 3, Duration::hours(1));

        for _ in 0..3 {
            let mut stale = attempt("203.0.113.9");
            stale.timestamp = Utc::now() - Duration::hours(3);
            store.append(stale).await.unwrap();
        }

        assert!(limiter.check("203.0.113.9").await);
    }
}
