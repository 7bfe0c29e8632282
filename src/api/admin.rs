//! Administrative audit and governance endpoints
//!
//! Endpoints:
//!   GET  /api/admin/suspicious-activity -> recent audit records
//!   GET  /api/admin/banned-users        -> recent ban ledger entries
//!   GET  /api/admin/stats               -> aggregate counters
//!   POST /api/admin/ban                 -> append an administrative ban
//!
//! All routes sit behind the admin API-key middleware.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::risk::HumanVerifier;
use crate::store::{
    ActivityCounts, BanStore, BannedIdentity, SuspiciousActivityRecord, SuspiciousActivityStore,
};

/// Hard cap on admin listings.
const MAX_LISTING_LIMIT: i64 = 100;

/// Window for the stats dashboard.
const STATS_WINDOW_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AdminApiState {
    pub activity: Arc<dyn SuspiciousActivityStore>,
    pub bans: Arc<dyn BanStore>,
    pub verifier: Arc<HumanVerifier>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub email: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListResponse {
    pub total: usize,
    pub records: Vec<SuspiciousActivityRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanListResponse {
    pub total: usize,
    pub records: Vec<BannedIdentity>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub window_hours: i64,
    #[serde(flatten)]
    pub activity: ActivityCounts,
    pub banned_identities: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRequest {
    pub email: String,
    pub reason: String,
    #[serde(default)]
    pub evidence: Option<serde_json::Value>,
    #[serde(default)]
    pub network_origin: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BanResponse {
    pub success: bool,
    pub message: String,
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(MAX_LISTING_LIMIT).clamp(1, MAX_LISTING_LIMIT)
}

/// GET /api/admin/suspicious-activity
pub async fn list_suspicious_activity(
    State(state): State<AdminApiState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ActivityListResponse>, (StatusCode, String)> {
    let records = state
        .activity
        .recent(query.email.as_deref(), clamp_limit(query.limit))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load activity records");
            (StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

    Ok(Json(ActivityListResponse {
        total: records.len(),
        records,
    }))
}

/// GET /api/admin/banned-users
pub async fn list_banned_users(
    State(state): State<AdminApiState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<BanListResponse>, (StatusCode, String)> {
    let records = state
        .bans
        .recent(clamp_limit(query.limit))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load ban ledger");
            (StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

    Ok(Json(BanListResponse {
        total: records.len(),
        records,
    }))
}

/// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<AdminApiState>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let since = Utc::now() - Duration::hours(STATS_WINDOW_HOURS);

    let activity = state.activity.counts_since(since).await.map_err(|e| {
        error!(error = %e, "Failed to aggregate activity counts");
        (StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    let banned_identities = state.bans.count().await.map_err(|e| {
        error!(error = %e, "Failed to count ban records");
        (StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    Ok(Json(StatsResponse {
        window_hours: STATS_WINDOW_HOURS,
        activity,
        banned_identities,
    }))
}

/// POST /api/admin/ban
pub async fn ban_identity(
    State(state): State<AdminApiState>,
    Json(payload): Json<BanRequest>,
) -> Response {
    if payload.email.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(BanResponse {
                success: false,
                message: "Email is required.".to_string(),
            }),
        )
            .into_response();
    }

    let evidence = payload.evidence.unwrap_or_else(|| json!({}));
    let origin = payload.network_origin.unwrap_or_default();

    match state
        .verifier
        .ban(&payload.email, &payload.reason, evidence, &origin)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(BanResponse {
                success: true,
                message: "Identity banned.".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to record ban");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BanResponse {
                    success: false,
                    message: "Failed to record ban.".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Create the admin router.
pub fn create_admin_router(state: AdminApiState) -> Router {
    Router::new()
        .route("/suspicious-activity", get(list_suspicious_activity))
        .route("/banned-users", get(list_banned_users))
        .route("/stats", get(get_stats))
        .route("/ban", post(ban_identity))
        .with_state(state)
}
