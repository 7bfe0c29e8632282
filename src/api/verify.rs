//! Public verification endpoints
//!
//! Endpoints:
//!   POST /api/verify-human   -> run a signup attempt through the workflow
//!   POST /api/verify-captcha -> record an externally validated CAPTCHA
//!
//! Network origin and user agent are taken from the transport layer, never
//! from the request body. Risk reasons stay internal; rejected callers see
//! only a generic message.

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use super::middleware::get_client_ip;
use crate::risk::{HumanVerifier, VerificationOutcome, VerificationRequest};
use crate::signals::BehaviorSample;

const MIN_CAPTCHA_RESPONSE_LEN: usize = 3;

#[derive(Clone)]
pub struct VerifyApiState {
    pub verifier: Arc<HumanVerifier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyHumanRequest {
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub behavior_data: Option<BehaviorSample>,
    #[serde(default)]
    pub device_fingerprint: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyHumanResponse {
    pub success: bool,
    pub is_human: bool,
    pub risk_score: u32,
    pub message: String,
}

/// Shape for rejections that carry no verdict (bad request, banned,
/// rate-limited, internal failure).
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCaptchaRequest {
    pub email: String,
    #[serde(default)]
    pub captcha_response: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyCaptchaResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/verify-human
pub async fn verify_human(
    State(state): State<VerifyApiState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<VerifyHumanRequest>,
) -> Response {
    if payload.email.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Email is required.");
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let request = VerificationRequest {
        email: payload.email,
        phone: payload.phone_number,
        network_origin: get_client_ip(&headers, Some(&addr)),
        user_agent,
        behavior: payload.behavior_data,
        device_fingerprint: payload.device_fingerprint.unwrap_or_default(),
    };

    match state.verifier.verify(&request).await {
        VerificationOutcome::Human(assessment) => (
            StatusCode::OK,
            Json(VerifyHumanResponse {
                success: true,
                is_human: true,
                risk_score: assessment.risk_score,
                message: "Human verification successful.".to_string(),
            }),
        )
            .into_response(),
        VerificationOutcome::Bot(assessment) => (
            StatusCode::FORBIDDEN,
            Json(VerifyHumanResponse {
                success: false,
                is_human: false,
                risk_score: assessment.risk_score,
                message: "Bot behavior detected. Signup blocked.".to_string(),
            }),
        )
            .into_response(),
        VerificationOutcome::Banned => error_response(
            StatusCode::FORBIDDEN,
            "This account has been restricted from signing up.",
        ),
        VerificationOutcome::RateLimited => error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many signup attempts. Please try again later.",
        ),
    }
}

/// POST /api/verify-captcha
pub async fn verify_captcha(
    State(state): State<VerifyApiState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<VerifyCaptchaRequest>,
) -> Response {
    let captcha_response = payload.captcha_response.unwrap_or_default();
    if captcha_response.len() < MIN_CAPTCHA_RESPONSE_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(VerifyCaptchaResponse {
                success: false,
                message: "CAPTCHA verification required.".to_string(),
            }),
        )
            .into_response();
    }

    let origin = get_client_ip(&headers, Some(&addr));
    state
        .verifier
        .record_captcha(&payload.email, &captcha_response, &origin)
        .await;

    (
        StatusCode::OK,
        Json(VerifyCaptchaResponse {
            success: true,
            message: "CAPTCHA verified successfully.".to_string(),
        }),
    )
        .into_response()
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Create the public verification router.
pub fn create_verify_router(state: VerifyApiState) -> Router {
    Router::new()
        .route("/verify-human", post(verify_human))
        .route("/verify-captcha", post(verify_captcha))
        .with_state(state)
}
