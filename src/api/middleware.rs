//! Transport middleware for the trust engine API
//!
//! Provides:
//! - Admin API-key authentication with a public-path allowlist
//! - Per-IP transport rate limiting (distinct from the domain signup limit)
//! - Request body size limits
//! - Security headers
//! - Request logging with sanitization

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Transport-layer security configuration.
#[derive(Debug, Clone)]
pub struct SecurityMiddlewareConfig {
    /// Require an API key for non-public paths.
    pub enable_admin_auth: bool,
    /// Accepted admin API keys.
    pub admin_api_keys: Vec<String>,
    /// Transport requests per minute per IP.
    pub rate_limit_per_minute: u32,
    /// Maximum request body size in bytes.
    pub max_request_size: usize,
    /// Log every request.
    pub log_requests: bool,
    /// Mask client IPs in logs.
    pub sanitize_logs: bool,
    /// Paths reachable without an API key.
    pub public_paths: Vec<String>,
}

impl Default for SecurityMiddlewareConfig {
    fn default() -> Self {
        Self {
            enable_admin_auth: true,
            admin_api_keys: Vec::new(),
            rate_limit_per_minute: 60,
            max_request_size: 64 * 1024,
            log_requests: true,
            sanitize_logs: true,
            public_paths: vec![
                "/health".to_string(),
                "/api/verify-human".to_string(),
                "/api/verify-captcha".to_string(),
            ],
        }
    }
}

/// Fixed-window transport rate limiter, one counter per client IP.
#[derive(Debug)]
pub struct TransportRateLimiter {
    requests: DashMap<String, (u32, Instant)>,
    limit: u32,
    window: Duration,
}

impl TransportRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests: DashMap::new(),
            limit: requests_per_minute,
            window: Duration::from_secs(60),
        }
    }

    /// Returns (allowed, reset_after_secs).
    pub fn check_request(&self, ip: &str) -> (bool, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(ip.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) >= self.window {
            *count = 0;
            *window_start = now;
        }

        let reset_after = self
            .window
            .checked_sub(now.duration_since(*window_start))
            .map(|d| d.as_secs())
            .unwrap_or(0);

        if *count >= self.limit {
            return (false, reset_after);
        }

        *count += 1;
        (true, reset_after)
    }

    /// Drop counters whose window has long expired.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.requests
            .retain(|_, (_, window_start)| now.duration_since(*window_start) < self.window * 2);
    }
}

/// Shared middleware state.
#[derive(Clone)]
pub struct SecurityState {
    pub config: SecurityMiddlewareConfig,
    pub rate_limiter: Arc<TransportRateLimiter>,
}

impl SecurityState {
    pub fn new(config: SecurityMiddlewareConfig) -> Self {
        let rate_limiter = Arc::new(TransportRateLimiter::new(config.rate_limit_per_minute));
        Self {
            config,
            rate_limiter,
        }
    }
}

/// Extract the client IP, honoring reverse-proxy headers.
pub fn get_client_ip(headers: &HeaderMap, addr: Option<&SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(ip) = value.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            return ip.trim().to_string();
        }
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Mask a value for logging, keeping just enough to correlate.
pub fn sanitize_for_log(value: &str) -> String {
    if value.len() <= 8 {
        return "*".repeat(value.len());
    }
    format!("{}...{}", &value[..4], &value[value.len() - 4..])
}

fn is_public_path(path: &str, public_paths: &[String]) -> bool {
    public_paths.iter().any(|p| path.starts_with(p))
}

/// Admin authentication middleware. Signup verification endpoints stay
/// public; everything else needs a configured API key.
pub async fn auth_middleware(
    State(state): State<SecurityState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = request.uri().path();

    if is_public_path(path, &state.config.public_paths) || !state.config.enable_admin_auth {
        return Ok(next.run(request).await);
    }

    let api_key = headers
        .get("x-api-key")
        .or_else(|| headers.get("authorization"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string());

    match api_key {
        Some(key) if state.config.admin_api_keys.contains(&key) => {
            debug!("Admin key accepted for path: {}", path);
            Ok(next.run(request).await)
        }
        Some(_) => {
            warn!("Invalid admin key attempt for path: {}", path);
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            warn!("Missing admin key for path: {}", path);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Per-IP transport rate limiting middleware.
pub async fn rate_limit_middleware(
    State(state): State<SecurityState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let client_ip = get_client_ip(&headers, Some(&addr));
    let (allowed, reset_after) = state.rate_limiter.check_request(&client_ip);

    if !allowed {
        warn!(
            "Transport rate limit exceeded for IP {} on {}",
            client_ip,
            request.uri().path()
        );

        let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
        response
            .headers_mut()
            .insert("Retry-After", HeaderValue::from(reset_after));
        return Err(response);
    }

    Ok(next.run(request).await)
}

/// Security headers middleware.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        "Cache-Control",
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.remove("Server");

    response
}

/// Request body size validation middleware.
pub async fn body_size_middleware(
    State(state): State<SecurityState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(content_length) = headers.get("content-length") {
        if let Ok(length) = content_length
            .to_str()
            .unwrap_or_default()
            .parse::<usize>()
        {
            if length > state.config.max_request_size {
                warn!(
                    "Request body too large: {} bytes (max: {})",
                    length, state.config.max_request_size
                );
                return Err(StatusCode::PAYLOAD_TOO_LARGE);
            }
        }
    }

    Ok(next.run(request).await)
}

/// Request logging middleware with sanitization.
pub async fn logging_middleware(
    State(state): State<SecurityState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.log_requests {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = get_client_ip(&headers, Some(&addr));

    let log_ip = if state.config.sanitize_logs {
        sanitize_for_log(&client_ip)
    } else {
        client_ip
    };

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            client_ip = %log_ip,
            "Request failed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            client_ip = %log_ip,
            "Client error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            client_ip = %log_ip,
            "Request completed"
        );
    }

    response
}
