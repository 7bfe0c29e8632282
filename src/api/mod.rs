//! HTTP API endpoints for the trust engine
//!
//! Provides REST APIs for:
//! - Public signup verification (human check, CAPTCHA logging)
//! - Administrative audit (activity log, ban ledger, stats, bans)
//! - Transport middleware (admin auth, rate limiting, headers, logging)

pub mod admin;
pub mod middleware;
pub mod verify;

pub use admin::{AdminApiState, create_admin_router};
pub use middleware::{
    SecurityMiddlewareConfig, SecurityState, TransportRateLimiter, auth_middleware,
    body_size_middleware, get_client_ip, logging_middleware, rate_limit_middleware,
    security_headers_middleware,
};
pub use verify::{VerifyApiState, create_verify_router};
