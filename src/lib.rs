//! TrustGate
//!
//! Signup-time trust scoring engine: decides, for each account-creation
//! attempt, whether the requester is plausibly human or an automated actor.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs      - Crate root with re-exports
//! ├── main.rs     - Server entrypoint
//! ├── config.rs   - Configuration management
//! ├── signals/    - Pure signal evaluators
//! │   ├── email.rs       - Email shape and domain reputation
//! │   ├── phone.rs       - Phone number plausibility
//! │   ├── user_agent.rs  - Bot signatures in the user agent
//! │   ├── behavior.rs    - Form interaction timing
//! │   ├── fingerprint.rs - Client device fingerprint
//! │   └── patterns.rs    - Static pattern tables, domain-age stub
//! ├── risk/       - Risk assessment and workflow
//! │   ├── assessment.rs  - Composite score, confidence, verdict
//! │   ├── rate_limit.rs  - Per-origin signup admission
//! │   └── verifier.rs    - Verification workflow orchestrator
//! ├── store/      - Persistence ports
//! │   ├── memory.rs      - In-memory stores (tests, fallback mode)
//! │   ├── postgres.rs    - PostgreSQL repositories
//! │   └── pool.rs        - Connection pool and schema setup
//! └── api/        - HTTP API endpoints
//!     ├── verify.rs      - Public verification endpoints
//!     ├── admin.rs       - Audit and governance endpoints
//!     └── middleware.rs  - Auth, rate limiting, headers, logging
//! ```

pub mod api;
pub mod config;
pub mod risk;
pub mod signals;
pub mod store;

// Re-export main types for convenience
pub use api::{
    AdminApiState, SecurityMiddlewareConfig, SecurityState, TransportRateLimiter, VerifyApiState,
    create_admin_router, create_verify_router,
};
pub use config::TrustConfig;
pub use risk::{
    HumanVerifier, RiskAssessment, RiskLimits, SignupRateLimiter, VerificationOutcome,
    VerificationRequest, assess, assess_with_limits,
};
pub use signals::{
    BehaviorSample, DomainAgeCheck, SignalReport, SuspiciousTldList, evaluate_behavior,
    evaluate_email, evaluate_email_with, evaluate_fingerprint, evaluate_phone,
    evaluate_user_agent,
};
pub use store::{
    ActivityCounts, ActivityType, BanStore, BannedIdentity, DatabasePool, InMemoryActivityStore,
    InMemoryBanStore, SuspiciousActivityRecord, SuspiciousActivityStore,
};
