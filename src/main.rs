use anyhow::Result;
use axum::{Router, middleware, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

use trustgate::{
    AdminApiState, DatabasePool, HumanVerifier, InMemoryActivityStore, InMemoryBanStore,
    SecurityMiddlewareConfig, SecurityState, VerifyApiState,
    api::{
        auth_middleware, body_size_middleware, create_admin_router, create_verify_router,
        security_headers_middleware,
    },
    config::TrustConfig,
    store::{BanStore, SuspiciousActivityStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(TrustConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?);

    init_logging(&config)?;

    info!("Starting TrustGate signup verification server");
    info!(
        "Risk settings: bot threshold {}, {} signups per origin per {} min",
        config.risk.bot_score_threshold,
        config.risk.signup_attempt_limit,
        config.risk.signup_window_minutes
    );

    // Wire the persistence ports: PostgreSQL in production, in-memory
    // stores otherwise. Both implement the same traits.
    let (activity, bans): (Arc<dyn SuspiciousActivityStore>, Arc<dyn BanStore>) =
        if config.database.postgres_enabled {
            let db = DatabasePool::new(&config.database.postgres_url)
                .await
                .map_err(|e| anyhow::anyhow!("Database setup failed: {}", e))?;
            db.init_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Schema init failed: {}", e))?;
            (db.activity(), db.bans())
        } else {
            warn!("PostgreSQL disabled - audit trail and ban ledger are in-memory only");
            (
                Arc::new(InMemoryActivityStore::new()),
                Arc::new(InMemoryBanStore::new()),
            )
        };

    let verifier = Arc::new(HumanVerifier::new(
        activity.clone(),
        bans.clone(),
        config.risk.to_limits(),
    ));

    let admin_api_keys = TrustConfig::admin_api_keys();
    if config.security.enable_admin_auth && admin_api_keys.is_empty() {
        warn!("No admin API keys configured - admin endpoints will reject all requests");
    }

    let security_state = SecurityState::new(SecurityMiddlewareConfig {
        enable_admin_auth: config.security.enable_admin_auth,
        admin_api_keys,
        rate_limit_per_minute: config.security.rate_limit_per_minute,
        max_request_size: config.security.max_request_size,
        log_requests: config.logging.log_requests,
        sanitize_logs: config.logging.sanitize_logs,
        ..SecurityMiddlewareConfig::default()
    });

    let app = Router::new()
        .nest(
            "/api",
            create_verify_router(VerifyApiState {
                verifier: verifier.clone(),
            }),
        )
        .nest(
            "/api/admin",
            create_admin_router(AdminApiState {
                activity,
                bans,
                verifier,
            }),
        )
        .route("/health", get(|| async { "OK" }))
        .layer(middleware::from_fn_with_state(
            security_state.clone(),
            body_size_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            security_state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("TrustGate listening on {}", bind_addr);

    // Serve with connect info for client IP extraction
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_logging(config: &TrustConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
