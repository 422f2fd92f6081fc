//! # API Module
//!
//! The Madi HTTP server, powered by axum.
//!
//! Serves:
//! - `GET  /health`     — health check
//! - `GET  /resolve`    — trigger resolution from query parameters
//! - `POST /resolve`    — trigger resolution, JSON body over query defaults
//! - `GET  /widget.js`  — embeddable widget script (public, rate limited)
//! - `POST /events`     — analytics ingestion (API key protected)
//! - `GET  /events`     — recent events (API key protected)

pub mod error;
pub mod events;
pub mod resolve;
pub mod widget;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use madi_core::EventStore;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

// =============================================================================
// CONFIGURATION & STATE
// =============================================================================

/// Server configuration, assembled by the CLI.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub db: PathBuf,
    pub api_key: Option<String>,
    pub default_business: Option<String>,
    pub allowed_origins: Vec<String>,
    pub rate_limit: u32,
}

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub default_business: Option<String>,
    pub api_key: Option<String>,
    pub limiter: Arc<DefaultDirectRateLimiter>,
}

impl AppState {
    /// Assemble state around an open store.
    #[must_use]
    pub fn new(
        store: EventStore,
        default_business: Option<String>,
        api_key: Option<String>,
        rate_limit: u32,
    ) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        Self {
            store: Arc::new(store),
            default_business,
            api_key,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

// =============================================================================
// SERVE ERRORS
// =============================================================================

/// Failure to start or run the server.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("store error: {0}")]
    Store(#[from] madi_core::StoreError),

    #[error("invalid bind address {addr}: {reason}")]
    Addr { addr: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// Bearer token auth. Skipped when no api_key is configured.
/// The comparison is constant-time so the key cannot be probed byte-by-byte.
async fn require_api_key(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(ref expected) = state.api_key else {
        // No key configured, allow all requests
        return next.run(req).await;
    };

    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())));

    if authorized {
        next.run(req).await
    } else {
        let body =
            serde_json::json!({ "ok": false, "error": "unauthorized: invalid or missing API key" });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Global rate limit on the public surfaces.
async fn throttle(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    if state.limiter.check().is_err() {
        let body = serde_json::json!({ "ok": false, "error": "rate limit exceeded" });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }
    next.run(req).await
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the axum router.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    // The widget embeds cross-origin, so unset origins mean permissive.
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    // Public, rate-limited surfaces
    let public = Router::new()
        .route(
            "/resolve",
            get(resolve::get_resolve).post(resolve::post_resolve),
        )
        .route("/widget.js", get(widget::widget_script))
        .route_layer(middleware::from_fn_with_state(state.clone(), throttle));

    // API-key protected analytics surfaces
    let protected = Router::new()
        .route(
            "/events",
            get(events::list_events).post(events::record_event),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the server and run until shutdown.
pub async fn serve(config: ServerConfig) -> Result<(), ServeError> {
    let store = EventStore::open(&config.db)?;
    let state = AppState::new(
        store,
        config.default_business,
        config.api_key,
        config.rate_limit,
    );
    let app = build_router(state, &config.allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .map_err(|err: std::net::AddrParseError| ServeError::Addr {
            addr: format!("{}:{}", config.bind, config.port),
            reason: err.to_string(),
        })?;

    tracing::info!("Madi trigger service starting on http://{}", addr);
    tracing::info!("   Resolve:  http://{}/resolve", addr);
    tracing::info!("   Widget:   http://{}/widget.js", addr);
    tracing::info!("   Events:   http://{}/events", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// HANDLERS & HELPERS
// =============================================================================

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Wall-clock unix milliseconds, captured at the app boundary.
/// The core never reads a clock.
pub(crate) fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// TESTS
// =============================================================================
