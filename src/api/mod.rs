//! HTTP trigger surface for the engine
//!
//! The engine holds no timer of its own; an external scheduler (cron
//! worker, scheduled function) POSTs to the trigger endpoint to run one
//! cycle. The trigger requires a shared-secret bearer token and rejects
//! unauthenticated invocations before any engine work happens.
//!
//! ## Endpoints
//!
//! - `POST /api/monitor` - run one check cycle (authenticated)
//! - `GET  /api/health`  - liveness probe (unauthenticated)

pub mod middleware;
pub mod routes;
pub mod state;

pub use state::ApiState;

use std::net::SocketAddr;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use self::middleware::auth::auth_middleware;

/// Trigger server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    pub bind_addr: SocketAddr,

    /// Shared secret the trigger endpoint requires
    pub trigger_secret: String,
}

/// Build the router; split out for in-process testing.
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    let protected = Router::new()
        .route("/api/monitor", post(routes::monitor::run_monitor))
        .route_layer(from_fn_with_state(
            config.trigger_secret.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(routes::health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Spawn the trigger server in a background task.
///
/// Returns the locally bound address (useful with port 0 in tests).
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting trigger server on {}", config.bind_addr);

    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("trigger server exited: {e}");
        }
    });

    Ok(addr)
}
