//! API routes.

pub mod health;
pub mod sessions;
pub mod ws;

use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use telemetry::metrics;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Records wall-clock latency for every request.
async fn track_latency(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(req).await;
    metrics()
        .request_latency_ms
        .observe(start.elapsed().as_millis() as u64);
    response
}

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/:id/join", post(sessions::join_session))
        .route("/sessions/:id/vote", post(sessions::cast_vote))
        .route("/sessions/:id/done", post(sessions::mark_done))
        .route("/sessions/:id/results", get(sessions::get_results))
        .route("/sessions/:id/ws", get(ws::ws_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(middleware::from_fn(track_latency))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
