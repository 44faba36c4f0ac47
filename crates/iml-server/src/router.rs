use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all ledger endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/movements", post(handler::record_movement))
        .route("/v1/chain", get(handler::get_chain))
        .route("/v1/chain/verify", get(handler::verify_chain))
        .route("/v1/logs", get(handler::list_logs))
        .route("/v1/health", get(handler::health))
        .route("/v1/info", get(handler::info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
