// Routes module - assembles all HTTP endpoints

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::SharedState;
use crate::handlers::*;
use crate::rpc::CALL_PATH;

pub fn router(state: SharedState) -> Router {
    Router::new()
        // ===== CONTRACT CALL GATEWAY =====
        .route(CALL_PATH, post(call_contract))

        // ===== READ-ONLY VIEWS =====
        .route("/markets/:id", get(get_market))
        .route("/pools/:id", get(get_pool))
        .route("/pools/:id/prices", get(get_pool_prices))
        .route("/activity", get(get_activity))

        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))

        // Apply CORS and state
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
