use super::{
    handlers::{health, paginate},
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Pagination
        .route("/api/{model}/paginate", post(paginate::paginate))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
