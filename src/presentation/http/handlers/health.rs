use crate::{infrastructure::database::pool::ping, presentation::http::state::AppState};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    models: Vec<String>,
    version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db {
        None => "in-memory",
        Some(pool) if ping(pool).await => "up",
        Some(_) => {
            tracing::error!("Health check failed: Database unreachable");
            "down"
        }
    };

    let status = if database == "down" {
        "unhealthy"
    } else {
        "healthy"
    };

    let response = HealthResponse {
        status,
        database,
        models: state.registry.names(),
        version: env!("CARGO_PKG_VERSION"),
    };

    let code = if status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
