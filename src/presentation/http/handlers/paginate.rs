use crate::{
    domain::pagination::{envelope::PaginationEnvelope, request::RequestDescriptor},
    presentation::http::{errors::AppError, state::AppState},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use std::time::Instant;
use tracing::{info, instrument};

/// Paginates the records of one registered model.
///
/// The body is an optional JSON request descriptor; an empty body behaves like
/// `{}`. Returns the pagination envelope.
///
/// # Errors
/// - `AppError::NotFound` when no model is registered under `model`
/// - `AppError::BadRequest` for a body that is not a valid request descriptor
/// - `AppError::InvalidArgument` for a non-positive limit or page, or a negative skip
/// - `AppError::Storage` when the record store fails
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn paginate(
    State(state): State<AppState>,
    Path(model): Path<String>,
    body: Bytes,
) -> Result<Json<PaginationEnvelope>, AppError> {
    let start_time = Instant::now();

    let use_case = state
        .registry
        .get(&model)
        .ok_or_else(|| AppError::NotFound(format!("Unknown model `{}`", model)))?;

    let query = parse_body(&body)?;
    let envelope = use_case.execute(query).await?;

    info!(
        "Paginated {} in {:?}: {}..{} of {}",
        model,
        start_time.elapsed(),
        envelope.counters.items_from,
        envelope.counters.items_to,
        envelope.counters.items_total
    );

    Ok(Json(envelope))
}

fn parse_body(body: &[u8]) -> Result<RequestDescriptor, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RequestDescriptor::default());
    }
    Ok(serde_json::from_slice(body)?)
}
