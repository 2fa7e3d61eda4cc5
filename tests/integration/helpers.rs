use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use paginate::{
    application::paginate::{registry::ModelRegistry, use_case::PaginateUseCase},
    domain::{
        model::entity::ModelDefinition,
        pagination::{
            errors::PaginateError,
            resolver::{PaginationResolver, ResolverConfig},
        },
        record::repository::{Record, RecordStore},
        filter::entity::Filter,
        pagination::descriptor::QueryDescriptor,
    },
    infrastructure::repositories::memory_record_store::InMemoryRecordStore,
    presentation::http::{routes::create_router, state::AppState},
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ITEM_COUNT: usize = 49;

/// The 49 records every scenario runs against.
pub fn item_records() -> Vec<Record> {
    (1..=ITEM_COUNT)
        .map(|i| {
            json!({
                "name": format!("Item{}", i),
                "description": format!("This is item with id{}", i),
                "status": "active",
            })
        })
        .collect()
}

pub fn item_model() -> ModelDefinition {
    ModelDefinition::new("item", ["name", "description", "status"])
}

/// Store whose every call fails, standing in for an unreachable database.
pub struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn fetch_page(&self, _descriptor: &QueryDescriptor) -> Result<Vec<Record>, PaginateError> {
        Err(PaginateError::CollaboratorFailure("storage unavailable".into()))
    }

    async fn count_matching(&self, _filter: &Filter) -> Result<u64, PaginateError> {
        Err(PaginateError::CollaboratorFailure("storage unavailable".into()))
    }

    async fn insert(&self, _record: Record) -> Result<(), PaginateError> {
        Err(PaginateError::CollaboratorFailure("storage unavailable".into()))
    }
}

pub fn item_use_case(config: ResolverConfig) -> PaginateUseCase {
    PaginateUseCase::new(
        PaginationResolver::new(item_model(), config),
        Box::new(InMemoryRecordStore::with_records(item_records())),
    )
}

pub fn default_config() -> ResolverConfig {
    ResolverConfig {
        limit: Some(10),
        max_limit: None,
    }
}

/// Router with `item` bound to `config` and `broken` backed by a failing store.
pub fn spawn_app(config: ResolverConfig) -> Router {
    let mut registry = ModelRegistry::new();
    registry.register(item_use_case(config));
    registry.register(PaginateUseCase::new(
        PaginationResolver::new(ModelDefinition::new("broken", ["name"]), default_config()),
        Box::new(UnavailableStore),
    ));

    create_router(AppState { registry, db: None })
}

pub fn paginate_request(model: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/{}/paginate", model))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build paginate request")
}

pub async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse json")
}

pub fn assert_status(status: StatusCode, expected: StatusCode) {
    assert_eq!(status, expected, "expected {}, got {}", expected, status);
}

/// Posts `body` to the `item` model and returns the parsed envelope.
pub async fn paginate_items(app: &Router, body: Value) -> Value {
    let res = send(app, paginate_request("item", body)).await;
    assert_status(res.status(), StatusCode::OK);
    read_json(res).await
}
