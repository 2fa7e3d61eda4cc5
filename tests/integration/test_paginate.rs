use super::helpers::{
    assert_status, default_config, item_use_case, paginate_items, paginate_request, read_json,
    send, spawn_app,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use paginate::domain::pagination::{
    request::{PaginateOptions, RequestDescriptor},
    resolver::ResolverConfig,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

fn counter(envelope: &Value, name: &str) -> u64 {
    envelope["counters"][name]
        .as_u64()
        .unwrap_or_else(|| panic!("missing counter {}", name))
}

fn item_count(envelope: &Value) -> usize {
    envelope["items"].as_array().expect("items array").len()
}

#[tokio::test]
async fn paginate_without_parameters() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(&app, json!({})).await;

    assert_eq!(counter(&envelope, "itemsTotal"), 49);
    assert_eq!(counter(&envelope, "pageTotal"), 5);
    assert_eq!(counter(&envelope, "itemsPerPage"), 10);
    assert_eq!(counter(&envelope, "itemsFrom"), 0);
    assert_eq!(counter(&envelope, "itemsTo"), 10);
    assert_eq!(item_count(&envelope), 10);
    assert_eq!(envelope["items"][0]["name"], "Item1");
}

#[tokio::test]
async fn paginate_with_empty_body() {
    let app = spawn_app(default_config());
    let req = Request::builder()
        .method("POST")
        .uri("/api/item/paginate")
        .body(Body::empty())
        .expect("failed to build request");

    let res = send(&app, req).await;
    assert_status(res.status(), StatusCode::OK);
    let envelope: Value = read_json(res).await;
    assert_eq!(counter(&envelope, "pageTotal"), 5);
}

#[tokio::test]
async fn paginate_with_where_filter() {
    let app = spawn_app(default_config());
    let envelope =
        paginate_items(&app, json!({ "skip": 0, "limit": 10, "where": { "name": "Item1" } })).await;

    assert_eq!(counter(&envelope, "itemsTotal"), 1);
    assert_eq!(counter(&envelope, "pageTotal"), 1);
    assert_eq!(counter(&envelope, "itemsPerPage"), 10);
    assert_eq!(item_count(&envelope), 1);
}

#[tokio::test]
async fn paginate_with_small_page() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(&app, json!({ "skip": 0, "limit": 4 })).await;

    assert_eq!(counter(&envelope, "itemsTotal"), 49);
    assert_eq!(counter(&envelope, "pageTotal"), 13);
    assert_eq!(counter(&envelope, "itemsPerPage"), 4);
    assert_eq!(item_count(&envelope), 4);
}

#[tokio::test]
async fn paginate_overriding_the_limit() {
    let use_case = item_use_case(default_config());
    let request = RequestDescriptor {
        skip: Some(0),
        limit: Some(10),
        ..Default::default()
    };

    let envelope = use_case
        .execute((request, PaginateOptions::with_limit(4)))
        .await
        .expect("paginate failed");

    assert_eq!(envelope.counters.items_total, 49);
    assert_eq!(envelope.counters.page_total, 13);
    assert_eq!(envelope.counters.items_per_page, 4);
    assert_eq!(envelope.items.len(), 4);
}

#[tokio::test]
async fn paginate_with_a_callback() {
    let use_case = item_use_case(default_config());
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();

    use_case
        .execute_with_callback(RequestDescriptor::default(), move |result| {
            *sink.lock().unwrap() = Some(result);
        })
        .await;

    let result = seen.lock().unwrap().take().expect("callback not invoked");
    let envelope = result.expect("callback received an error");
    assert_eq!(envelope.counters.items_total, 49);
    assert_eq!(envelope.counters.page_total, 5);
    assert_eq!(envelope.counters.items_from, 0);
    assert_eq!(envelope.items.len(), 10);
}

#[tokio::test]
async fn paginate_with_page_when_skip_is_zero() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(&app, json!({ "skip": 0, "limit": 10, "page": 5 })).await;

    assert_eq!(counter(&envelope, "itemsTotal"), 49);
    assert_eq!(counter(&envelope, "pageTotal"), 5);
    assert_eq!(counter(&envelope, "itemsFrom"), 40);
    assert_eq!(item_count(&envelope), 9);
}

#[tokio::test]
async fn paginate_with_page_when_skip_missing() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(&app, json!({ "limit": 6, "page": 9 })).await;

    assert_eq!(counter(&envelope, "itemsTotal"), 49);
    assert_eq!(counter(&envelope, "pageTotal"), 9);
    assert_eq!(counter(&envelope, "itemsPerPage"), 6);
    assert_eq!(counter(&envelope, "itemsFrom"), 48);
    assert_eq!(counter(&envelope, "itemsTo"), 49);
    assert_eq!(item_count(&envelope), 1);
    assert_eq!(envelope["items"][0]["name"], "Item49");
}

#[tokio::test]
async fn max_limit_clamps_the_default() {
    let app = spawn_app(ResolverConfig {
        limit: Some(10),
        max_limit: Some(5),
    });
    let envelope = paginate_items(&app, json!({})).await;

    assert_eq!(counter(&envelope, "itemsPerPage"), 5);
    assert_eq!(counter(&envelope, "pageTotal"), 10);
    assert_eq!(item_count(&envelope), 5);
}

#[tokio::test]
async fn max_limit_clamps_the_request() {
    let app = spawn_app(ResolverConfig {
        limit: Some(10),
        max_limit: Some(5),
    });
    let envelope = paginate_items(&app, json!({ "limit": 40 })).await;
    assert_eq!(counter(&envelope, "itemsPerPage"), 5);
}

#[tokio::test]
async fn wildcard_search_matches_any_field() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(&app, json!({ "searchTerms": { "*": "Item1" } })).await;

    // Item1 and Item10..Item19.
    assert_eq!(counter(&envelope, "itemsTotal"), 11);
    assert_eq!(counter(&envelope, "pageTotal"), 2);
    assert!(
        envelope["items"]
            .as_array()
            .unwrap()
            .iter()
            .all(|item| item["name"].as_str().unwrap().starts_with("Item1"))
    );
}

#[tokio::test]
async fn wildcard_search_is_case_insensitive() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(&app, json!({ "searchTerms": { "*": "ITEM WITH ID4" } })).await;

    // Descriptions "id4" and "id40".."id49".
    assert_eq!(counter(&envelope, "itemsTotal"), 11);
}

#[tokio::test]
async fn search_terms_supersede_where() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(
        &app,
        json!({ "where": { "name": "Item1" }, "searchTerms": { "name": "Item2" } }),
    )
    .await;

    // Item2 and Item20..Item29; the where clause is ignored.
    assert_eq!(counter(&envelope, "itemsTotal"), 11);
}

#[tokio::test]
async fn sort_order_reverses_the_page() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(
        &app,
        json!({ "limit": 3, "sortOrder": { "predicate": "name", "reverse": true }, "order": "name ASC" }),
    )
    .await;

    let names: Vec<&str> = envelope["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Item9", "Item8", "Item7"]);
}

#[tokio::test]
async fn fields_project_each_item() {
    let app = spawn_app(default_config());
    let envelope = paginate_items(&app, json!({ "limit": 2, "fields": ["name"] })).await;

    assert_eq!(envelope["items"], json!([{ "name": "Item1" }, { "name": "Item2" }]));
    assert_eq!(counter(&envelope, "itemsTotal"), 49);
}

#[tokio::test]
async fn invalid_limit_is_a_bad_request() {
    let app = spawn_app(default_config());

    for body in [json!({ "limit": 0 }), json!({ "limit": -3 }), json!({ "page": 0 }), json!({ "skip": -1 })] {
        let res = send(&app, paginate_request("item", body.clone())).await;
        assert_status(res.status(), StatusCode::BAD_REQUEST);
        let payload: Value = read_json(res).await;
        assert!(payload.get("counters").is_none(), "{} returned an envelope", body);
        assert!(payload["error"].is_string());
    }
}

#[tokio::test]
async fn non_numeric_limit_is_a_bad_request() {
    let app = spawn_app(default_config());
    let res = send(&app, paginate_request("item", json!({ "limit": "ten" }))).await;
    assert_status(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_where_is_a_bad_request() {
    let app = spawn_app(default_config());
    let res = send(
        &app,
        paginate_request("item", json!({ "where": { "name": { "regexp": "^I" } } })),
    )
    .await;
    assert_status(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_model_is_not_found() {
    let app = spawn_app(default_config());
    let res = send(&app, paginate_request("ghost", json!({}))).await;
    assert_status(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_failure_returns_no_envelope() {
    let app = spawn_app(default_config());
    let res = send(&app, paginate_request("broken", json!({}))).await;
    assert_status(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let payload: Value = read_json(res).await;
    assert_eq!(payload, json!({ "error": "Record store operation failed" }));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = spawn_app(default_config());
    let res = send(&app, paginate_request("item", json!({}))).await;
    assert!(res.headers().contains_key("x-request-id"));

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .header("x-request-id", "trace-me")
        .body(Body::empty())
        .expect("failed to build health request");
    let res = send(&app, req).await;
    assert_status(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "trace-me");

    let health: Value = read_json(res).await;
    assert_eq!(health["database"], "in-memory");
    assert_eq!(health["models"], json!(["broken", "item"]));
}
