// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /rank        (loaded dataset, labels, podium, error statuses)
// - POST /rank/table  (ad hoc table)
// - POST /tree

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use tradeoff_ranker::api::{create_router, AppState, Dataset};
use tradeoff_ranker::config::RankerConfig;
use tradeoff_ranker::ingest::parse_csv;

const BODY_LIMIT: usize = 1024 * 1024;

fn loaded_router() -> Router {
    let dataset = Dataset {
        zscores: parse_csv("ZCusto,ZQual,ZPrazo\n1,2,0\n-1,-2,1\n"),
        names: parse_csv("nome,coordenadas\nAlpha,II.1a\nBeta,I.2\n"),
    };
    create_router(AppState::new(RankerConfig::default(), dataset))
}

fn empty_router() -> Router {
    create_router(AppState::new(RankerConfig::default(), Dataset::default()))
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("json body");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = empty_router().oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "OK");
}

#[tokio::test]
async fn rank_orders_loaded_dataset_and_joins_labels() {
    // unnormalized weights are rescaled to one third each
    let (status, v) = post_json(
        loaded_router(),
        "/rank",
        json!({ "cost": 1.0, "quality": 1.0, "deadline": 1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {v}");

    let items = v["ranking"]["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["index"], 0);
    assert_eq!(items[0]["grade"].as_f64(), Some(5.56));
    assert_eq!(items[1]["grade"].as_f64(), Some(3.89));
    assert_eq!(items[0]["tier"], 1);
    assert_eq!(v["ranking"]["decimals"], 2);

    let sols = v["solutions"].as_array().expect("solutions");
    assert_eq!(sols[0]["name"], "Alpha");
    assert_eq!(sols[0]["coord"], "II.1.a");
    assert_eq!(sols[0]["tierName"], "Gold");
    assert!(sols[0].get("rawCombination").is_some(), "item fields are flattened");

    assert_eq!(v["podium"][0]["place"], 1);
    assert_eq!(v["podium"][0]["best"]["name"], "Alpha");
    assert!(v["computedAt"].is_string());
}

#[tokio::test]
async fn rank_without_dataset_is_unprocessable() {
    let (status, v) = post_json(
        empty_router(),
        "/rank",
        json!({ "cost": 0.2, "quality": 0.5, "deadline": 0.3 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"].as_str().unwrap_or_default().contains("missing"));
}

#[tokio::test]
async fn rank_rejects_negative_weights() {
    let (status, v) = post_json(
        loaded_router(),
        "/rank",
        json!({ "cost": -0.5, "quality": 1.0, "deadline": 0.5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(v["error"].as_str().unwrap_or_default().contains("cost"));
}

#[tokio::test]
async fn rank_table_ranks_adhoc_rows_with_fallback_names() {
    let payload = json!({
        "weights": { "cost": 0.0, "quality": 1.0, "deadline": 0.0 },
        "table": {
            "header": ["zcost", "zqual", "zdeadline"],
            "rows": [
                { "zcost": "0", "zqual": "-3", "zdeadline": "0" },
                { "zcost": "0", "zqual": "3",  "zdeadline": "0" }
            ]
        }
    });
    let (status, v) = post_json(empty_router(), "/rank/table", payload).await;
    assert_eq!(status, StatusCode::OK, "body: {v}");

    let items = v["ranking"]["items"].as_array().expect("items");
    assert_eq!(items[0]["index"], 1);
    assert_eq!(items[0]["grade"].as_f64(), Some(10.0));
    assert_eq!(items[1]["grade"].as_f64(), Some(0.0));
    assert_eq!(v["solutions"][0]["name"], "Sol 2");
}

#[tokio::test]
async fn rank_table_missing_column_is_unprocessable() {
    let payload = json!({
        "weights": { "cost": 0.3, "quality": 0.3, "deadline": 0.4 },
        "table": { "header": ["zcost"], "rows": [ { "zcost": "1" } ] }
    });
    let (status, _) = post_json(empty_router(), "/rank/table", payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn tree_groups_by_roman_primary() {
    let (status, v) = post_json(
        loaded_router(),
        "/tree",
        json!({ "cost": 1.0, "quality": 1.0, "deadline": 1.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {v}");

    let branches = v["tree"]["branches"].as_array().expect("branches");
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0]["primary"], "I");
    assert_eq!(branches[1]["primary"], "II");
    assert_eq!(branches[0]["sections"][0]["label"], "I.2");
    assert_eq!(branches[1]["sections"][0]["leaves"][0]["name"], "Alpha");
}
