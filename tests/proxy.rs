//! Edge-proxy behavior.

mod support;

use std::collections::HashMap;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use larder::proxy::{ProxyState, router};
use support::{Canned, CannedBackend};

#[tokio::test]
async fn unconfigured_origin_fails_with_json_error() {
    let app = router(ProxyState::new(None));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/MenuCollection/_getMenuDetails")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"menu":"m-1"}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|message| !message.is_empty())
    );
}

#[tokio::test]
async fn strips_api_prefix_and_relays_the_response() {
    let mut responses = HashMap::new();
    responses.insert(
        "/MenuCollection/_getMenuDetails".to_owned(),
        Canned::ok(json!([{ "name": "Dinner", "date": "2025-11-03", "owner": "u-1" }])),
    );
    let origin = CannedBackend::start(responses).await;

    let app = router(ProxyState::new(Some(origin.base.as_str().to_owned())));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/MenuCollection/_getMenuDetails")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, "Bearer u-1")
                .body(Body::from(r#"{"menu":"m-1"}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body[0]["name"], "Dinner");

    // The upstream saw the rewritten path, the forwarded body, and the
    // original bearer header.
    assert_eq!(origin.calls_to("/MenuCollection/_getMenuDetails"), 1);
    assert_eq!(
        origin.last_body("/MenuCollection/_getMenuDetails"),
        Some(json!({ "menu": "m-1" }))
    );
    assert_eq!(
        origin.last_authorization("/MenuCollection/_getMenuDetails"),
        Some("Bearer u-1".to_owned())
    );
}

#[tokio::test]
async fn relays_upstream_error_statuses_verbatim() {
    let mut responses = HashMap::new();
    responses.insert(
        "/StoreCatalog/deleteItem".to_owned(),
        Canned::error(409, json!({ "error": "item is referenced by a recipe" })),
    );
    let origin = CannedBackend::start(responses).await;

    let app = router(ProxyState::new(Some(origin.base.as_str().to_owned())));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/StoreCatalog/deleteItem")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"item":"i-1"}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["error"], "item is referenced by a recipe");
}

#[tokio::test]
async fn unreachable_upstream_answers_bad_gateway() {
    let app = router(ProxyState::new(Some("http://127.0.0.1:9".to_owned())));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/UserAuthentication/_getListOfUsers")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
