//! Store behavior against a live in-process backend.

mod support;

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use serde_json::json;

use larder::rpc::ApiError;
use support::{Canned, CannedBackend, build_stores};

fn catalog_responses() -> HashMap<String, Canned> {
    let mut responses = HashMap::new();
    responses.insert(
        "/StoreCatalog/_getAllItems".to_owned(),
        Canned::ok(json!([{ "items": ["i-flour", "i-apples"] }]))
            .with_delay(Duration::from_millis(50)),
    );
    responses.insert(
        "/StoreCatalog/_getItemNames".to_owned(),
        Canned::ok(json!([{ "name": "Flour", "names": ["Flour", "AP Flour"] }])),
    );
    responses.insert(
        "/StoreCatalog/_getItemPurchaseOptions".to_owned(),
        Canned::ok(json!([{ "purchaseOptions": ["po-1"] }])),
    );
    responses.insert(
        "/StoreCatalog/_getPurchaseOptionDetails".to_owned(),
        Canned::ok(json!([{
            "quantity": 2,
            "units": "cup",
            "price": "3.50",
            "store": "Wegmans"
        }])),
    );
    responses
}

#[tokio::test]
async fn concurrent_ensure_loaded_issues_one_fetch() {
    let backend = CannedBackend::start(catalog_responses()).await;
    let (stores, _, _) = build_stores(&backend.base);

    let loads = (0..8).map(|_| stores.catalog.ensure_loaded());
    let results = join_all(loads).await;
    assert!(results.iter().all(Result::is_ok));

    // One item-list fetch regardless of caller count.
    assert_eq!(backend.calls_to("/StoreCatalog/_getAllItems"), 1);
    assert!(stores.catalog.is_loaded());

    // A later ensure is a pure cache hit.
    stores.catalog.ensure_loaded().await.expect("cache hit");
    assert_eq!(backend.calls_to("/StoreCatalog/_getAllItems"), 1);
}

#[tokio::test]
async fn loaded_catalog_parses_and_sorts() {
    let backend = CannedBackend::start(catalog_responses()).await;
    let (stores, _, _) = build_stores(&backend.base);

    stores.catalog.ensure_loaded().await.expect("load");
    let items = stores.catalog.items();
    assert_eq!(items.len(), 2);
    // Both canned items answer with the same name; order falls back to
    // stability, and every option parsed its lenient price.
    for item in &items {
        assert_eq!(item.name, "Flour");
        assert_eq!(item.purchase_options.len(), 1);
        assert_eq!(item.purchase_options[0].price, 3.5);
        assert_eq!(item.purchase_options[0].units, "cup");
    }
}

#[tokio::test]
async fn refresh_discards_immediately_and_refetches() {
    let backend = CannedBackend::start(catalog_responses()).await;
    let (stores, _, _) = build_stores(&backend.base);

    stores.catalog.ensure_loaded().await.expect("first load");
    assert_eq!(backend.calls_to("/StoreCatalog/_getAllItems"), 1);
    assert!(!stores.catalog.items().is_empty());

    let refreshing = {
        let catalog = stores.catalog.clone();
        tokio::spawn(async move { catalog.refresh().await })
    };
    // The stale value is gone before the refresh resolves.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!stores.catalog.is_loaded());
    assert!(stores.catalog.items().is_empty());

    refreshing
        .await
        .expect("join refresh")
        .expect("refresh outcome");
    assert_eq!(backend.calls_to("/StoreCatalog/_getAllItems"), 2);
    assert!(stores.catalog.is_loaded());
}

#[tokio::test]
async fn server_failure_leaves_key_absent_and_retries() {
    let backend = CannedBackend::start(HashMap::new()).await;
    backend.set(
        "/StoreCatalog/_getAllItems",
        Canned::error(500, json!({ "error": "catalog exploded" })),
    );
    let (stores, _, _) = build_stores(&backend.base);

    let error = stores.catalog.ensure_loaded().await.expect_err("failure");
    assert_eq!(error, ApiError::server(500, "catalog exploded"));
    assert!(!stores.catalog.is_loaded());
    assert_eq!(
        stores.catalog.error().as_deref(),
        Some("server error (500): catalog exploded")
    );

    // The key stayed absent, so a later ensure retries and succeeds.
    for (path, canned) in catalog_responses() {
        backend.set(&path, canned);
    }
    stores.catalog.ensure_loaded().await.expect("retry");
    assert_eq!(backend.calls_to("/StoreCatalog/_getAllItems"), 2);
    assert!(stores.catalog.is_loaded());
    assert!(stores.catalog.error().is_none());
}

#[tokio::test]
async fn transport_failure_surfaces_and_records() {
    // Nothing listens on port 9; connections are refused.
    let base = url::Url::parse("http://127.0.0.1:9/").expect("url");
    let (stores, _, _) = build_stores(&base);

    let error = stores.catalog.ensure_loaded().await.expect_err("failure");
    assert!(matches!(error, ApiError::Transport { .. }));
    assert!(!stores.catalog.is_loaded());
    assert!(
        stores
            .catalog
            .error()
            .is_some_and(|message| !message.is_empty())
    );
}

#[tokio::test]
async fn login_persists_token_and_authorizes_later_calls() {
    let backend = CannedBackend::start(catalog_responses()).await;
    backend.set(
        "/UserAuthentication/authenticate",
        Canned::ok(json!({ "user": "u-1" })),
    );
    let (stores, _, storage) = build_stores(&backend.base);

    let session = stores.session.login("amy", "hunter2").await.expect("login");
    assert_eq!(session.id, "u-1");
    assert_eq!(session.username, "amy");
    assert_eq!(
        storage
            .get(larder::infra::storage::keys::SESSION_TOKEN)
            .as_deref(),
        Some("u-1")
    );

    stores.catalog.ensure_loaded().await.expect("load");
    assert_eq!(
        backend.last_authorization("/StoreCatalog/_getAllItems"),
        Some("Bearer u-1".to_owned())
    );
}

#[tokio::test]
async fn failed_login_records_error_and_stays_logged_out() {
    let backend = CannedBackend::start(HashMap::new()).await;
    backend.set(
        "/UserAuthentication/authenticate",
        Canned::error(401, json!({ "error": "bad credentials" })),
    );
    let (stores, _, storage) = build_stores(&backend.base);

    let error = stores
        .session
        .login("amy", "wrong")
        .await
        .expect_err("login failure");
    assert_eq!(error, ApiError::server(401, "bad credentials"));
    assert!(!stores.session.is_authenticated());
    assert_eq!(
        stores.session.error().as_deref(),
        Some("server error (401): bad credentials")
    );
    assert!(
        storage
            .get(larder::infra::storage::keys::SESSION_TOKEN)
            .is_none()
    );
}

#[tokio::test]
async fn logout_clears_every_store_through_the_consumer() {
    let backend = CannedBackend::start(catalog_responses()).await;
    backend.set(
        "/UserAuthentication/authenticate",
        Canned::ok(json!({ "user": "u-1" })),
    );
    let (stores, _, storage) = build_stores(&backend.base);

    stores.session.login("amy", "hunter2").await.expect("login");
    stores.catalog.ensure_loaded().await.expect("load");
    assert!(!stores.catalog.items().is_empty());

    stores.session.logout();
    stores.consumer.consume_all();

    assert!(!stores.session.is_authenticated());
    assert!(stores.catalog.items().is_empty());
    assert!(!stores.catalog.is_loaded());
    assert!(
        storage
            .get(larder::infra::storage::keys::SESSION)
            .is_none()
    );
}

#[tokio::test]
async fn menu_detail_errors_are_key_scoped() {
    let backend = CannedBackend::start(HashMap::new()).await;
    backend.set(
        "/MenuCollection/_getMenuDetails",
        Canned::error(404, json!({ "error": "menu not found" })),
    );
    let (stores, _, _) = build_stores(&backend.base);

    let error = stores
        .menu_detail
        .ensure_loaded("m-missing")
        .await
        .expect_err("missing menu");
    assert_eq!(error, ApiError::server(404, "menu not found"));
    assert_eq!(
        stores.menu_detail.error("m-missing").as_deref(),
        Some("server error (404): menu not found")
    );
    assert!(stores.menu_detail.error("m-other").is_none());
    assert!(stores.menu_detail.get("m-missing").is_none());
}

#[tokio::test]
async fn menus_load_sorts_by_date_descending() {
    let backend = CannedBackend::start(HashMap::new()).await;
    backend.set(
        "/MenuCollection/_getMenusOwnedByUser",
        Canned::ok(json!([{ "menus": ["m-1"] }, { "menus": ["m-2"] }])),
    );
    // Details vary by menu id; answer from the request body.
    backend.set(
        "/MenuCollection/_getRecipesInMenu",
        Canned::ok(json!([{ "menuRecipes": { "r-1": 2.0 } }])),
    );
    backend.set(
        "/MenuCollection/_getMenuDetails",
        Canned::ok(json!([{ "name": "Dinner", "date": "2025-11-03", "owner": "u-1" }])),
    );
    backend.set(
        "/UserAuthentication/_getUsername",
        Canned::ok(json!([{ "username": "amy" }])),
    );
    let (stores, _, _) = build_stores(&backend.base);

    stores.menus.ensure_loaded("u-1").await.expect("load");
    let menus = stores.menus.menus();
    assert_eq!(menus.len(), 2);
    assert_eq!(menus[0].recipe_count, 1);

    // A mutation with a newer date resorts to the front.
    stores.menus.update_menu(
        "m-2",
        &larder::cache::MenuPatch {
            date: Some("2025-11-20".parse().expect("date")),
            ..Default::default()
        },
    );
    let menus = stores.menus.menus();
    assert_eq!(menus[0].id, "m-2");
    assert_eq!(menus[1].id, "m-1");
}
