//! Week-mapping builds against a live in-process backend.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Json, Router, extract::State, routing::post};
use futures::future::join_all;
use serde_json::{Value, json};

use larder::cache::EventKind;
use support::{build_stores, serve};

#[derive(Clone, Default)]
struct Counts {
    cart_by_date: Arc<AtomicUsize>,
    menus_in_cart: Arc<AtomicUsize>,
    menu_by_date: Arc<AtomicUsize>,
}

/// Week under test: Sunday 2025-11-09 through Saturday 2025-11-15, with
/// cart `c1` holding `M1`, scheduled on Wednesday 2025-11-12. Every other
/// week has no cart.
fn backend_router(counts: Counts) -> Router {
    async fn cart_by_date(State(counts): State<Counts>, Json(body): Json<Value>) -> Json<Value> {
        counts.cart_by_date.fetch_add(1, Ordering::SeqCst);
        if body["date"] == "2025-11-09" {
            Json(json!([{ "cart": "c1" }]))
        } else {
            Json(json!([{ "cart": null }]))
        }
    }

    async fn menus_in_cart(State(counts): State<Counts>, Json(_): Json<Value>) -> Json<Value> {
        counts.menus_in_cart.fetch_add(1, Ordering::SeqCst);
        Json(json!([{ "menus": ["M1"] }]))
    }

    async fn menu_by_date(State(counts): State<Counts>, Json(body): Json<Value>) -> Json<Value> {
        counts.menu_by_date.fetch_add(1, Ordering::SeqCst);
        if body["date"] == "2025-11-12" {
            Json(json!([{ "menu": "M1" }]))
        } else {
            Json(json!([{ "menu": null }]))
        }
    }

    async fn menu_details(Json(_): Json<Value>) -> Json<Value> {
        Json(json!([{ "name": "Wednesday Dinner", "date": "2025-11-12", "owner": "u-9" }]))
    }

    async fn recipes_in_menu(Json(_): Json<Value>) -> Json<Value> {
        Json(json!([{ "menuRecipes": { "r-1": 1.0 } }]))
    }

    async fn recipe_details(Json(_): Json<Value>) -> Json<Value> {
        Json(json!([{ "name": "Lasagna", "dishType": "main", "servingQuantity": 4, "instructions": "bake" }]))
    }

    async fn username(Json(_): Json<Value>) -> Json<Value> {
        Json(json!([{ "username": "jordan" }]))
    }

    async fn add_menu_to_cart(Json(_): Json<Value>) -> Json<Value> {
        Json(json!({ "cart": "c1" }))
    }

    async fn remove_menu_from_cart(Json(_): Json<Value>) -> Json<Value> {
        Json(json!({ "cart": "c1" }))
    }

    Router::new()
        .route("/WeeklyCart/_getCartByDate", post(cart_by_date))
        .route("/WeeklyCart/_getMenusInCart", post(menus_in_cart))
        .route("/WeeklyCart/addMenuToCart", post(add_menu_to_cart))
        .route("/WeeklyCart/removeMenuFromCart", post(remove_menu_from_cart))
        .route("/MenuCollection/_getMenuByDate", post(menu_by_date))
        .route("/MenuCollection/_getMenuDetails", post(menu_details))
        .route("/MenuCollection/_getRecipesInMenu", post(recipes_in_menu))
        .route("/CookBook/_getRecipeDetails", post(recipe_details))
        .route("/UserAuthentication/_getUsername", post(username))
        .with_state(counts)
}

fn date(raw: &str) -> chrono::NaiveDate {
    raw.parse().expect("test date")
}

#[tokio::test]
async fn mapping_places_the_cart_menu_on_its_date() {
    let counts = Counts::default();
    let base = serve(backend_router(counts.clone())).await;
    let (stores, _, _) = build_stores(&base);

    let mapping = stores
        .weekly_cart
        .week_mapping(date("2025-11-12"))
        .await
        .expect("mapping");

    assert_eq!(mapping.len(), 1);
    let placed = mapping.get(&date("2025-11-12")).expect("placed menu");
    assert_eq!(placed.id, "M1");
    assert_eq!(placed.name, "Wednesday Dinner");
    assert_eq!(placed.owner, "u-9");
    assert_eq!(placed.owner_name, "jordan");
    assert_eq!(placed.recipe_names, vec!["Lasagna"]);

    // One date lookup per day of the week.
    assert_eq!(counts.menu_by_date.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn empty_cart_yields_empty_mapping() {
    let counts = Counts::default();
    let base = serve(backend_router(counts.clone())).await;
    let (stores, _, _) = build_stores(&base);

    // A week with no cart at all.
    let mapping = stores
        .weekly_cart
        .week_mapping(date("2025-12-03"))
        .await
        .expect("mapping");
    assert!(mapping.is_empty());
}

#[tokio::test]
async fn concurrent_mapping_requests_share_one_build() {
    let counts = Counts::default();
    let base = serve(backend_router(counts.clone())).await;
    let (stores, _, _) = build_stores(&base);

    let requests = (0..4).map(|_| stores.weekly_cart.week_mapping(date("2025-11-12")));
    let mappings = join_all(requests).await;

    for mapping in mappings {
        assert_eq!(mapping.expect("mapping").len(), 1);
    }
    // The fan-out ran once: seven date lookups and one cart membership
    // read, not four of each.
    assert_eq!(counts.menu_by_date.load(Ordering::SeqCst), 7);
    assert_eq!(counts.menus_in_cart.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cached_mapping_is_reused_until_invalidated() {
    let counts = Counts::default();
    let base = serve(backend_router(counts.clone())).await;
    let (stores, _, _) = build_stores(&base);

    let first = stores
        .weekly_cart
        .week_mapping(date("2025-11-12"))
        .await
        .expect("first mapping");
    let lookups_after_first = counts.menu_by_date.load(Ordering::SeqCst);

    let second = stores
        .weekly_cart
        .week_mapping(date("2025-11-12"))
        .await
        .expect("second mapping");
    assert_eq!(first, second);
    assert_eq!(
        counts.menu_by_date.load(Ordering::SeqCst),
        lookups_after_first
    );
}

#[tokio::test]
async fn removing_the_menu_from_the_cart_empties_the_mapping() {
    let counts = Counts::default();
    let base = serve(backend_router(counts.clone())).await;
    let (stores, _, _) = build_stores(&base);

    let mapping = stores
        .weekly_cart
        .week_mapping(date("2025-11-12"))
        .await
        .expect("mapping");
    assert_eq!(mapping.len(), 1);

    stores
        .weekly_cart
        .remove_menu_from_cart("M1")
        .await
        .expect("remove");
    stores.consumer.consume_all();

    // The membership mirror dropped the menu, so the rebuilt mapping
    // excludes the still-scheduled date.
    let mapping = stores
        .weekly_cart
        .week_mapping(date("2025-11-12"))
        .await
        .expect("rebuilt mapping");
    assert!(mapping.is_empty());
}

#[tokio::test]
async fn menu_change_events_invalidate_the_mapping() {
    let counts = Counts::default();
    let base = serve(backend_router(counts.clone())).await;
    let (stores, _, _) = build_stores(&base);

    stores
        .weekly_cart
        .week_mapping(date("2025-11-12"))
        .await
        .expect("mapping");
    let lookups_before = counts.menu_by_date.load(Ordering::SeqCst);

    // Another store edited M1; the consumer must drop the derived state.
    stores.events.publish(EventKind::MenuUpserted {
        menu_id: "M1".to_owned(),
        date: Some(date("2025-11-12")),
    });
    stores.consumer.consume_all();

    let mapping = stores
        .weekly_cart
        .week_mapping(date("2025-11-12"))
        .await
        .expect("rebuilt mapping");
    assert_eq!(mapping.len(), 1);
    assert!(counts.menu_by_date.load(Ordering::SeqCst) > lookups_before);
}
