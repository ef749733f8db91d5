mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

use storefront_backend::entities::products;

use crate::common::{decimal, TestApp};

#[tokio::test]
async fn test_anonymous_cart_flow() {
    let app = TestApp::new().await;
    let session = app.new_session().await;
    let gear = app.create_category("Gear").await;
    let lamp = app.create_product(gear.id, "Head Lamp", dec!(15.00), 4).await;
    let stove = app.create_product(gear.id, "Camp Stove", dec!(40.00), 2).await;

    let (status, json) = app
        .post(&format!("/api/cart/add/{}", lamp.id), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Head Lamp added to cart!");
    assert_eq!(json["cart_count"], 1);

    app.post(&format!("/api/cart/add/{}?quantity=2", lamp.id), Some(&session), None)
        .await;
    app.post(&format!("/api/cart/add/{}", stove.id), Some(&session), None)
        .await;

    let (status, cart) = app.get("/api/cart", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total_items"], 4);
    assert_eq!(decimal(&cart["total_price"]), dec!(85.00));
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items[0]["name"], "Head Lamp");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(decimal(&items[0]["total_price"]), dec!(45.00));

    let (status, json) = app
        .post(
            &format!("/api/cart/update/{}", lamp.id),
            Some(&session),
            Some(json!({"quantity": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart_count"], 2);

    let (status, json) = app
        .post(&format!("/api/cart/remove/{}", stove.id), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart_count"], 1);

    // Removing something never added is harmless
    let (status, json) = app
        .post(&format!("/api/cart/remove/{}", stove.id), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart_count"], 1);

    let (status, _) = app
        .request(Method::DELETE, "/api/cart", Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, cart) = app.get("/api/cart", Some(&session)).await;
    assert_eq!(cart["total_items"], 0);
    assert_eq!(decimal(&cart["total_price"]), dec!(0));
}

#[tokio::test]
async fn test_add_rejects_missing_and_sold_out_products() {
    let app = TestApp::new().await;
    let session = app.new_session().await;
    let gear = app.create_category("Gear").await;
    let sold_out = app.create_product(gear.id, "Rare Map", dec!(99.00), 0).await;

    let (status, json) = app.post("/api/cart/add/9999", Some(&session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, json) = app
        .post(&format!("/api/cart/add/{}", sold_out.id), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Out of stock");

    let (_, cart) = app.get("/api/cart", Some(&session)).await;
    assert_eq!(cart["total_items"], 0);
}

#[tokio::test]
async fn test_update_is_bounded_by_stock() {
    let app = TestApp::new().await;
    let session = app.new_session().await;
    let gear = app.create_category("Gear").await;
    let lamp = app.create_product(gear.id, "Head Lamp", dec!(15.00), 4).await;
    app.post(&format!("/api/cart/add/{}", lamp.id), Some(&session), None)
        .await;

    for quantity in [0, -2, 5] {
        let (status, json) = app
            .post(
                &format!("/api/cart/update/{}", lamp.id),
                Some(&session),
                Some(json!({"quantity": quantity})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid quantity or exceeds stock (4).");
    }

    let (_, cart) = app.get("/api/cart", Some(&session)).await;
    assert_eq!(cart["total_items"], 1);
}

#[tokio::test]
async fn test_cart_keeps_add_time_price() {
    let app = TestApp::new().await;
    let session = app.new_session().await;
    let gear = app.create_category("Gear").await;
    let lamp = app.create_product(gear.id, "Head Lamp", dec!(15.00), 4).await;
    app.post(&format!("/api/cart/add/{}", lamp.id), Some(&session), None)
        .await;

    let mut repriced: products::ActiveModel = lamp.clone().into();
    repriced.price = Set(dec!(19.00));
    repriced.update(&app.db).await.unwrap();

    let (_, cart) = app.get("/api/cart", Some(&session)).await;
    assert_eq!(decimal(&cart["items"][0]["price"]), dec!(15.00));
    assert_eq!(decimal(&cart["total_price"]), dec!(15.00));
}

#[tokio::test]
async fn test_cart_requires_known_session() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = app.get("/api/cart", Some("not-a-session")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_logout_replaces_session_and_cart() {
    let app = TestApp::new().await;
    let session = app.register("grace", "customer").await;
    let gear = app.create_category("Gear").await;
    let lamp = app.create_product(gear.id, "Head Lamp", dec!(15.00), 4).await;
    app.post(&format!("/api/cart/add/{}", lamp.id), Some(&session), None)
        .await;

    let (status, json) = app.post("/api/auth/logout", Some(&session), None).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = json["session_id"].as_str().unwrap().to_string();
    assert_ne!(fresh, session);

    // The old id is gone entirely
    let (status, _) = app.get("/api/cart", Some(&session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, cart) = app.get("/api/cart", Some(&fresh)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total_items"], 0);
    let (status, _) = app.get("/api/profile", Some(&fresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_beyond_line_limit_is_rejected() {
    let app = TestApp::new().await;
    let session = app.new_session().await;
    let gear = app.create_category("Gear").await;
    let lamp = app.create_product(gear.id, "Head Lamp", dec!(15.00), 4).await;

    let (status, json) = app
        .post(
            &format!("/api/cart/add/{}?quantity=4294967295", lamp.id),
            Some(&session),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            &format!("/api/cart/add/{}?quantity=2147483646", lamp.id),
            Some(&session),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .post(&format!("/api/cart/add/{}?quantity=2", lamp.id), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Quantity for Head Lamp exceeds the cart limit.");

    let (status, cart) = app.get("/api/cart", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 2147483646u64);
    assert_eq!(cart["total_items"], 2147483646u64);
}
