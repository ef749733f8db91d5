mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use crate::common::{decimal, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.get("/health", None).await;
    assert_eq!(response.0, StatusCode::OK);
}

#[tokio::test]
async fn test_otp_login() {
    let app = TestApp::new().await;
    app.register("ana", "customer").await;

    let session = app.new_session().await;
    let (status, json) = app
        .post(
            "/api/auth/login",
            Some(&session),
            Some(json!({"username": "ana", "password": "wrong password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid username or password");

    let (status, json) = app
        .post(
            "/api/auth/login",
            Some(&session),
            Some(json!({"username": "ana", "password": "correct horse battery"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["otp_required"], true);

    // Password alone does not log in
    let (status, _) = app.get("/api/profile", Some(&session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/auth/verify-otp",
            Some(&session),
            Some(json!({"username": "ana", "otp": "000000"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let code = app.mailer.code_for("ana").unwrap();
    assert_eq!(code.len(), 6);
    let (status, json) = app
        .post(
            "/api/auth/verify-otp",
            Some(&session),
            Some(json!({"username": "ana", "otp": code})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], "ana");
    assert_eq!(json["is_verified"], true);

    let (status, profile) = app.get("/api/profile", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["role"], "customer");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;
    app.register("ana", "customer").await;
    let session = app.new_session().await;

    let attempts = [
        (json!({"username": "ana", "email": "a@example.com", "password": "long enough"}), StatusCode::CONFLICT),
        (json!({"username": "bo", "email": "b@example.com", "password": "short"}), StatusCode::BAD_REQUEST),
        (json!({"username": "cy", "email": "c@example.com", "password": "long enough", "role": "admin"}), StatusCode::FORBIDDEN),
    ];

    for (body, expected) in attempts {
        let (status, json) = app.post("/api/auth/register", Some(&session), Some(body)).await;
        assert_eq!(status, expected, "{}", json);
    }
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new().await;
    let session = app.register("ana", "customer").await;

    let (status, json) = app
        .request(
            Method::PUT,
            "/api/profile",
            Some(&session),
            Some(json!({"phone": "555-0101", "address": "4 Elm St"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phone"], "555-0101");
    assert_eq!(json["address"], "4 Elm St");
    assert_eq!(json["username"], "ana");
}

#[tokio::test]
async fn test_role_gates() {
    let app = TestApp::new().await;
    let customer = app.register("cara", "customer").await;
    let vendor = app.register("vera", "vendor").await;
    let anonymous = app.new_session().await;

    let (status, json) = app.get("/api/vendor/dashboard", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");

    let (status, _) = app.get("/api/vendor/dashboard", Some(&anonymous)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/admin/dashboard", Some(&vendor)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/vendor/dashboard", Some(&vendor)).await;
    assert_eq!(status, StatusCode::OK);

    let admin = app.admin_session("root").await;
    let (status, json) = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_users"], 3);
    assert_eq!(json["total_vendors"], 1);
    assert_eq!(json["total_orders"], 0);
}

#[tokio::test]
async fn test_vendor_products_and_revenue() {
    let app = TestApp::new().await;
    let vendor = app.register("vera", "vendor").await;
    let buyer = app.register("bea", "customer").await;
    let gear = app.create_category("Gear").await;

    let (status, tarp) = app
        .post(
            "/api/vendor/products",
            Some(&vendor),
            Some(json!({
                "category_id": gear.id,
                "name": "Ripstop Tarp",
                "description": "3x3m",
                "price": "30.00",
                "stock": 5
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", tarp);
    assert_eq!(tarp["slug"], "ripstop-tarp");
    assert_eq!(tarp["available"], true);

    let (status, rope) = app
        .post(
            "/api/vendor/products",
            Some(&vendor),
            Some(json!({
                "category_id": gear.id,
                "name": "Guy Rope",
                "description": "10m",
                "price": "7.25",
                "stock": 10
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = app
        .post(
            "/api/vendor/products",
            Some(&vendor),
            Some(json!({
                "category_id": gear.id,
                "name": "Free Sample",
                "description": "",
                "price": "0",
                "stock": 1
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    app.post(&format!("/api/cart/add/{}?quantity=2", tarp["id"]), Some(&buyer), None)
        .await;
    app.post(&format!("/api/cart/add/{}?quantity=4", rope["id"]), Some(&buyer), None)
        .await;
    let (status, _) = app
        .post(
            "/api/orders",
            Some(&buyer),
            Some(json!({"full_name": "Bea", "email": "bea@example.com", "address": "9 Pine Rd"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, dashboard) = app.get("/api/vendor/dashboard", Some(&vendor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["product_count"], 2);
    assert_eq!(dashboard["sales_count"], 2);
    assert_eq!(decimal(&dashboard["total_revenue"]), dec!(89.00));
    // Newest first
    assert_eq!(dashboard["products"][0]["name"], "Guy Rope");

    // Ordered products stay for order history
    let (status, json) = app
        .request(Method::DELETE, "/api/vendor/products/ripstop-tarp", Some(&vendor), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");

    // Hiding it instead keeps it out of the public catalog
    let (status, json) = app
        .request(
            Method::PUT,
            "/api/vendor/products/ripstop-tarp",
            Some(&vendor),
            Some(json!({
                "category_id": gear.id,
                "name": "Ripstop Tarp",
                "description": "3x3m",
                "price": "30.00",
                "stock": 3,
                "available": false
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["available"], false);

    let (status, _) = app.get("/api/products/ripstop-tarp", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vendor_cannot_touch_foreign_products() {
    let app = TestApp::new().await;
    let owner = app.register("vera", "vendor").await;
    let rival = app.register("otto", "vendor").await;
    let gear = app.create_category("Gear").await;

    let (status, _) = app
        .post(
            "/api/vendor/products",
            Some(&owner),
            Some(json!({
                "category_id": gear.id,
                "name": "Tarp",
                "description": "",
                "price": "30.00",
                "stock": 5
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(Method::DELETE, "/api/vendor/products/tarp", Some(&rival), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::DELETE, "/api/vendor/products/tarp", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_reviews_and_wishlist() {
    let app = TestApp::new().await;
    let session = app.register("ana", "customer").await;
    let gear = app.create_category("Gear").await;
    let food = app.create_category("Food").await;
    let lamp = app.create_product(gear.id, "Head Lamp", dec!(15.00), 4).await;
    app.create_product(food.id, "Trail Mix", dec!(4.00), 20).await;

    let (status, categories) = app.get("/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories[0]["name"], "Food");

    let (_, listing) = app.get("/api/products", None).await;
    assert_eq!(listing["total_count"], 2);
    let (_, listing) = app.get("/api/products?category=gear", None).await;
    assert_eq!(listing["total_count"], 1);
    let (_, listing) = app.get("/api/products?q=mix", None).await;
    assert_eq!(listing["products"][0]["name"], "Trail Mix");

    let (status, _) = app
        .post(
            "/api/products/head-lamp/reviews",
            Some(&session),
            Some(json!({"rating": 5, "comment": "Bright and light"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, detail) = app.get("/api/products/head-lamp", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(detail["user_review"]["rating"], 5);

    let (_, public) = app.get("/api/products/head-lamp", None).await;
    assert!(public.get("user_review").is_none());

    let (status, toggle) = app
        .post(&format!("/api/wishlist/{}/toggle", lamp.id), Some(&session), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggle["added"], true);
    assert_eq!(toggle["status"], "success");

    let (_, wishlist) = app.get("/api/wishlist", Some(&session)).await;
    assert_eq!(wishlist["products"][0]["slug"], "head-lamp");

    let (_, toggle) = app
        .post(&format!("/api/wishlist/{}/toggle", lamp.id), Some(&session), None)
        .await;
    assert_eq!(toggle["added"], false);
    let (_, wishlist) = app.get("/api/wishlist", Some(&session)).await;
    assert!(wishlist["products"].as_array().unwrap().is_empty());
}
