use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::extractors::{require_admin, require_vendor};
use crate::handlers::{admin, auth, cart, catalog, orders, profile, sessions, vendor, wishlist};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let account = Router::new()
        .route("/api/sessions", post(sessions::create_session))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        );

    let shop = Router::new()
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/{slug}", get(catalog::get_product))
        .route("/api/products/{slug}/reviews", post(catalog::create_review))
        .route("/api/wishlist", get(wishlist::get_wishlist))
        .route(
            "/api/wishlist/{product_id}/toggle",
            post(wishlist::toggle_wishlist),
        )
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/add/{product_id}", post(cart::add_to_cart))
        .route("/api/cart/remove/{product_id}", post(cart::remove_from_cart))
        .route("/api/cart/update/{product_id}", post(cart::update_cart));

    let ordering = Router::new()
        .route("/api/orders/checkout", get(orders::checkout))
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::place_order),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/cancel", post(orders::cancel_order));

    // Role-gated groups
    let vendor_routes = Router::new()
        .route("/api/vendor/dashboard", get(vendor::dashboard))
        .route("/api/vendor/products", post(vendor::create_product))
        .route(
            "/api/vendor/products/{slug}",
            put(vendor::update_product).delete(vendor::delete_product),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_vendor));

    let admin_routes = Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(sessions::health))
        .merge(account)
        .merge(shop)
        .merge(ordering)
        .merge(vendor_routes)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
