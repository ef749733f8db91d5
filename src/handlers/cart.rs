use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::EntityTrait;

use crate::entities::{prelude::*, products};
use crate::error::AppError;
use crate::extractors::CurrentSession;
use crate::models::cart::{
    AddToCartQuery, CartActionResponse, CartLineResponse, CartResponse, UpdateCartRequest,
};
use crate::services::cart::Cart;
use crate::AppState;

async fn find_product(state: &AppState, product_id: i32) -> Result<products::Model, AppError> {
    Products::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))
}

pub async fn get_cart(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
) -> Result<Json<CartResponse>, AppError> {
    let cart = Cart::new(&mut session);
    let items = cart.items(&state.db).await?;

    Ok(Json(CartResponse {
        total_price: cart.get_total_price(),
        total_items: cart.get_total_items(),
        items: items.into_iter().map(CartLineResponse::from).collect(),
    }))
}

/// POST /api/cart/add/{product_id}?quantity=N
pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    Path(product_id): Path<i32>,
    Query(query): Query<AddToCartQuery>,
) -> Result<Json<CartActionResponse>, AppError> {
    let quantity = query.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let product = find_product(&state, product_id).await?;
    if product.stock < 1 {
        return Err(AppError::Validation("Out of stock".to_string()));
    }

    let mut cart = Cart::new(&mut session);
    cart.add(&product, quantity)?;
    let cart_count = cart.get_total_items();
    state.sessions.save(&mut session).await?;

    tracing::debug!(product_id, quantity, cart_count, "Added to cart");

    Ok(Json(CartActionResponse {
        message: format!("{} added to cart!", product.name),
        cart_count,
    }))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    Path(product_id): Path<i32>,
) -> Result<Json<CartActionResponse>, AppError> {
    let mut cart = Cart::new(&mut session);
    cart.remove(product_id);
    let cart_count = cart.get_total_items();
    state.sessions.save(&mut session).await?;

    Ok(Json(CartActionResponse {
        message: "Item removed from your cart.".to_string(),
        cart_count,
    }))
}

/// Set a line's quantity; it must be positive and covered by current stock
pub async fn update_cart(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    Path(product_id): Path<i32>,
    Json(payload): Json<UpdateCartRequest>,
) -> Result<Json<CartActionResponse>, AppError> {
    let product = find_product(&state, product_id).await?;

    let quantity = payload.quantity;
    if quantity <= 0 || quantity > i64::from(product.stock) {
        return Err(AppError::Validation(format!(
            "Invalid quantity or exceeds stock ({}).",
            product.stock
        )));
    }

    let mut cart = Cart::new(&mut session);
    // Bounded by stock, which is an i32
    cart.update(product_id, quantity as u32);
    let cart_count = cart.get_total_items();
    state.sessions.save(&mut session).await?;

    Ok(Json(CartActionResponse {
        message: "Quantity updated.".to_string(),
        cart_count,
    }))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
) -> Result<Json<CartActionResponse>, AppError> {
    Cart::new(&mut session).clear();
    state.sessions.save(&mut session).await?;

    Ok(Json(CartActionResponse {
        message: "Your cart has been cleared.".to_string(),
        cart_count: 0,
    }))
}
