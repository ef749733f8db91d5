use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::models::cart::{CartLineResponse, CartResponse};
use crate::models::order::{
    OrderItemResponse, OrderListResponse, OrderResponse, OrderStatus, PlaceOrderResponse,
    ShippingDetails,
};
use crate::services::{cart::Cart, orders};
use crate::AppState;

/// Checkout summary of the caller's cart
pub async fn checkout(
    State(state): State<AppState>,
    mut auth: AuthUser,
) -> Result<Json<CartResponse>, AppError> {
    let cart = Cart::new(&mut auth.session);
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }
    let items = cart.items(&state.db).await?;

    Ok(Json(CartResponse {
        total_price: cart.get_total_price(),
        total_items: cart.get_total_items(),
        items: items.into_iter().map(CartLineResponse::from).collect(),
    }))
}

pub async fn place_order(
    State(state): State<AppState>,
    mut auth: AuthUser,
    Json(shipping): Json<ShippingDetails>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), AppError> {
    let order = orders::place_order(&state.db, &mut auth.session, auth.user.id, shipping).await?;

    // The order is committed; a failed session write only leaves a stale cart
    if let Err(e) = state.sessions.save(&mut auth.session).await {
        tracing::error!(order_id = order.id, error = %e, "Failed to clear cart after checkout");
    }

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            order_id: order.id,
            total_price: order.total_price,
            status: OrderStatus::Pending,
            message: "Order placed successfully! Please proceed to payment.".to_string(),
        }),
    ))
}

pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<OrderListResponse>, AppError> {
    let orders = orders::list_orders(&state.db, auth.user.id).await?;

    let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(OrderListResponse {
        total_count: orders.len(),
        orders,
    }))
}

pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderResponse>, AppError> {
    let (order, items) = orders::order_with_items(&state.db, auth.user.id, order_id).await?;

    let items = items
        .iter()
        .map(|(item, product)| OrderItemResponse::from_models(item, product.as_ref()))
        .collect();

    Ok(Json(OrderResponse {
        items: Some(items),
        ..OrderResponse::from(order)
    }))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = orders::cancel_order(&state.db, auth.user.id, order_id).await?;
    Ok(Json(order.into()))
}
