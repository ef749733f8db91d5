//! Order placement and cancellation
//!
//! Checkout converts the session cart into an order and its line items and
//! takes the stock, all inside one database transaction:
//!
//! 1. insert the order (pending, unpaid, total = cart total)
//! 2. for each cart line, in insertion order:
//!    - compare-and-decrement the product's stock; a miss aborts with
//!      [`AppError::StockShortage`]
//!    - insert the order item with the cart's captured unit price
//! 3. commit, then clear the cart
//!
//! Any error rolls the whole transaction back and leaves the cart untouched.
//! Cancellation is the reverse: flip a pending order to cancelled and put
//! every item's quantity back, again atomically.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{order_items, orders, prelude::*, products};
use crate::error::{AppError, AppResult};
use crate::models::order::{OrderStatus, ShippingDetails, DEFAULT_PAYMENT_METHOD};
use crate::services::cart::{Cart, CartItem};
use crate::services::inventory;
use crate::services::session_store::Session;

/// Place an order for everything in the session's cart.
///
/// On success the cart is cleared (the session is flagged modified; the
/// caller persists it). On failure nothing is written and the cart is kept.
pub async fn place_order(
    db: &DatabaseConnection,
    session: &mut Session,
    user_id: i32,
    shipping: ShippingDetails,
) -> AppResult<orders::Model> {
    let cart = Cart::new(session);
    if cart.is_empty() {
        return Err(AppError::EmptyCart);
    }
    let shipping = shipping.validated()?;
    let total_price = cart.get_total_price();

    let txn = db.begin().await?;

    // Products are resolved inside the transaction so the stock we check
    // is the stock we write against
    let lines = cart.items(&txn).await?;

    let order = match write_order(&txn, user_id, &shipping, total_price, lines).await {
        Ok(order) => order,
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "Failed to roll back checkout");
            }
            tracing::warn!(user_id, error = %e, "Checkout aborted");
            return Err(e);
        }
    };

    txn.commit().await?;

    Cart::new(session).clear();

    tracing::info!(
        order_id = order.id,
        user_id,
        total_price = %order.total_price,
        "Order placed"
    );

    Ok(order)
}

async fn write_order(
    txn: &DatabaseTransaction,
    user_id: i32,
    shipping: &ShippingDetails,
    total_price: Decimal,
    lines: Vec<CartItem>,
) -> AppResult<orders::Model> {
    let now = Utc::now().fixed_offset();

    let order = orders::ActiveModel {
        user_id: Set(user_id),
        full_name: Set(shipping.full_name.clone()),
        email: Set(shipping.email.clone()),
        address: Set(shipping.address.clone()),
        total_price: Set(total_price),
        status: Set(OrderStatus::Pending.to_string()),
        is_paid: Set(false),
        payment_id: Set(None),
        payment_method: Set(DEFAULT_PAYMENT_METHOD.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for line in lines {
        let product = line.product.ok_or_else(|| {
            AppError::NotFound(format!("Product {} no longer exists", line.product_id))
        })?;

        let quantity = i32::try_from(line.quantity).map_err(|_| {
            AppError::Validation(format!("Quantity for {} is too large", product.name))
        })?;

        if !inventory::try_decrement_stock(txn, product.id, quantity).await? {
            return Err(AppError::StockShortage {
                product: product.name,
            });
        }

        order_items::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            price: Set(line.price),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    Ok(order)
}

/// Cancel one of the caller's pending orders and restore its stock.
pub async fn cancel_order(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: i32,
) -> AppResult<orders::Model> {
    let txn = db.begin().await?;

    match write_cancellation(&txn, user_id, order_id).await {
        Ok(order) => {
            txn.commit().await?;
            tracing::info!(order_id, user_id, "Order cancelled, stock restored");
            Ok(order)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "Failed to roll back cancellation");
            }
            Err(e)
        }
    }
}

async fn write_cancellation(
    txn: &DatabaseTransaction,
    user_id: i32,
    order_id: i32,
) -> AppResult<orders::Model> {
    let order = find_owned_order(txn, user_id, order_id).await?;

    let status: OrderStatus = order.status.parse().map_err(AppError::Internal)?;
    if !status.is_cancellable() {
        return Err(AppError::InvalidCancellation);
    }

    // Conditional on the status we just read, so two concurrent cancels
    // cannot both restore stock
    let now = Utc::now().fixed_offset();
    let flipped = Orders::update_many()
        .col_expr(
            orders::Column::Status,
            Expr::value(OrderStatus::Cancelled.to_string()),
        )
        .col_expr(orders::Column::UpdatedAt, Expr::value(now))
        .filter(orders::Column::Id.eq(order.id))
        .filter(orders::Column::Status.eq(OrderStatus::Pending.to_string()))
        .exec(txn)
        .await?;
    if flipped.rows_affected == 0 {
        return Err(AppError::InvalidCancellation);
    }

    let items = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order.id))
        .order_by_asc(order_items::Column::Id)
        .all(txn)
        .await?;

    for item in items {
        inventory::restore_stock(txn, item.product_id, item.quantity).await?;
    }

    Ok(orders::Model {
        status: OrderStatus::Cancelled.to_string(),
        updated_at: now,
        ..order
    })
}

/// Look up an order scoped to its owner. Foreign orders are reported as
/// missing, never as forbidden.
pub async fn find_owned_order<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    order_id: i32,
) -> AppResult<orders::Model> {
    Orders::find()
        .filter(orders::Column::Id.eq(order_id))
        .filter(orders::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))
}

/// The caller's orders, newest first
pub async fn list_orders(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<orders::Model>> {
    Ok(Orders::find()
        .filter(orders::Column::UserId.eq(user_id))
        .order_by_desc(orders::Column::CreatedAt)
        .order_by_desc(orders::Column::Id)
        .all(db)
        .await?)
}

/// One of the caller's orders with its line items and their products
pub async fn order_with_items(
    db: &DatabaseConnection,
    user_id: i32,
    order_id: i32,
) -> AppResult<(orders::Model, Vec<(order_items::Model, Option<products::Model>)>)> {
    let order = find_owned_order(db, user_id, order_id).await?;

    let items = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order.id))
        .order_by_asc(order_items::Column::Id)
        .find_also_related(Products)
        .all(db)
        .await?;

    Ok((order, items))
}
