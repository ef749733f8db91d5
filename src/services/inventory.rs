//! Inventory ledger: the `products.stock` column
//!
//! Stock is only ever changed with single-statement updates so that the
//! check and the write cannot be interleaved by a concurrent checkout.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::{prelude::*, products};
use crate::error::{AppError, AppResult};

/// Current stock for a product, `None` if the product does not exist
pub async fn available_stock<C: ConnectionTrait>(db: &C, product_id: i32) -> AppResult<Option<i32>> {
    Ok(Products::find_by_id(product_id)
        .one(db)
        .await?
        .map(|p| p.stock))
}

/// Compare-and-decrement.
///
/// Runs `UPDATE products SET stock = stock - qty WHERE id = ? AND stock >= qty`
/// and reports whether the row was updated. `false` means the product is
/// short (or gone); nothing was written.
pub async fn try_decrement_stock<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    quantity: i32,
) -> AppResult<bool> {
    let result = Products::update_many()
        .col_expr(
            products::Column::Stock,
            Expr::col(products::Column::Stock).sub(quantity),
        )
        .filter(products::Column::Id.eq(product_id))
        .filter(products::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    tracing::debug!(
        product_id,
        quantity,
        applied = result.rows_affected == 1,
        "Stock decrement"
    );

    Ok(result.rows_affected == 1)
}

/// Put `quantity` units back on the shelf
pub async fn restore_stock<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    quantity: i32,
) -> AppResult<()> {
    let result = Products::update_many()
        .col_expr(
            products::Column::Stock,
            Expr::col(products::Column::Stock).add(quantity),
        )
        .filter(products::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "Product {} not found while restoring stock",
            product_id
        )));
    }

    tracing::debug!(product_id, quantity, "Stock restored");
    Ok(())
}
