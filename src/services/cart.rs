//! Session-scoped shopping cart
//!
//! The cart is a view over the cart lines stored in a [`Session`]. Every
//! mutation flags the session as modified; the caller persists it through the
//! session store. Unit prices are captured when a product is first added and
//! never follow later catalog edits.
//!
//! The cart performs no stock validation. Quantity checks against stock are
//! the caller's job (see the cart handlers and checkout).

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{prelude::*, products};
use crate::error::{AppError, AppResult};
use crate::services::session_store::Session;

/// Largest quantity a single cart line can hold; stock columns are `i32`
pub const MAX_LINE_QUANTITY: u32 = i32::MAX as u32;

/// One stored cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: i32,
    pub quantity: u32,
    /// Unit price captured at add-time
    pub price: Decimal,
}

impl CartEntry {
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A cart line resolved against the catalog
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_id: i32,
    /// `None` when the product was deleted after it was added
    pub product: Option<products::Model>,
    pub price: Decimal,
    pub quantity: u32,
    pub total_price: Decimal,
}

pub struct Cart<'a> {
    session: &'a mut Session,
}

impl<'a> Cart<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn entries_mut(&mut self) -> &mut Vec<CartEntry> {
        &mut self.session.data_mut().cart
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.session.data().cart
    }

    /// Add `quantity` of `product`, snapshotting its price on first add.
    ///
    /// A line may never exceed [`MAX_LINE_QUANTITY`]; the cart is left
    /// unchanged when it would.
    pub fn add(&mut self, product: &products::Model, quantity: u32) -> AppResult<()> {
        let current = self
            .position(product.id)
            .map(|index| self.entries()[index].quantity)
            .unwrap_or(0);
        let total = current
            .checked_add(quantity)
            .filter(|total| *total <= MAX_LINE_QUANTITY)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Quantity for {} exceeds the cart limit.",
                    product.name
                ))
            })?;

        match self.position(product.id) {
            Some(index) => self.entries_mut()[index].quantity = total,
            None => {
                let mut price = product.price;
                price.rescale(2);
                self.entries_mut().push(CartEntry {
                    product_id: product.id,
                    quantity: total,
                    price,
                });
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: i32) {
        if let Some(index) = self.position(product_id) {
            self.entries_mut().remove(index);
        }
    }

    /// Overwrite the quantity of an existing line; no-op when absent
    pub fn update(&mut self, product_id: i32, quantity: u32) {
        if let Some(index) = self.position(product_id) {
            self.entries_mut()[index].quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.entries_mut().clear();
    }

    pub fn contains(&self, product_id: i32) -> bool {
        self.position(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn get_total_price(&self) -> Decimal {
        self.entries().iter().map(CartEntry::total_price).sum()
    }

    /// Sum of quantities, i.e. the cart's length
    pub fn get_total_items(&self) -> u64 {
        self.entries().iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Resolve every line against the catalog with a single id-set query.
    ///
    /// Lines come back in insertion order. Each call re-reads the session
    /// and the products, so the result always reflects current state.
    pub async fn items<C: ConnectionTrait>(&self, db: &C) -> AppResult<Vec<CartItem>> {
        let entries = self.entries();
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = entries.iter().map(|e| e.product_id).collect();
        let mut products: HashMap<i32, products::Model> = Products::find()
            .filter(products::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(entries
            .iter()
            .map(|entry| CartItem {
                product_id: entry.product_id,
                product: products.remove(&entry.product_id),
                price: entry.price,
                quantity: entry.quantity,
                total_price: entry.total_price(),
            })
            .collect())
    }

    fn position(&self, product_id: i32) -> Option<usize> {
        self.entries().iter().position(|e| e.product_id == product_id)
    }
}
