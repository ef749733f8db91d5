use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::services::cart::CartItem;

/// Query parameters for POST /api/cart/add/{product_id}
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartQuery {
    pub quantity: Option<u32>, // Default: 1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartActionResponse {
    pub message: String,
    pub cart_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineResponse {
    pub product_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    pub price: Decimal,
    pub quantity: u32,
    pub total_price: Decimal,
}

impl From<CartItem> for CartLineResponse {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.product.as_ref().map(|p| p.name.clone()),
            slug: item.product.as_ref().map(|p| p.slug.clone()),
            stock: item.product.as_ref().map(|p| p.stock),
            price: item.price,
            quantity: item.quantity,
            total_price: item.total_price,
        }
    }
}

/// Cart view, also used as the checkout summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub total_price: Decimal,
    pub total_items: u64,
}
