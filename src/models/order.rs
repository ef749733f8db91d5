//! Order status, shipping details and order request/response models
//!
//! Status progresses: pending → processing → shipped → completed
//!                       ↘ cancelled
//! Only pending → cancelled is driven by this service; the rest belongs to
//! payment and fulfilment systems.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{order_items, orders, products};
use crate::error::AppError;

/// Payment method recorded on orders placed through checkout
pub const DEFAULT_PAYMENT_METHOD: &str = "COD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// Shipping fields submitted with place-order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub full_name: String,
    pub email: String,
    pub address: String,
}

impl ShippingDetails {
    /// Trims every field and rejects blanks or an email without '@'
    pub fn validated(self) -> Result<Self, AppError> {
        let full_name = self.full_name.trim().to_string();
        let email = self.email.trim().to_string();
        let address = self.address.trim().to_string();

        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if address.is_empty() {
            return Err(AppError::Validation(
                "Shipping address is required".to_string(),
            ));
        }

        Ok(Self {
            full_name,
            email,
            address,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub order_id: i32,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
}

impl OrderItemResponse {
    pub fn from_models(item: &order_items::Model, product: Option<&products::Model>) -> Self {
        Self {
            product_id: item.product_id,
            product_name: product.map(|p| p.name.clone()),
            price: item.price,
            quantity: item.quantity,
            total_price: item.line_total(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub total_price: Decimal,
    pub status: String,
    pub is_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub payment_method: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemResponse>>,
}

impl From<orders::Model> for OrderResponse {
    fn from(order: orders::Model) -> Self {
        Self {
            id: order.id,
            full_name: order.full_name,
            email: order.email,
            address: order.address,
            total_price: order.total_price,
            status: order.status,
            is_paid: order.is_paid,
            payment_id: order.payment_id,
            payment_method: order.payment_method,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total_count: usize,
}
