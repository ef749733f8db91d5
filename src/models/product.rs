//! Catalog, review, wishlist and vendor product-form models

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{categories, products, reviews};
use crate::error::AppError;

/// Query parameters for GET /api/products
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>, // Category slug
    pub q: Option<String>,        // Matches name or description
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i32,
    pub category_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<i32>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub available: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<products::Model> for ProductResponse {
    fn from(product: products::Model) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            vendor_id: product.vendor_id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: product.price,
            stock: product.stock,
            available: product.available,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<categories::Model> for CategoryResponse {
    fn from(category: categories::Model) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<reviews::Model> for ReviewResponse {
    fn from(review: reviews::Model) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetailResponse {
    pub product: ProductResponse,
    pub reviews: Vec<ReviewResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_review: Option<ReviewResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: String,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if self.comment.trim().is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Vendor create/edit payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductForm {
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    /// Only honoured on edit; new listings are always visible
    #[serde(default)]
    pub available: Option<bool>,
}

impl ProductForm {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Product name cannot be empty".to_string(),
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Price must be greater than zero".to_string(),
            ));
        }
        // NUMERIC(10, 2)
        if self.price.scale() > 2 || self.price >= Decimal::from(100_000_000) {
            return Err(AppError::Validation(
                "Price must have at most 8 integer digits and 2 decimal places".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(AppError::Validation("Stock cannot be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistToggleResponse {
    pub status: String,
    pub added: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistResponse {
    pub products: Vec<ProductResponse>,
}
