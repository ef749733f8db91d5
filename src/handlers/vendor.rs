use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::models::common::MessageResponse;
use crate::models::dashboard::VendorDashboardResponse;
use crate::models::product::{ProductForm, ProductResponse};
use crate::services::vendor;
use crate::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<VendorDashboardResponse>, AppError> {
    let summary = vendor::dashboard(&state.db, auth.user.id).await?;

    Ok(Json(VendorDashboardResponse {
        product_count: summary.products.len(),
        products: summary.products.into_iter().map(ProductResponse::from).collect(),
        sales_count: summary.sales_count,
        total_revenue: summary.total_revenue,
    }))
}

pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = vendor::create_product(&state.db, auth.user.id, form).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
    Json(form): Json<ProductForm>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = vendor::update_product(&state.db, auth.user.id, &slug, form).await?;
    Ok(Json(product.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    vendor::delete_product(&state.db, auth.user.id, &slug).await?;
    Ok(Json(MessageResponse::new(format!("Product '{}' deleted.", slug))))
}
