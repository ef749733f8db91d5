use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::models::product::{ProductResponse, WishlistResponse, WishlistToggleResponse};
use crate::services::catalog;
use crate::AppState;

pub async fn get_wishlist(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<WishlistResponse>, AppError> {
    let products = catalog::list_wishlist(&state.db, auth.user.id).await?;
    Ok(Json(WishlistResponse {
        products: products.into_iter().map(ProductResponse::from).collect(),
    }))
}

pub async fn toggle_wishlist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<i32>,
) -> Result<Json<WishlistToggleResponse>, AppError> {
    let toggle = catalog::toggle_wishlist(&state.db, auth.user.id, product_id).await?;
    Ok(Json(WishlistToggleResponse {
        status: "success".to_string(),
        added: toggle.added,
        message: toggle.message,
    }))
}
