use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::extractors::{AuthUser, Viewer};
use crate::models::product::{
    CategoryResponse, CreateReviewRequest, ProductDetailResponse, ProductListResponse,
    ProductQuery, ProductResponse, ReviewResponse,
};
use crate::services::catalog;
use crate::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = catalog::list_categories(&state.db).await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// GET /api/products?category=<slug>&q=<text>
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListResponse>, AppError> {
    let products = catalog::list_products(&state.db, &query).await?;

    tracing::debug!(
        category = ?query.category,
        q = ?query.q,
        count = products.len(),
        "Listed products"
    );

    let products: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(Json(ProductListResponse {
        total_count: products.len(),
        products,
    }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetailResponse>, AppError> {
    let detail = catalog::product_detail(&state.db, &slug, viewer).await?;

    Ok(Json(ProductDetailResponse {
        product: detail.product.into(),
        reviews: detail.reviews.into_iter().map(ReviewResponse::from).collect(),
        user_review: detail.user_review.map(ReviewResponse::from),
    }))
}

pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    let review = catalog::create_review(&state.db, &slug, auth.user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}
