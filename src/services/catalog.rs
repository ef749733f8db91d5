//! Public catalog: categories, product listing and detail, reviews, wishlist

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::{categories, prelude::*, products, reviews, wishlist_items};
use crate::error::{AppError, AppResult};
use crate::models::product::{CreateReviewRequest, ProductQuery};

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// URL slug for a display name: lowercase ASCII words joined by '-'.
/// Accented Latin letters fold to their base letter; anything else outside
/// `[a-z0-9]` acts as a separator.
pub fn slugify(name: &str) -> String {
    let folded: String = name.trim().to_lowercase().chars().map(fold_accent).collect();
    NON_SLUG_CHARS
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Base letter of a lowercase Latin letter carrying a diacritic
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// Escape `LIKE` wildcards so a search term only matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn list_categories(db: &DatabaseConnection) -> AppResult<Vec<categories::Model>> {
    Ok(Categories::find()
        .order_by_asc(categories::Column::Name)
        .all(db)
        .await?)
}

/// Available products, newest first, optionally narrowed by category slug
/// and a case-insensitive search over name and description
pub async fn list_products(
    db: &DatabaseConnection,
    query: &ProductQuery,
) -> AppResult<Vec<products::Model>> {
    let mut select = Products::find().filter(products::Column::Available.eq(true));

    if let Some(category) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
        select = select
            .join(JoinType::InnerJoin, products::Relation::Categories.def())
            .filter(categories::Column::Slug.eq(category.trim()));
    }

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", escape_like(&q.to_lowercase()));
        select = select.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        products::Entity,
                        products::Column::Name,
                    ))))
                    .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        products::Entity,
                        products::Column::Description,
                    ))))
                    .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    Ok(select
        .order_by_desc(products::Column::CreatedAt)
        .order_by_desc(products::Column::Id)
        .all(db)
        .await?)
}

/// An available product by slug; hidden and unknown products are both 404
pub async fn find_available_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> AppResult<products::Model> {
    Products::find()
        .filter(products::Column::Slug.eq(slug))
        .filter(products::Column::Available.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", slug)))
}

pub struct ProductDetail {
    pub product: products::Model,
    pub reviews: Vec<reviews::Model>,
    pub user_review: Option<reviews::Model>,
}

/// Product page data: the product, its reviews newest first, and the
/// viewer's own most recent review when someone is logged in
pub async fn product_detail(
    db: &DatabaseConnection,
    slug: &str,
    viewer: Option<i32>,
) -> AppResult<ProductDetail> {
    let product = find_available_by_slug(db, slug).await?;

    let reviews = product
        .find_related(Reviews)
        .order_by_desc(reviews::Column::CreatedAt)
        .order_by_desc(reviews::Column::Id)
        .all(db)
        .await?;

    let user_review =
        viewer.and_then(|user_id| reviews.iter().find(|r| r.user_id == user_id).cloned());

    Ok(ProductDetail {
        product,
        reviews,
        user_review,
    })
}

pub async fn create_review(
    db: &DatabaseConnection,
    slug: &str,
    user_id: i32,
    request: CreateReviewRequest,
) -> AppResult<reviews::Model> {
    request.validate()?;
    let product = find_available_by_slug(db, slug).await?;

    let review = reviews::ActiveModel {
        product_id: Set(product.id),
        user_id: Set(user_id),
        rating: Set(request.rating),
        comment: Set(request.comment.trim().to_string()),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(product_id = product.id, user_id, rating = review.rating, "Review posted");
    Ok(review)
}

pub struct WishlistToggle {
    pub added: bool,
    pub message: String,
}

/// Add the product to the user's wishlist, or remove it if already there
pub async fn toggle_wishlist(
    db: &DatabaseConnection,
    user_id: i32,
    product_id: i32,
) -> AppResult<WishlistToggle> {
    let product = Products::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

    let existing = WishlistItems::find()
        .filter(wishlist_items::Column::UserId.eq(user_id))
        .filter(wishlist_items::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    let toggle = match existing {
        Some(item) => {
            item.delete(db).await?;
            WishlistToggle {
                added: false,
                message: format!("{} removed from wishlist.", product.name),
            }
        }
        None => {
            wishlist_items::ActiveModel {
                user_id: Set(user_id),
                product_id: Set(product_id),
                ..Default::default()
            }
            .insert(db)
            .await?;
            WishlistToggle {
                added: true,
                message: format!("{} added to wishlist.", product.name),
            }
        }
    };

    tracing::debug!(user_id, product_id, added = toggle.added, "Wishlist toggled");
    Ok(toggle)
}

/// Wishlisted products in the order they were saved
pub async fn list_wishlist(
    db: &DatabaseConnection,
    user_id: i32,
) -> AppResult<Vec<products::Model>> {
    let rows = WishlistItems::find()
        .filter(wishlist_items::Column::UserId.eq(user_id))
        .order_by_asc(wishlist_items::Column::Id)
        .find_also_related(Products)
        .all(db)
        .await?;

    Ok(rows.into_iter().filter_map(|(_, product)| product).collect())
}
