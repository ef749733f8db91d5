//! Vendor product management and sales dashboard
//!
//! Every operation is scoped to the calling vendor: a product owned by
//! someone else is indistinguishable from a missing one.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{order_items, prelude::*, products};
use crate::error::{AppError, AppResult};
use crate::models::product::ProductForm;
use crate::services::catalog::slugify;

pub struct VendorDashboard {
    pub products: Vec<products::Model>,
    pub sales_count: usize,
    pub total_revenue: Decimal,
}

/// The vendor's products (newest id first) and what has sold of them
pub async fn dashboard(db: &DatabaseConnection, vendor_id: i32) -> AppResult<VendorDashboard> {
    let products = Products::find()
        .filter(products::Column::VendorId.eq(vendor_id))
        .order_by_desc(products::Column::Id)
        .all(db)
        .await?;

    let product_ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let sold = if product_ids.is_empty() {
        Vec::new()
    } else {
        OrderItems::find()
            .filter(order_items::Column::ProductId.is_in(product_ids))
            .all(db)
            .await?
    };

    let total_revenue: Decimal = sold.iter().map(order_items::Model::line_total).sum();

    tracing::debug!(
        vendor_id,
        products = products.len(),
        sales = sold.len(),
        revenue = %total_revenue,
        "Vendor dashboard computed"
    );

    Ok(VendorDashboard {
        products,
        sales_count: sold.len(),
        total_revenue,
    })
}

/// List a new product for the vendor; new listings are always available
pub async fn create_product(
    db: &DatabaseConnection,
    vendor_id: i32,
    form: ProductForm,
) -> AppResult<products::Model> {
    form.validate()?;
    ensure_category(db, form.category_id).await?;
    let slug = slug_for(&form.name)?;
    ensure_slug_free(db, &slug, None).await?;

    let product = products::ActiveModel {
        category_id: Set(form.category_id),
        vendor_id: Set(Some(vendor_id)),
        name: Set(form.name.trim().to_string()),
        slug: Set(slug),
        description: Set(form.description),
        price: Set(form.price),
        stock: Set(form.stock),
        available: Set(true),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(vendor_id, product_id = product.id, slug = %product.slug, "Product created");
    Ok(product)
}

/// Edit one of the vendor's products. The slug follows the name.
pub async fn update_product(
    db: &DatabaseConnection,
    vendor_id: i32,
    slug: &str,
    form: ProductForm,
) -> AppResult<products::Model> {
    let existing = find_owned_product(db, vendor_id, slug).await?;
    form.validate()?;
    ensure_category(db, form.category_id).await?;
    let new_slug = slug_for(&form.name)?;
    ensure_slug_free(db, &new_slug, Some(existing.id)).await?;

    let mut product: products::ActiveModel = existing.into();
    product.category_id = Set(form.category_id);
    product.name = Set(form.name.trim().to_string());
    product.slug = Set(new_slug);
    product.description = Set(form.description);
    product.price = Set(form.price);
    product.stock = Set(form.stock);
    product.available = Set(form.available.unwrap_or(true));

    let product = product.update(db).await?;

    tracing::info!(vendor_id, product_id = product.id, "Product updated");
    Ok(product)
}

/// Delete one of the vendor's products. Products that appear on any order
/// are kept so order history stays intact.
pub async fn delete_product(db: &DatabaseConnection, vendor_id: i32, slug: &str) -> AppResult<()> {
    let product = find_owned_product(db, vendor_id, slug).await?;

    let referenced = OrderItems::find()
        .filter(order_items::Column::ProductId.eq(product.id))
        .count(db)
        .await?;
    if referenced > 0 {
        return Err(AppError::Conflict(format!(
            "{} has been ordered and cannot be deleted; mark it unavailable instead",
            product.name
        )));
    }

    let product_id = product.id;
    product.delete(db).await?;

    tracing::info!(vendor_id, product_id, "Product deleted");
    Ok(())
}

pub async fn find_owned_product(
    db: &DatabaseConnection,
    vendor_id: i32,
    slug: &str,
) -> AppResult<products::Model> {
    Products::find()
        .filter(products::Column::Slug.eq(slug))
        .filter(products::Column::VendorId.eq(vendor_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", slug)))
}

fn slug_for(name: &str) -> AppResult<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Product name must contain letters or digits".to_string(),
        ));
    }
    Ok(slug)
}

async fn ensure_category(db: &DatabaseConnection, category_id: i32) -> AppResult<()> {
    if Categories::find_by_id(category_id).one(db).await?.is_none() {
        return Err(AppError::Validation(format!(
            "Category {} does not exist",
            category_id
        )));
    }
    Ok(())
}

async fn ensure_slug_free(db: &DatabaseConnection, slug: &str, except: Option<i32>) -> AppResult<()> {
    let mut query = Products::find().filter(products::Column::Slug.eq(slug));
    if let Some(id) = except {
        query = query.filter(products::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "A product with slug '{}' already exists",
            slug
        )));
    }
    Ok(())
}
