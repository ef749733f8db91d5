//! Starter catalog and admin account provisioning
//!
//! Both operations are idempotent: rows whose slug (or username) already
//! exists are left alone, so the seeder can be re-run against a live store.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::{categories, prelude::*, products, profiles, users};
use crate::error::{AppError, AppResult};
use crate::models::user::Role;
use crate::services::auth::{hash_password, MIN_PASSWORD_LEN};
use crate::services::catalog::slugify;

struct SeedProduct {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    price: Decimal,
    stock: i32,
}

const CATEGORIES: [&str; 3] = ["Electronics", "Home & Kitchen", "Outdoors"];

fn starter_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            category: "Electronics",
            name: "Wireless Earbuds",
            description: "Bluetooth 5.3 earbuds with charging case.",
            price: dec!(49.99),
            stock: 40,
        },
        SeedProduct {
            category: "Electronics",
            name: "USB-C Charger 65W",
            description: "Compact GaN charger with two ports.",
            price: dec!(29.00),
            stock: 25,
        },
        SeedProduct {
            category: "Home & Kitchen",
            name: "Pour-Over Coffee Set",
            description: "Glass carafe, dripper and 100 filters.",
            price: dec!(34.50),
            stock: 15,
        },
        SeedProduct {
            category: "Outdoors",
            name: "Trail Headlamp",
            description: "Rechargeable 400 lumen headlamp.",
            price: dec!(22.00),
            stock: 30,
        },
    ]
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories_created: usize,
    pub products_created: usize,
}

pub async fn seed_catalog(db: &DatabaseConnection) -> AppResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    for name in CATEGORIES {
        let slug = slugify(name);
        let exists = Categories::find()
            .filter(categories::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        categories::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(db)
        .await?;
        summary.categories_created += 1;
    }

    for seed in starter_products() {
        let slug = slugify(seed.name);
        let exists = Products::find()
            .filter(products::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let category = Categories::find()
            .filter(categories::Column::Slug.eq(slugify(seed.category)))
            .one(db)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Missing category {}", seed.category)))?;

        products::ActiveModel {
            category_id: Set(category.id),
            vendor_id: Set(None),
            name: Set(seed.name.to_string()),
            slug: Set(slug),
            description: Set(seed.description.to_string()),
            price: Set(seed.price),
            stock: Set(seed.stock),
            available: Set(true),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        summary.products_created += 1;
    }

    tracing::info!(
        categories = summary.categories_created,
        products = summary.products_created,
        "Catalog seeded"
    );
    Ok(summary)
}

/// Create a staff account with the Admin role; `None` when the username
/// is already taken
pub async fn create_admin(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<Option<users::Model>> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let taken = Users::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?;
    if taken.is_some() {
        tracing::info!(username, "Admin account already exists");
        return Ok(None);
    }

    let password_hash = hash_password(password.to_string()).await?;

    let txn = db.begin().await?;
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        is_staff: Set(true),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    profiles::ActiveModel {
        user_id: Set(user.id),
        role: Set(Role::Admin.to_string()),
        phone: Set(String::new()),
        address: Set(String::new()),
        otp: Set(None),
        is_verified: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(user_id = user.id, username, "Admin account created");
    Ok(Some(user))
}
