//! Fixtures for unit tests that need a database

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use std::sync::Mutex;

use crate::entities::{categories, order_items, orders, products, profiles, users};
use crate::error::AppResult;
use crate::models::order::{OrderStatus, DEFAULT_PAYMENT_METHOD};
use crate::models::user::Role;
use crate::services::catalog::slugify;
use crate::services::mailer::Mailer;

/// Fresh migrated in-memory database. One connection, since every SQLite
/// memory connection is its own database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn create_user(db: &DatabaseConnection, username: &str, role: Role) -> users::Model {
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set("unused".to_string()),
        is_staff: Set(role == Role::Admin),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    profiles::ActiveModel {
        user_id: Set(user.id),
        role: Set(role.to_string()),
        phone: Set(String::new()),
        address: Set(String::new()),
        otp: Set(None),
        is_verified: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    user
}

pub async fn create_category(db: &DatabaseConnection, name: &str) -> categories::Model {
    categories::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slugify(name)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_product(
    db: &DatabaseConnection,
    category_id: i32,
    vendor_id: Option<i32>,
    name: &str,
    price: Decimal,
    stock: i32,
) -> products::Model {
    products::ActiveModel {
        category_id: Set(category_id),
        vendor_id: Set(vendor_id),
        name: Set(name.to_string()),
        slug: Set(slugify(name)),
        description: Set(format!("{} description", name)),
        price: Set(price),
        stock: Set(stock),
        available: Set(true),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// A pending order written directly, bypassing checkout and stock
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i32,
    lines: &[(&products::Model, i32)],
) -> orders::Model {
    let total: Decimal = lines
        .iter()
        .map(|(p, qty)| p.price * Decimal::from(*qty))
        .sum();
    let now = Utc::now().fixed_offset();

    let order = orders::ActiveModel {
        user_id: Set(user_id),
        full_name: Set("Test Buyer".to_string()),
        email: Set("buyer@example.com".to_string()),
        address: Set("1 Test Lane".to_string()),
        total_price: Set(total),
        status: Set(OrderStatus::Pending.to_string()),
        is_paid: Set(false),
        payment_id: Set(None),
        payment_method: Set(DEFAULT_PAYMENT_METHOD.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    for (product, quantity) in lines {
        order_items::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            price: Set(product.price),
            quantity: Set(*quantity),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    order
}

/// Keeps every OTP it is asked to send
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, to: &str, _username: &str, code: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}
