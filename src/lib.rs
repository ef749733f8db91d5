// src/lib.rs

use sea_orm::DatabaseConnection;
use services::{mailer::Mailer, session_store::SessionStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sessions: SessionStore,
    pub mailer: Arc<dyn Mailer>,
}

pub mod entities {
    pub mod prelude;
    pub mod users;
    pub mod profiles;
    pub mod categories;
    pub mod products;
    pub mod orders;
    pub mod order_items;
    pub mod reviews;
    pub mod wishlist_items;
}

pub mod services {
    pub mod session_store;
    pub mod cart;
    pub mod inventory;
    pub mod orders;
    pub mod catalog;
    pub mod vendor;
    pub mod admin;
    pub mod auth;
    pub mod mailer;
    pub mod seed;
}

pub mod handlers {
    pub mod sessions;
    pub mod auth;
    pub mod profile;
    pub mod catalog;
    pub mod wishlist;
    pub mod cart;
    pub mod orders;
    pub mod vendor;
    pub mod admin;
}

pub mod config;
pub mod error;
pub mod extractors;
pub mod models;
pub mod routes;

#[cfg(test)]
mod test_support;
