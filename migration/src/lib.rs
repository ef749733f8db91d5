pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_profiles;
mod m20261002_000001_create_categories;
mod m20261002_000002_create_products;
mod m20261003_000001_create_orders;
mod m20261003_000002_create_order_items;
mod m20261005_000001_create_reviews;
mod m20261005_000002_create_wishlist_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_profiles::Migration),
            Box::new(m20261002_000001_create_categories::Migration),
            Box::new(m20261002_000002_create_products::Migration),
            Box::new(m20261003_000001_create_orders::Migration),
            Box::new(m20261003_000002_create_order_items::Migration),
            Box::new(m20261005_000001_create_reviews::Migration),
            Box::new(m20261005_000002_create_wishlist_items::Migration),
        ]
    }
}
