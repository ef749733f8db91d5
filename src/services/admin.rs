use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::{orders, prelude::*, profiles};
use crate::error::AppResult;
use crate::models::dashboard::AdminDashboardResponse;
use crate::models::order::OrderStatus;
use crate::models::user::Role;

/// Store-wide counters for the admin dashboard
pub async fn dashboard(db: &DatabaseConnection) -> AppResult<AdminDashboardResponse> {
    let total_products = Products::find().count(db).await?;
    let total_orders = Orders::find().count(db).await?;
    let total_users = Users::find().count(db).await?;
    let total_vendors = Profiles::find()
        .filter(profiles::Column::Role.eq(Role::Vendor.to_string()))
        .count(db)
        .await?;
    let pending_orders = Orders::find()
        .filter(orders::Column::Status.eq(OrderStatus::Pending.to_string()))
        .count(db)
        .await?;
    let completed_orders = Orders::find()
        .filter(orders::Column::Status.eq(OrderStatus::Completed.to_string()))
        .count(db)
        .await?;

    Ok(AdminDashboardResponse {
        total_products,
        total_orders,
        total_users,
        total_vendors,
        pending_orders,
        completed_orders,
    })
}
