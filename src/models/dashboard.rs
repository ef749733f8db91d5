use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductResponse;

/// Response for GET /api/vendor/dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorDashboardResponse {
    pub products: Vec<ProductResponse>,
    pub product_count: usize,
    pub sales_count: usize,    // Sold line items referencing the vendor's products
    pub total_revenue: Decimal, // Σ price × quantity over those line items
}

/// Response for GET /api/admin/dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboardResponse {
    pub total_products: u64,
    pub total_orders: u64,
    pub total_users: u64,
    pub total_vendors: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
}
