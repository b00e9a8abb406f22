use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One sales-ledger entry. For sales written by the checkout orchestrator,
/// `user_id` is the **seller's** account and `order_id` links back to the
/// order; legacy standalone entries may carry no order.
#[derive(Debug, Clone)]
pub struct SaleView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total: BigDecimal,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A seller's sale joined with catalog display data.
#[derive(Debug, Clone)]
pub struct UserSaleView {
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub product_name: Option<String>,
    pub product_price: Option<BigDecimal>,
    pub product_image_url: Option<String>,
}

/// Input for the legacy direct-sale endpoint, which bypasses the
/// orchestrator.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total: BigDecimal,
    pub order_id: Option<Uuid>,
}
