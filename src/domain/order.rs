use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Returned by a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_id: Uuid,
    pub total: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: BigDecimal,
    pub status: String,
    pub items_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One committed order line, with display fields looked up from the
/// catalog at read time. Display fields are `None` when the catalog no
/// longer knows the product; the line itself is still reported because the
/// ledger reflects committed state.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
    pub product_name: Option<String>,
    pub product_image_url: Option<String>,
}
