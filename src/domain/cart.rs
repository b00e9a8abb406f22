use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One cart line denormalized with current catalog display data.
///
/// Display-only: checkout re-reads catalog prices itself, so this view is
/// never authoritative for pricing.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub product_price: BigDecimal,
    pub product_image_url: Option<String>,
}

/// Outcome of a quantity update: a non-positive quantity deletes the line
/// instead of storing a zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
    Updated(Uuid),
    Removed,
}
