use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;

/// Catalog data the sales service is allowed to see about a product.
#[derive(Debug, Clone)]
pub struct ProductInfo {
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub seller_name: Option<String>,
}

/// Read-side port onto the catalog service.
///
/// Checkout pricing goes through this port every time; cart and order
/// display views use it for name/price/image lookups. `Ok(None)` means the
/// product does not exist (anymore).
pub trait CatalogLookup: Send + Sync {
    fn product(&self, id: Uuid) -> Result<Option<ProductInfo>, DomainError>;
}

/// Read-side port onto the identity service.
pub trait IdentityLookup: Send + Sync {
    fn user_id_by_username(&self, username: &str) -> Result<Option<Uuid>, DomainError>;
    fn username(&self, user_id: Uuid) -> Result<Option<String>, DomainError>;
}
