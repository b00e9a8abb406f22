use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogLookup, ProductInfo};
use crate::schema::products;

/// Catalog port backed by the colocated `products` table.
///
/// The sales service treats the catalog as a foreign system even though
/// this deployment shares one database; swapping this adapter for an HTTP
/// client touches nothing above the port.
pub struct DieselCatalogLookup {
    pool: DbPool,
}

impl DieselCatalogLookup {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogLookup for DieselCatalogLookup {
    fn product(&self, id: Uuid) -> Result<Option<ProductInfo>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::id.eq(id))
            .select((
                products::name,
                products::price,
                products::stock,
                products::image_url,
                products::seller_name,
            ))
            .first::<(String, BigDecimal, i32, Option<String>, Option<String>)>(&mut conn)
            .optional()?;

        Ok(row.map(|(name, price, stock, image_url, seller_name)| ProductInfo {
            name,
            price,
            stock,
            image_url,
            seller_name,
        }))
    }
}
