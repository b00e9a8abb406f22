use std::sync::Arc;

use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{CartLineView, CartUpdate};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CatalogLookup, IdentityLookup};
use crate::schema::cart_items;

use super::models::{CartItemRow, NewCartItemRow};

/// Owns the per-user cart lines.
///
/// The (user_id, product_id) uniqueness invariant is enforced by the store
/// itself through an atomic upsert, never by caller read-then-write logic.
#[derive(Clone)]
pub struct CartStore {
    pool: DbPool,
    catalog: Arc<dyn CatalogLookup>,
    identity: Arc<dyn IdentityLookup>,
}

impl CartStore {
    pub fn new(
        pool: DbPool,
        catalog: Arc<dyn CatalogLookup>,
        identity: Arc<dyn IdentityLookup>,
    ) -> Self {
        Self {
            pool,
            catalog,
            identity,
        }
    }

    /// Add a product to a user's cart, merging into the existing line when
    /// one exists. Buying your own product is rejected before any write.
    pub fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Uuid, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let product = self
            .catalog
            .product(product_id)?
            .ok_or(DomainError::NotFound)?;

        if let Some(seller_name) = product.seller_name.as_deref() {
            if let Some(buyer_username) = self.identity.username(user_id)? {
                if seller_name == buyer_username {
                    return Err(DomainError::SelfPurchase);
                }
            }
        }

        let mut conn = self.pool.get()?;

        // Atomic merge: two concurrent adds for the same (user, product)
        // cannot both insert; the loser folds its quantity into the winner's
        // row.
        let id = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                quantity,
            })
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
            .returning(cart_items::id)
            .get_result(&mut conn)?;

        Ok(id)
    }

    /// A non-positive quantity deletes the line; a zero quantity is never
    /// stored.
    pub fn set_quantity(&self, item_id: Uuid, quantity: i32) -> Result<CartUpdate, DomainError> {
        let mut conn = self.pool.get()?;

        if quantity <= 0 {
            let deleted = diesel::delete(cart_items::table.find(item_id)).execute(&mut conn)?;
            if deleted == 0 {
                return Err(DomainError::NotFound);
            }
            return Ok(CartUpdate::Removed);
        }

        let updated = diesel::update(cart_items::table.find(item_id))
            .set(cart_items::quantity.eq(quantity))
            .returning(cart_items::id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        updated.map(CartUpdate::Updated).ok_or(DomainError::NotFound)
    }

    pub fn remove_item(&self, item_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(cart_items::table.find(item_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    /// No-op when the cart is already empty.
    pub fn clear_user_cart(&self, user_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(&mut conn)?;
        Ok(())
    }

    /// Display view: lines joined with current catalog name/price/image.
    /// Lines whose product no longer exists drop out, like the join they
    /// replace. Not authoritative for checkout pricing.
    pub fn get_cart(&self, user_id: Uuid) -> Result<Vec<CartLineView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::created_at.desc())
            .select(CartItemRow::as_select())
            .load(&mut conn)?;
        drop(conn);

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(product) = self.catalog.product(row.product_id)? {
                lines.push(CartLineView {
                    id: row.id,
                    user_id: row.user_id,
                    product_id: row.product_id,
                    quantity: row.quantity,
                    created_at: row.created_at,
                    product_name: product.name,
                    product_price: product.price,
                    product_image_url: product.image_url,
                });
            }
        }
        Ok(lines)
    }
}
