use std::sync::Arc;

use diesel::dsl::count_star;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderItemView, OrderSummary};
use crate::domain::ports::CatalogLookup;
use crate::domain::sale::{NewSale, SaleView, UserSaleView};
use crate::schema::{order_items, orders, sales};

use super::models::{NewSaleRow, OrderItemRow, OrderRow, SaleRow};

/// Read-side queries over committed orders. Never mutates.
#[derive(Clone)]
pub struct OrderLedger {
    pool: DbPool,
    catalog: Arc<dyn CatalogLookup>,
}

impl OrderLedger {
    pub fn new(pool: DbPool, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { pool, catalog }
    }

    pub fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
        let counts: Vec<(Uuid, i64)> = order_items::table
            .filter(order_items::order_id.eq_any(&ids))
            .group_by(order_items::order_id)
            .select((order_items::order_id, count_star()))
            .load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|o| {
                let items_count = counts
                    .iter()
                    .find(|(id, _)| *id == o.id)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                OrderSummary {
                    id: o.id,
                    user_id: o.user_id,
                    total: o.total,
                    status: o.status,
                    items_count,
                    created_at: o.created_at,
                }
            })
            .collect())
    }

    /// Items of one order with catalog display fields. Committed lines are
    /// always reported; display fields are `None` when the product has since
    /// left the catalog.
    pub fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = order_items::table
            .filter(order_items::order_id.eq(order_id))
            .select(OrderItemRow::as_select())
            .load(&mut conn)?;
        drop(conn);

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let product = self.catalog.product(row.product_id)?;
            items.push(OrderItemView {
                id: row.id,
                order_id: row.order_id,
                product_id: row.product_id,
                quantity: row.quantity,
                unit_price: row.unit_price,
                subtotal: row.subtotal,
                product_name: product.as_ref().map(|p| p.name.clone()),
                product_image_url: product.and_then(|p| p.image_url),
            });
        }
        Ok(items)
    }
}

/// Sales-ledger reads plus the legacy direct-insert path kept for backward
/// compatibility with pre-orchestrator clients.
#[derive(Clone)]
pub struct SalesLedger {
    pool: DbPool,
    catalog: Arc<dyn CatalogLookup>,
}

impl SalesLedger {
    pub fn new(pool: DbPool, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { pool, catalog }
    }

    pub fn all_sales(&self) -> Result<Vec<SaleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = sales::table
            .order(sales::created_at.desc())
            .select(SaleRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(sale_view).collect())
    }

    /// Products a user has sold, newest-first, with catalog display data.
    pub fn sales_by_user(&self, user_id: Uuid) -> Result<Vec<UserSaleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = sales::table
            .filter(sales::user_id.eq(user_id))
            .order(sales::created_at.desc())
            .select(SaleRow::as_select())
            .load(&mut conn)?;
        drop(conn);

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let product = self.catalog.product(row.product_id)?;
            views.push(UserSaleView {
                sale_id: row.id,
                product_id: row.product_id,
                quantity: row.quantity,
                total: row.total,
                created_at: row.created_at,
                product_name: product.as_ref().map(|p| p.name.clone()),
                product_price: product.as_ref().map(|p| p.price.clone()),
                product_image_url: product.and_then(|p| p.image_url),
            });
        }
        Ok(views)
    }

    /// Legacy direct insertion; bypasses the checkout orchestrator.
    pub fn record_sale(&self, sale: NewSale) -> Result<SaleView, DomainError> {
        if sale.quantity <= 0 {
            return Err(DomainError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(sales::table)
            .values(&NewSaleRow {
                id: Uuid::new_v4(),
                user_id: sale.user_id,
                product_id: sale.product_id,
                quantity: sale.quantity,
                total: sale.total,
                order_id: sale.order_id,
            })
            .returning(SaleRow::as_returning())
            .get_result(&mut conn)?;

        Ok(sale_view(row))
    }
}

fn sale_view(row: SaleRow) -> SaleView {
    SaleView {
        id: row.id,
        user_id: row.user_id,
        product_id: row.product_id,
        quantity: row.quantity,
        total: row.total,
        order_id: row.order_id,
        created_at: row.created_at,
    }
}
