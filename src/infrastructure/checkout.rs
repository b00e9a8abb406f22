use std::sync::Arc;

use bigdecimal::{BigDecimal, RoundingMode};
use diesel::prelude::*;
use uuid::Uuid;

use crate::application::attribution::SellerResolver;
use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::CheckoutReceipt;
use crate::domain::ports::CatalogLookup;
use crate::schema::{cart_items, order_items, orders, sales};

use super::models::{CartItemRow, NewOrderItemRow, NewOrderRow, NewSaleRow};

struct PricedLine {
    product_id: Uuid,
    quantity: i32,
    unit_price: BigDecimal,
    subtotal: BigDecimal,
}

/// Drives the atomic cart → order → sales transition.
///
/// Everything from the order insert to the cart delete happens in one
/// database transaction; nothing is visible to readers until commit, and
/// any failure rolls the whole step back, leaving the cart untouched.
#[derive(Clone)]
pub struct CheckoutService {
    pool: DbPool,
    catalog: Arc<dyn CatalogLookup>,
    resolver: SellerResolver,
}

impl CheckoutService {
    pub fn new(pool: DbPool, catalog: Arc<dyn CatalogLookup>, resolver: SellerResolver) -> Self {
        Self {
            pool,
            catalog,
            resolver,
        }
    }

    pub fn checkout(&self, user_id: Uuid) -> Result<CheckoutReceipt, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Lock the cart rows for the duration of the transaction. A
            // concurrent checkout for the same user blocks here, and once
            // this transaction commits it re-reads an empty cart: exactly
            // one order per cart snapshot.
            let cart: Vec<CartItemRow> = cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .select(CartItemRow::as_select())
                .for_update()
                .load(conn)?;

            // Price snapshot at the moment of checkout. Lines whose product
            // vanished from the catalog drop out, matching the join
            // semantics of the cart view.
            let mut priced = Vec::with_capacity(cart.len());
            for line in &cart {
                if let Some(product) = self.catalog.product(line.product_id)? {
                    let subtotal = (product.price.clone() * BigDecimal::from(line.quantity))
                        .with_scale_round(2, RoundingMode::HalfUp);
                    priced.push(PricedLine {
                        product_id: line.product_id,
                        quantity: line.quantity,
                        unit_price: product.price,
                        subtotal,
                    });
                }
            }

            if priced.is_empty() {
                // Detected before any write; no rollback needed.
                return Err(DomainError::Validation("cart is empty".to_string()));
            }

            let total = priced
                .iter()
                .fold(BigDecimal::from(0), |acc, line| acc + line.subtotal.clone());

            // Checkout is synchronous and immediately final in this scope.
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    total: total.clone(),
                    status: "completed".to_string(),
                })
                .execute(conn)?;

            let new_items: Vec<NewOrderItemRow> = priced
                .iter()
                .map(|line| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price.clone(),
                    subtotal: line.subtotal.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            // Attribute each sold line to its seller. An unresolved seller
            // is a documented gap: the order commits, the line just gets no
            // ledger entry.
            for line in &priced {
                if let Some(seller_id) = self.resolver.resolve_seller(line.product_id)? {
                    diesel::insert_into(sales::table)
                        .values(&NewSaleRow {
                            id: Uuid::new_v4(),
                            user_id: seller_id,
                            product_id: line.product_id,
                            quantity: line.quantity,
                            total: line.subtotal.clone(),
                            order_id: Some(order_id),
                        })
                        .execute(conn)?;
                }
            }

            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                .execute(conn)?;

            log::info!(
                "checkout committed: user={} order={} lines={} total={}",
                user_id,
                order_id,
                new_items.len(),
                total
            );

            Ok(CheckoutReceipt { order_id, total })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use diesel::prelude::*;
    use uuid::Uuid;

    use super::CheckoutService;
    use crate::application::attribution::SellerResolver;
    use crate::db::DbPool;
    use crate::domain::errors::DomainError;
    use crate::infrastructure::cart_store::CartStore;
    use crate::infrastructure::catalog::DieselCatalogLookup;
    use crate::infrastructure::identity::DieselIdentityLookup;
    use crate::infrastructure::models::{OrderItemRow, SaleRow};
    use crate::schema::{order_items, orders, sales};
    use crate::test_support::{seed_product, seed_user, set_product_price, setup_db};

    fn services(pool: &DbPool) -> (CartStore, CheckoutService) {
        let catalog = Arc::new(DieselCatalogLookup::new(pool.clone()));
        let identity = Arc::new(DieselIdentityLookup::new(pool.clone()));
        let resolver = SellerResolver::new(catalog.clone(), identity.clone());
        (
            CartStore::new(pool.clone(), catalog.clone(), identity),
            CheckoutService::new(pool.clone(), catalog, resolver),
        )
    }

    fn order_item_rows(pool: &DbPool, order_id: Uuid) -> Vec<OrderItemRow> {
        let mut conn = pool.get().expect("Failed to get connection");
        order_items::table
            .filter(order_items::order_id.eq(order_id))
            .select(OrderItemRow::as_select())
            .load(&mut conn)
            .expect("query failed")
    }

    fn sale_rows(pool: &DbPool, order_id: Uuid) -> Vec<SaleRow> {
        let mut conn = pool.get().expect("Failed to get connection");
        sales::table
            .filter(sales::order_id.eq(order_id))
            .select(SaleRow::as_select())
            .load(&mut conn)
            .expect("query failed")
    }

    fn order_count(pool: &DbPool, user_id: Uuid) -> i64 {
        let mut conn = pool.get().expect("Failed to get connection");
        orders::table
            .filter(orders::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .expect("count failed")
    }

    #[tokio::test]
    async fn checkout_snapshots_prices_and_clears_cart() {
        let (_container, pool) = setup_db().await;
        let (cart, checkout) = services(&pool);
        let buyer = seed_user(&pool, "buyer");
        let seller = seed_user(&pool, "maria");
        let jacket = seed_product(&pool, "jacket", "29.99", Some("maria"));
        let boots = seed_product(&pool, "boots", "45.50", Some("maria"));

        cart.add_item(buyer, jacket, 2).expect("add failed");
        cart.add_item(buyer, boots, 1).expect("add failed");

        let receipt = checkout.checkout(buyer).expect("checkout failed");

        assert_eq!(receipt.total.to_string(), "105.48");
        assert!(cart.get_cart(buyer).expect("get failed").is_empty());

        let items = order_item_rows(&pool, receipt.order_id);
        assert_eq!(items.len(), 2);
        let line_sum = items
            .iter()
            .fold(bigdecimal::BigDecimal::from(0), |acc, i| {
                acc + i.subtotal.clone()
            });
        assert_eq!(line_sum, receipt.total);

        let seller_sales = sale_rows(&pool, receipt.order_id);
        assert_eq!(seller_sales.len(), 2);
        assert!(seller_sales.iter().all(|s| s.user_id == seller));
    }

    #[tokio::test]
    async fn order_lines_are_frozen_against_later_price_changes() {
        let (_container, pool) = setup_db().await;
        let (cart, checkout) = services(&pool);
        let buyer = seed_user(&pool, "buyer");
        let jacket = seed_product(&pool, "jacket", "29.99", None);

        cart.add_item(buyer, jacket, 1).expect("add failed");
        let receipt = checkout.checkout(buyer).expect("checkout failed");

        set_product_price(&pool, jacket, "99.99");

        let items = order_item_rows(&pool, receipt.order_id);
        assert_eq!(items[0].unit_price.to_string(), "29.99");
        assert_eq!(items[0].subtotal.to_string(), "29.99");
        assert_eq!(receipt.total.to_string(), "29.99");
    }

    #[tokio::test]
    async fn empty_cart_checkout_fails_and_writes_nothing() {
        let (_container, pool) = setup_db().await;
        let (_cart, checkout) = services(&pool);
        let buyer = seed_user(&pool, "buyer");

        let err = checkout.checkout(buyer).unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(order_count(&pool, buyer), 0);
    }

    #[tokio::test]
    async fn unresolved_seller_skips_the_sale_but_commits_the_order() {
        let (_container, pool) = setup_db().await;
        let (cart, checkout) = services(&pool);
        let buyer = seed_user(&pool, "buyer");
        // One product with no seller name, one whose seller name matches no
        // account, one resolvable.
        let seller = seed_user(&pool, "maria");
        let orphan = seed_product(&pool, "orphan", "10.00", None);
        let ghost = seed_product(&pool, "ghost", "20.00", Some("nobody"));
        let jacket = seed_product(&pool, "jacket", "30.00", Some("maria"));

        cart.add_item(buyer, orphan, 1).expect("add failed");
        cart.add_item(buyer, ghost, 1).expect("add failed");
        cart.add_item(buyer, jacket, 1).expect("add failed");

        let receipt = checkout.checkout(buyer).expect("checkout failed");

        assert_eq!(order_item_rows(&pool, receipt.order_id).len(), 3);
        let recorded = sale_rows(&pool, receipt.order_id);
        assert_eq!(recorded.len(), 1, "only the resolvable line gets a sale");
        assert_eq!(recorded[0].user_id, seller);
        assert_eq!(receipt.total.to_string(), "60.00");
    }

    #[tokio::test]
    async fn second_checkout_on_cleared_cart_reports_empty() {
        let (_container, pool) = setup_db().await;
        let (cart, checkout) = services(&pool);
        let buyer = seed_user(&pool, "buyer");
        let jacket = seed_product(&pool, "jacket", "29.99", None);

        cart.add_item(buyer, jacket, 1).expect("add failed");
        checkout.checkout(buyer).expect("first checkout failed");

        let err = checkout.checkout(buyer).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(order_count(&pool, buyer), 1);
    }

    #[tokio::test]
    async fn concurrent_checkouts_create_exactly_one_order() {
        let (_container, pool) = setup_db().await;
        let (cart, checkout) = services(&pool);
        let buyer = seed_user(&pool, "buyer");
        let jacket = seed_product(&pool, "jacket", "29.99", None);
        cart.add_item(buyer, jacket, 2).expect("add failed");

        let first = checkout.clone();
        let second = checkout.clone();
        let (r1, r2) = tokio::join!(
            tokio::task::spawn_blocking(move || first.checkout(buyer)),
            tokio::task::spawn_blocking(move || second.checkout(buyer)),
        );
        let results = [r1.expect("task panicked"), r2.expect("task panicked")];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one checkout may win the cart");
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::Validation(_))));

        assert_eq!(order_count(&pool, buyer), 1);
        assert!(cart.get_cart(buyer).expect("get failed").is_empty());
    }
}
