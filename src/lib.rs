pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::attribution::SellerResolver;
pub use db::{create_pool, DbPool};
use domain::ports::{CatalogLookup, IdentityLookup};
use infrastructure::cart_store::CartStore;
use infrastructure::catalog::DieselCatalogLookup;
use infrastructure::checkout::CheckoutService;
use infrastructure::identity::DieselIdentityLookup;
use infrastructure::ledger::{OrderLedger, SalesLedger};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::get_cart,
        handlers::cart::add_to_cart,
        handlers::cart::update_cart_item,
        handlers::cart::delete_cart_item,
        handlers::cart::clear_user_cart,
        handlers::orders::create_order,
        handlers::orders::get_user_orders,
        handlers::orders::get_order_items,
        handlers::sales::list_sales,
        handlers::sales::get_user_sales,
        handlers::sales::create_sale,
    ),
    components(schemas(
        handlers::cart::AddCartItemRequest,
        handlers::cart::UpdateCartItemRequest,
        handlers::cart::CartItemResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::OrderSummaryResponse,
        handlers::orders::OrderItemResponse,
        handlers::sales::CreateSaleRequest,
        handlers::sales::SaleResponse,
        handlers::sales::UserSaleResponse,
    ))
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    // Catalog and identity are foreign services behind ports; this
    // deployment colocates them in the same database.
    let catalog: Arc<dyn CatalogLookup> = Arc::new(DieselCatalogLookup::new(pool.clone()));
    let identity: Arc<dyn IdentityLookup> = Arc::new(DieselIdentityLookup::new(pool.clone()));
    let resolver = SellerResolver::new(catalog.clone(), identity.clone());

    let cart = web::Data::new(CartStore::new(pool.clone(), catalog.clone(), identity));
    let checkout = web::Data::new(CheckoutService::new(pool.clone(), catalog.clone(), resolver));
    let order_ledger = web::Data::new(OrderLedger::new(pool.clone(), catalog.clone()));
    let sales_ledger = web::Data::new(SalesLedger::new(pool, catalog));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(cart.clone())
            .app_data(checkout.clone())
            .app_data(order_ledger.clone())
            .app_data(sales_ledger.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .service(
                web::scope("/cart")
                    .route("", web::post().to(handlers::cart::add_to_cart))
                    .route("/user/{user_id}", web::delete().to(handlers::cart::clear_user_cart))
                    .route("/{user_id}", web::get().to(handlers::cart::get_cart))
                    .route("/{item_id}", web::put().to(handlers::cart::update_cart_item))
                    .route("/{item_id}", web::delete().to(handlers::cart::delete_cart_item)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/user/{user_id}", web::get().to(handlers::orders::get_user_orders))
                    .route("/{order_id}/items", web::get().to(handlers::orders::get_order_items)),
            )
            .service(
                web::scope("/sales")
                    .route("", web::get().to(handlers::sales::list_sales))
                    .route("", web::post().to(handlers::sales::create_sale))
                    .route("/user/{user_id}", web::get().to(handlers::sales::get_user_sales)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
