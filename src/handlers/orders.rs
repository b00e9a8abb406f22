use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::infrastructure::checkout::CheckoutService;
use crate::infrastructure::ledger::OrderLedger;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Decimal total as a string to avoid floating-point issues, e.g. "99.90"
    pub total: String,
    pub status: String,
    pub items_count: i64,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
    pub subtotal: String,
    pub product_name: Option<String>,
    pub product_image_url: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Converts the user's cart into a committed order: snapshots prices,
/// records order lines and seller sales, and clears the cart, all inside a
/// single database transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Empty cart or missing fields"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    checkout: web::Data<CheckoutService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = body.into_inner().user_id;

    let receipt = web::block(move || checkout.checkout(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({
        "message": "Order created successfully",
        "order_id": receipt.order_id,
        "total": receipt.total.to_string()
    })))
}

/// GET /orders/user/{user_id}
#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Buyer UUID"),
    ),
    responses(
        (status = 200, description = "Orders newest-first", body = [OrderSummaryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_user_orders(
    ledger: web::Data<OrderLedger>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let summaries = web::block(move || ledger.orders_for_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderSummaryResponse> = summaries
        .into_iter()
        .map(|o| OrderSummaryResponse {
            id: o.id,
            user_id: o.user_id,
            total: o.total.to_string(),
            status: o.status,
            items_count: o.items_count,
            created_at: o.created_at.to_rfc3339(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{order_id}/items
#[utoipa::path(
    get,
    path = "/orders/{order_id}/items",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order lines with display fields", body = [OrderItemResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order_items(
    ledger: web::Data<OrderLedger>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let items = web::block(move || ledger.order_items(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderItemResponse> = items
        .into_iter()
        .map(|i| OrderItemResponse {
            id: i.id,
            order_id: i.order_id,
            product_id: i.product_id,
            quantity: i.quantity,
            unit_price: i.unit_price.to_string(),
            subtotal: i.subtotal.to_string(),
            product_name: i.product_name,
            product_image_url: i.product_image_url,
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}
