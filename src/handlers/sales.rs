use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::sale::NewSale;
use crate::errors::AppError;
use crate::infrastructure::ledger::SalesLedger;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSaleRequest {
    /// The selling user's account.
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal total as a string to avoid floating-point issues, e.g. "9.99"
    pub total: String,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total: String,
    pub order_id: Option<Uuid>,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSaleResponse {
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total: String,
    pub created_at: String,
    pub product_name: Option<String>,
    pub product_price: Option<String>,
    pub product_image_url: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /sales
#[utoipa::path(
    get,
    path = "/sales",
    responses(
        (status = 200, description = "All sales newest-first", body = [SaleResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn list_sales(ledger: web::Data<SalesLedger>) -> Result<HttpResponse, AppError> {
    let sales = web::block(move || ledger.all_sales())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<SaleResponse> = sales
        .into_iter()
        .map(|s| SaleResponse {
            id: s.id,
            user_id: s.user_id,
            product_id: s.product_id,
            quantity: s.quantity,
            total: s.total.to_string(),
            order_id: s.order_id,
            created_at: s.created_at.to_rfc3339(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /sales/user/{user_id}
///
/// Products the user has sold, with catalog display fields.
#[utoipa::path(
    get,
    path = "/sales/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Seller UUID"),
    ),
    responses(
        (status = 200, description = "Seller's sales newest-first", body = [UserSaleResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn get_user_sales(
    ledger: web::Data<SalesLedger>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let sales = web::block(move || ledger.sales_by_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<UserSaleResponse> = sales
        .into_iter()
        .map(|s| UserSaleResponse {
            sale_id: s.sale_id,
            product_id: s.product_id,
            quantity: s.quantity,
            total: s.total.to_string(),
            created_at: s.created_at.to_rfc3339(),
            product_name: s.product_name,
            product_price: s.product_price.map(|p| p.to_string()),
            product_image_url: s.product_image_url,
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// POST /sales
///
/// Legacy direct sale insertion, kept for backward compatibility; bypasses
/// the checkout orchestrator.
#[utoipa::path(
    post,
    path = "/sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale recorded", body = SaleResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn create_sale(
    ledger: web::Data<SalesLedger>,
    body: web::Json<CreateSaleRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let total = BigDecimal::from_str(&body.total)
        .map_err(|e| AppError::Validation(format!("invalid total '{}': {}", body.total, e)))?;

    let sale = web::block(move || {
        ledger.record_sale(NewSale {
            user_id: body.user_id,
            product_id: body.product_id,
            quantity: body.quantity,
            total,
            order_id: body.order_id,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({
        "message": "Sale recorded",
        "id": sale.id,
        "sale": SaleResponse {
            id: sale.id,
            user_id: sale.user_id,
            product_id: sale.product_id,
            quantity: sale.quantity,
            total: sale.total.to_string(),
            order_id: sale.order_id,
            created_at: sale.created_at.to_rfc3339(),
        }
    })))
}
