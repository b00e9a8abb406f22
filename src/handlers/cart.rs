use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::CartUpdate;
use crate::errors::AppError;
use crate::infrastructure::cart_store::CartStore;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product_name: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub product_price: String,
    pub product_image_url: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart/{user_id}
///
/// Display view of a user's cart, joined with current catalog data. Not
/// authoritative for checkout pricing.
#[utoipa::path(
    get,
    path = "/cart/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Buyer UUID"),
    ),
    responses(
        (status = 200, description = "Cart lines", body = [CartItemResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    store: web::Data<CartStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let lines = web::block(move || store.get_cart(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CartItemResponse> = lines
        .into_iter()
        .map(|l| CartItemResponse {
            id: l.id,
            user_id: l.user_id,
            product_id: l.product_id,
            quantity: l.quantity,
            product_name: l.product_name,
            product_price: l.product_price.to_string(),
            product_image_url: l.product_image_url.unwrap_or_default(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// POST /cart
///
/// Adds a product to the buyer's cart, merging quantities when the line
/// already exists. Rejected with 403 when the buyer is the product's seller.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Line created or merged"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Buyer is the product's seller"),
        (status = 404, description = "Unknown product"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    store: web::Data<CartStore>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let id = web::block(move || store.add_item(body.user_id, body.product_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "message": "Item added to cart", "id": id })))
}

/// PUT /cart/{item_id}
///
/// Updates a line's quantity; a non-positive quantity deletes the line.
#[utoipa::path(
    put,
    path = "/cart/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Cart line UUID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Line updated or removed"),
        (status = 404, description = "Unknown cart line"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn update_cart_item(
    store: web::Data<CartStore>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let quantity = body.into_inner().quantity;

    let outcome = web::block(move || store.set_quantity(item_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body = match outcome {
        CartUpdate::Updated(id) => json!({ "message": "Cart updated", "id": id }),
        CartUpdate::Removed => json!({ "message": "Item removed from cart" }),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /cart/{item_id}
#[utoipa::path(
    delete,
    path = "/cart/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Cart line UUID"),
    ),
    responses(
        (status = 200, description = "Line removed"),
        (status = 404, description = "Unknown cart line"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn delete_cart_item(
    store: web::Data<CartStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();

    web::block(move || store.remove_item(item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Item removed from cart" })))
}

/// DELETE /cart/user/{user_id}
///
/// Clears the whole cart; succeeds even when it is already empty.
#[utoipa::path(
    delete,
    path = "/cart/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Buyer UUID"),
    ),
    responses(
        (status = 200, description = "Cart cleared"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn clear_user_cart(
    store: web::Data<CartStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    web::block(move || store.clear_user_cart(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "message": "Cart cleared" })))
}
