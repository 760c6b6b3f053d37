//! Order route handlers.
//!
//! Role checks live here; ownership rules and the creation critical
//! section live in [`crate::services::orders::OrderService`].

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use vendora_core::{OrderId, OrderStatus, ProductId, Role};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::services::orders::OrderService;
use crate::state::AppState;

use super::{MessageResponse, Pagination};

const fn default_quantity() -> i32 {
    1
}

/// Order creation request body.
#[derive(Debug, Deserialize)]
pub struct OrderCreateRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct OrderUpdateRequest {
    pub quantity: i32,
}

/// Status update query parameter.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: OrderStatus,
}

/// Create the order routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(delete))
        .route("/status/{id}", put(update_status))
}

/// Place an order for a product. Customers only.
async fn create(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<OrderCreateRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    caller.require_role(Role::Customer, "create an order")?;

    let order = OrderService::new(state.pool())
        .create(caller.0.id, body.product_id, body.quantity)
        .await?;

    tracing::info!(
        order_id = %order.id,
        product_id = %order.product_id,
        quantity = order.quantity,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// The caller's own orders, paginated. Customers only.
async fn list(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Order>>, AppError> {
    caller.require_role(Role::Customer, "retrieve their orders")?;

    let (limit, offset) = pagination.limit_offset()?;
    let orders = OrderService::new(state.pool())
        .list_for_buyer(caller.0.id, limit, offset)
        .await?;

    Ok(Json(orders))
}

/// Update an order's quantity. The caller must be the buyer; the total
/// price stays the creation-time snapshot.
async fn update(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<OrderId>,
    Json(body): Json<OrderUpdateRequest>,
) -> Result<Json<Order>, AppError> {
    caller.require_role(Role::Customer, "update their orders")?;

    let order = OrderService::new(state.pool())
        .update_quantity(caller.0.id, id, body.quantity)
        .await?;

    Ok(Json(order))
}

/// Set an order's status. The caller must own the business selling the
/// order's product.
async fn update_status(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<OrderId>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Order>, AppError> {
    caller.require_role(Role::BusinessOwner, "update the status of their orders")?;

    let order = OrderService::new(state.pool())
        .update_status_as_seller(caller.0.id, id, query.status)
        .await?;

    Ok(Json(order))
}

/// Delete the caller's own order. Stock is not restored.
async fn delete(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<MessageResponse>, AppError> {
    caller.require_role(Role::Customer, "delete their orders")?;

    OrderService::new(state.pool()).delete(caller.0.id, id).await?;

    Ok(MessageResponse::new("Order deleted successfully"))
}
