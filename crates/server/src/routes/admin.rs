//! Admin route handlers: oversight across users, products, and orders.
//!
//! Every operation here requires the ADMIN role; admin deletions lean on
//! the schema's cascade rules rather than per-entity cleanup.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};

use vendora_core::{OrderId, ProductId, Role, UserId};

use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::user::UserProfile;
use crate::models::{Order, Product};
use crate::services::orders::OrderService;
use crate::state::AppState;

use super::orders::StatusQuery;
use super::{MessageResponse, Pagination};

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", axum::routing::delete(delete_user))
        .route("/get_products", get(list_products))
        .route("/delete_products/{id}", axum::routing::delete(delete_product))
        .route("/get_orders", get(list_orders))
        .route("/orders/{id}", put(update_order_status))
}

/// Paginated listing of all users.
async fn list_users(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    caller.require_role(Role::Admin, "access this endpoint")?;

    let (limit, offset) = pagination.limit_offset()?;
    let users = UserRepository::new(state.pool()).list(limit, offset).await?;

    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// Delete any user.
async fn delete_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<MessageResponse>, AppError> {
    caller.require_role(Role::Admin, "access this endpoint")?;

    let deleted = UserRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("User not found".to_owned()));
    }

    tracing::info!(user_id = %id, admin_id = %caller.0.id, "user deleted by admin");

    Ok(MessageResponse::new("User deleted successfully"))
}

/// Paginated listing of all products.
async fn list_products(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Product>>, AppError> {
    caller.require_role(Role::Admin, "access this endpoint")?;

    let (limit, offset) = pagination.limit_offset()?;
    let products = ProductRepository::new(state.pool()).list(limit, offset).await?;

    Ok(Json(products))
}

/// Delete any product.
async fn delete_product(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>, AppError> {
    caller.require_role(Role::Admin, "access this endpoint")?;

    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    Ok(MessageResponse::new("Product deleted successfully"))
}

/// Paginated listing of all orders.
async fn list_orders(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Order>>, AppError> {
    caller.require_role(Role::Admin, "access this endpoint")?;

    let (limit, offset) = pagination.limit_offset()?;
    let orders = OrderRepository::new(state.pool()).list(limit, offset).await?;

    Ok(Json(orders))
}

/// Override any order's status, bypassing the seller ownership check.
async fn update_order_status(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<OrderId>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Order>, AppError> {
    caller.require_role(Role::Admin, "access this endpoint")?;

    let order = OrderService::new(state.pool())
        .update_status_as_admin(id, query.status)
        .await?;

    Ok(Json(order))
}
