//! Product route handlers: catalog CRUD and image upload.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vendora_core::{BusinessId, Email, ProductId, Role, UserId, percentage_discount};

use crate::db::products::ProductInput;
use crate::db::{BusinessRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Business, Product, User};
use crate::state::AppState;

use super::{MessageResponse, Pagination, read_upload, static_image_url};

/// Product creation request body.
#[derive(Debug, Deserialize)]
pub struct ProductCreateRequest {
    pub name: String,
    pub category: String,
    pub original_price: Decimal,
    pub new_price: Decimal,
    pub offer_expiration_date: NaiveDate,
    pub quantity: i32,
    pub business_id: Option<BusinessId>,
}

/// Product update request body.
#[derive(Debug, Deserialize)]
pub struct ProductUpdateRequest {
    pub name: String,
    pub category: String,
    pub original_price: Decimal,
    pub new_price: Decimal,
    pub offer_expiration_date: NaiveDate,
    pub quantity: i32,
}

/// Denormalized owning-business block on the product detail response.
#[derive(Debug, Serialize)]
pub struct BusinessDetails {
    pub business_id: BusinessId,
    pub name: String,
    pub city: String,
    pub region: String,
    pub description: Option<String>,
    pub logo: String,
    pub owner_id: Option<UserId>,
    /// Absent for products on the ownerless default business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_join_date: Option<DateTime<Utc>>,
}

/// Single-product response with owning-business details.
#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub product: Product,
    pub business_details: BusinessDetails,
}

/// Response for a stored upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_url: String,
}

/// Create the product routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create))
        .route("/", get(list))
        .route("/{id}", get(detail).put(update).delete(delete))
        .route("/product_image/{id}", post(upload_image))
}

/// Create a product, attaching it to the caller's business or the
/// sentinel default business.
async fn create(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<ProductCreateRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    caller.require_role(Role::BusinessOwner, "add a new product")?;
    let user = &caller.0;

    let discount = discount_or_reject(body.original_price, body.new_price)?;
    let business = resolve_target_business(&state, body.business_id, user).await?;

    let input = ProductInput {
        name: body.name,
        category: body.category,
        original_price: body.original_price,
        new_price: body.new_price,
        percentage_discount: discount,
        offer_expiration_date: body.offer_expiration_date,
        quantity: body.quantity,
    };

    let product = ProductRepository::new(state.pool())
        .create(&input, business.id)
        .await?;

    tracing::info!(product_id = %product.id, business_id = %business.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Paginated product listing. Any authenticated caller.
async fn list(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Product>>, AppError> {
    let (limit, offset) = pagination.limit_offset()?;
    let products = ProductRepository::new(state.pool()).list(limit, offset).await?;
    Ok(Json(products))
}

/// Single product with denormalized business and owner details.
async fn detail(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetailResponse>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let business = BusinessRepository::new(state.pool())
        .get_by_id(product.business_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found for the product".to_owned()))?;

    let owner = match business.owner_id {
        Some(owner_id) => UserRepository::new(state.pool()).get_by_id(owner_id).await?,
        None => None,
    };

    let business_details = BusinessDetails {
        business_id: business.id,
        name: business.name,
        city: business.city,
        region: business.region,
        description: business.description,
        logo: business.logo,
        owner_id: business.owner_id,
        owner_email: owner.as_ref().map(|o| o.email.clone()),
        owner_join_date: owner.as_ref().map(|o| o.join_date),
    };

    Ok(Json(ProductDetailResponse {
        product,
        business_details,
    }))
}

/// Update a product. Caller must own the product's business.
async fn update(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductUpdateRequest>,
) -> Result<Json<Product>, AppError> {
    caller.require_role(Role::BusinessOwner, "update a product")?;
    owned_product(&state, id, &caller.0, "You are not authorized to update this product").await?;

    let discount = discount_or_reject(body.original_price, body.new_price)?;

    let input = ProductInput {
        name: body.name,
        category: body.category,
        original_price: body.original_price,
        new_price: body.new_price,
        percentage_discount: discount,
        offer_expiration_date: body.offer_expiration_date,
        quantity: body.quantity,
    };

    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(product))
}

/// Delete a product. Caller must own the product's business.
async fn delete(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>, AppError> {
    caller.require_role(Role::BusinessOwner, "delete a product")?;
    owned_product(&state, id, &caller.0, "You are not authorized to delete this product").await?;

    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(MessageResponse::new("Product deleted successfully"))
}

/// Upload a product image: jpg/png only, stored under a random name,
/// resized to the fixed canvas, then persisted on the product.
async fn upload_image(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    caller.require_role(Role::BusinessOwner, "upload product pictures")?;
    owned_product(&state, id, &caller.0, "You are not the owner of this product").await?;

    let (filename, bytes) = read_upload(multipart).await?;
    let stored = state.images().save(&filename, bytes).await?;

    // The file already sits on disk; a failure past this point leaves an
    // orphaned image but no inconsistent product row.
    ProductRepository::new(state.pool()).set_image(id, &stored).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_url: static_image_url(&state, &stored),
        }),
    ))
}

/// Compute the stored discount, rejecting non-positive original prices.
fn discount_or_reject(original_price: Decimal, new_price: Decimal) -> Result<Decimal, AppError> {
    percentage_discount(original_price, new_price)
        .ok_or_else(|| AppError::Validation("Original price cannot be 0".to_owned()))
}

/// Resolve the business a new product should attach to.
///
/// An explicit `business_id` must exist and, unless it is the ownerless
/// sentinel, belong to the caller. With no `business_id` the sentinel is
/// used, created idempotently on first need.
async fn resolve_target_business(
    state: &AppState,
    business_id: Option<BusinessId>,
    user: &User,
) -> Result<Business, AppError> {
    let businesses = BusinessRepository::new(state.pool());

    match business_id {
        Some(id) => {
            let business = businesses.get_by_id(id).await?.ok_or_else(|| {
                AppError::NotFound("Business not found with the provided business_id".to_owned())
            })?;

            if business.is_default() || business.is_owned_by(user.id) {
                Ok(business)
            } else {
                Err(AppError::Forbidden(
                    "You are not authorized to associate a product with this business".to_owned(),
                ))
            }
        }
        None => Ok(businesses.ensure_default().await?),
    }
}

/// Fetch a product and verify the caller owns its business.
async fn owned_product(
    state: &AppState,
    id: ProductId,
    user: &User,
    denial: &str,
) -> Result<Product, AppError> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let business = BusinessRepository::new(state.pool())
        .get_by_id(product.business_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found for the product".to_owned()))?;

    if business.is_owned_by(user.id) {
        Ok(product)
    } else {
        Err(AppError::Forbidden(denial.to_owned()))
    }
}
