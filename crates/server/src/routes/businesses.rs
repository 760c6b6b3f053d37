//! Business route handlers: lifecycle, scoped listings, logo upload.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use vendora_core::{BusinessId, Role};

use crate::db::businesses::BusinessInput;
use crate::db::{BusinessRepository, ProductRepository};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::Business;
use crate::state::AppState;

use super::users::BusinessWithProducts;
use super::{MessageResponse, read_upload, static_image_url};
use super::products::UploadResponse;

fn default_location() -> String {
    "Unspecified".to_owned()
}

/// Business create/update request body.
#[derive(Debug, Deserialize)]
pub struct BusinessRequest {
    pub name: String,
    #[serde(default = "default_location")]
    pub city: String,
    #[serde(default = "default_location")]
    pub region: String,
    pub description: Option<String>,
}

impl From<BusinessRequest> for BusinessInput {
    fn from(body: BusinessRequest) -> Self {
        Self {
            name: body.name,
            city: body.city,
            region: body.region,
            description: body.description,
        }
    }
}

/// Create the business routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/me", get(mine))
        .route("/default", get(default_business))
        .route("/{id}", axum::routing::put(update).delete(delete))
        .route("/business_logo/{id}", post(upload_logo))
}

/// Create a business owned by the caller.
async fn create(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<BusinessRequest>,
) -> Result<(StatusCode, Json<Business>), AppError> {
    caller.require_role(Role::BusinessOwner, "create a business")?;

    let business = BusinessRepository::new(state.pool())
        .create(&body.into(), caller.0.id)
        .await?;

    tracing::info!(business_id = %business.id, owner_id = %caller.0.id, "business created");

    Ok((StatusCode::CREATED, Json(business)))
}

/// The caller's businesses, each with its products. 404 when none exist.
async fn mine(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<Json<Vec<BusinessWithProducts>>, AppError> {
    caller.require_role(Role::BusinessOwner, "retrieve their businesses")?;

    let businesses = BusinessRepository::new(state.pool())
        .list_by_owner(caller.0.id)
        .await?;

    if businesses.is_empty() {
        return Err(AppError::NotFound(
            "No businesses found for the user".to_owned(),
        ));
    }

    let products = ProductRepository::new(state.pool());
    let mut listings = Vec::with_capacity(businesses.len());
    for business in businesses {
        let products = products.list_by_business(business.id).await?;
        listings.push(BusinessWithProducts { business, products });
    }

    Ok(Json(listings))
}

/// The sentinel default business and its products.
async fn default_business(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<Json<BusinessWithProducts>, AppError> {
    caller.require_role(Role::BusinessOwner, "access the default business")?;

    let business = BusinessRepository::new(state.pool())
        .get_default()
        .await?
        .ok_or_else(|| AppError::NotFound("Default Business not found".to_owned()))?;

    let products = ProductRepository::new(state.pool())
        .list_by_business(business.id)
        .await?;

    Ok(Json(BusinessWithProducts { business, products }))
}

/// Update a business. Caller must be its owner.
async fn update(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<BusinessId>,
    Json(body): Json<BusinessRequest>,
) -> Result<Json<Business>, AppError> {
    caller.require_role(Role::BusinessOwner, "update their businesses")?;
    owned_business(&state, id, &caller, "You are not authorized to update this business").await?;

    let business = BusinessRepository::new(state.pool())
        .update(id, &body.into())
        .await?;

    Ok(Json(business))
}

/// Delete a business. Caller must be its owner, and the business must
/// have no products left (explicit reject-if-nonempty semantics).
async fn delete(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<BusinessId>,
) -> Result<Json<MessageResponse>, AppError> {
    caller.require_role(Role::BusinessOwner, "delete their businesses")?;
    owned_business(&state, id, &caller, "You are not authorized to delete this business").await?;

    let product_count = ProductRepository::new(state.pool())
        .count_by_business(id)
        .await?;
    if product_count > 0 {
        return Err(AppError::Validation(format!(
            "Business still has {product_count} products; delete or move them first"
        )));
    }

    BusinessRepository::new(state.pool()).delete(id).await?;
    Ok(MessageResponse::new("Business deleted successfully"))
}

/// Upload a business logo through the shared image pipeline.
async fn upload_logo(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<BusinessId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    caller.require_role(Role::BusinessOwner, "upload a business logo")?;
    owned_business(&state, id, &caller, "You are not the owner of this business").await?;

    let (filename, bytes) = read_upload(multipart).await?;
    let stored = state.images().save(&filename, bytes).await?;

    BusinessRepository::new(state.pool()).set_logo(id, &stored).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_url: static_image_url(&state, &stored),
        }),
    ))
}

/// Fetch a business and verify the caller owns it.
async fn owned_business(
    state: &AppState,
    id: BusinessId,
    caller: &CurrentUser,
    denial: &str,
) -> Result<Business, AppError> {
    let business = BusinessRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Business not found".to_owned()))?;

    if business.is_owned_by(caller.0.id) {
        Ok(business)
    } else {
        Err(AppError::Forbidden(denial.to_owned()))
    }
}
