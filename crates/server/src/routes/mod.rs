//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Welcome message
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (pings the database)
//!
//! # Auth
//! POST /auth/token              - Username+password -> bearer token
//! GET  /auth/verification       - Consume an email-verification token
//!
//! # Users
//! POST /user/registration       - Create an account (sends verification email)
//! GET  /user/me                 - Role-shaped profile (businesses or orders)
//! PUT  /user/                   - Update own username/password
//!
//! # Products
//! POST /product/products        - Create product (business owner)
//! GET  /product/                - Paginated product list
//! GET  /product/{id}            - Product with business/owner details
//! PUT  /product/{id}            - Update product (owning business owner)
//! DELETE /product/{id}          - Delete product (owning business owner)
//! POST /product/product_image/{id} - Upload product image (multipart)
//!
//! # Businesses
//! POST /business/               - Create business (business owner)
//! GET  /business/me             - Own businesses with products
//! GET  /business/default        - The sentinel default business
//! PUT  /business/{id}           - Update business (owner)
//! DELETE /business/{id}         - Delete business (owner; rejected while products remain)
//! POST /business/business_logo/{id} - Upload logo (multipart)
//!
//! # Orders
//! POST /order/                  - Place order (customer)
//! GET  /order/                  - Own orders, paginated (customer)
//! PUT  /order/{id}              - Update quantity (buyer)
//! PUT  /order/status/{id}       - Set status (selling business owner)
//! DELETE /order/{id}            - Delete order (buyer)
//!
//! # Admin (ADMIN role)
//! GET  /admin/                  - Paginated user list
//! DELETE /admin/{id}            - Delete user
//! GET  /admin/get_products      - Paginated product list
//! DELETE /admin/delete_products/{id} - Delete product
//! GET  /admin/get_orders        - Paginated order list
//! PUT  /admin/orders/{id}       - Override order status
//! ```

pub mod admin;
pub mod auth;
pub mod businesses;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{Method, StatusCode},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::services::images::ImageError;
use crate::state::AppState;

/// Pagination query parameters, 1-indexed.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

const fn default_page() -> u32 {
    1
}

const fn default_page_size() -> u32 {
    20
}

impl Pagination {
    /// Convert to a SQL `LIMIT`/`OFFSET` pair.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when `page` or `page_size` is zero.
    pub fn limit_offset(self) -> Result<(i64, i64), AppError> {
        if self.page == 0 || self.page_size == 0 {
            return Err(AppError::Validation(
                "page and page_size must be greater than 0".to_owned(),
            ));
        }
        let limit = i64::from(self.page_size);
        let offset = i64::from(self.page - 1) * limit;
        Ok((limit, offset))
    }
}

/// Generic `{"message": ...}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Pull the first file part out of a multipart upload.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if let Some(filename) = field.file_name().map(ToOwned::to_owned) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            return Ok((filename, bytes.to_vec()));
        }
    }
    Err(ImageError::MissingFile.into())
}

/// URL under which an uploaded image is served.
pub(crate) fn static_image_url(state: &AppState, filename: &str) -> String {
    format!("{}/static/images/{filename}", state.config().base_url)
}

/// Create the resource routers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/user", users::routes())
        .nest("/auth", auth::routes())
        .nest("/admin", admin::routes())
        .nest("/product", products::routes())
        .nest("/business", businesses::routes())
        .nest("/order", orders::routes())
}

/// Build the complete application router.
///
/// Shared by the binary and the router tests; the Sentry tower layers
/// are added by `main` so tests don't need a DSN.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let static_dir = state.config().static_dir.clone();

    let router = Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Normalize trailing slashes before routing so paths like `/order/`
    // reach the nested index handlers (served at `/order` under axum 0.8).
    let normalized = NormalizePathLayer::trim_trailing_slash().layer(router);
    Router::new().fallback_service(normalized)
}

/// Welcome route.
async fn home() -> Json<MessageResponse> {
    MessageResponse::new("Welcome to our home page!")
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offsets_are_one_indexed() {
        let p = Pagination {
            page: 1,
            page_size: 20,
        };
        assert!(matches!(p.limit_offset(), Ok((20, 0))));

        let p = Pagination {
            page: 3,
            page_size: 10,
        };
        assert!(matches!(p.limit_offset(), Ok((10, 20))));
    }

    #[test]
    fn test_pagination_rejects_zero() {
        let p = Pagination {
            page: 0,
            page_size: 20,
        };
        assert!(p.limit_offset().is_err());

        let p = Pagination {
            page: 1,
            page_size: 0,
        };
        assert!(p.limit_offset().is_err());
    }
}
