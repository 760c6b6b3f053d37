//! User route handlers: registration, profile, and profile updates.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use vendora_core::{Role, Username};

use crate::db::{BusinessRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::user::UserProfile;
use crate::models::{Business, Order, Product};
use crate::services::auth::{self, AuthService};
use crate::services::orders::OrderService;
use crate::state::AppState;

use super::MessageResponse;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Profile update request body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A business with its products, as shown on the owner's profile.
#[derive(Debug, Serialize)]
pub struct BusinessWithProducts {
    pub business: Business,
    pub products: Vec<Product>,
}

/// Role-shaped profile response: business owners see their businesses,
/// customers their orders, admins just the account fields.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub businesses: Option<Vec<BusinessWithProducts>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,
}

/// Create the user routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(register))
        .route("/me", get(me))
        .route("/", put(update_profile))
}

/// Register a new account and send the verification email.
///
/// The email is fire-and-forget: a delivery failure is logged but never
/// rolls back the created user.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let auth = AuthService::new(state.pool(), state.config());
    let user = auth
        .register(&body.username, &body.email, &body.password, body.role)
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    if let Some(mailer) = state.mailer() {
        let token = auth.issue_token(&user)?;
        let link = format!(
            "{}/auth/verification?token={token}",
            state.config().base_url
        );
        let mailer = mailer.clone();
        let to = user.email.as_str().to_owned();
        let username = user.username.as_str().to_owned();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_verification(&to, &username, &link).await {
                tracing::warn!(error = %e, "verification email failed");
            }
        });
    }

    let message = format!(
        "Hello {}, Thanks for choosing our services. Please check your email inbox and click \
         on the link to confirm your registration",
        user.username
    );

    Ok((StatusCode::CREATED, MessageResponse::new(message)))
}

/// Role-shaped profile of the authenticated user.
async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MeResponse>, AppError> {
    let mut response = MeResponse {
        user: UserProfile::from(user.clone()),
        businesses: None,
        orders: None,
    };

    match user.role {
        Role::BusinessOwner => {
            let businesses = BusinessRepository::new(state.pool())
                .list_by_owner(user.id)
                .await?;
            let products = ProductRepository::new(state.pool());

            let mut listings = Vec::with_capacity(businesses.len());
            for business in businesses {
                let products = products.list_by_business(business.id).await?;
                listings.push(BusinessWithProducts { business, products });
            }
            response.businesses = Some(listings);
        }
        Role::Customer => {
            let orders = OrderService::new(state.pool())
                .list_for_buyer(user.id, i64::MAX, 0)
                .await?;
            response.orders = Some(orders);
        }
        Role::Admin => {}
    }

    Ok(Json(response))
}

/// Update the caller's username and/or password.
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let username = body
        .username
        .as_deref()
        .map(Username::parse)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let password_hash = match body.password.as_deref() {
        Some(password) => {
            auth::validate_password(password)?;
            Some(auth::hash_password(password)?)
        }
        None => None,
    };

    let updated = UserRepository::new(state.pool())
        .update_profile(user.id, username.as_ref(), password_hash.as_deref())
        .await?;

    Ok(Json(UserProfile::from(updated)))
}
