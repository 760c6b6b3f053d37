//! Authentication route handlers.
//!
//! Token issue (the OAuth2 password-flow shape: form-encoded username
//! and password) and email-verification consumption.

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use vendora_core::Username;

use crate::error::AppError;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Token request form data.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Query parameters for the verification callback.
#[derive(Debug, Deserialize)]
pub struct VerificationQuery {
    pub token: String,
}

/// Verification outcome.
#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub username: Username,
    pub message: String,
}

/// Create the auth routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(token))
        .route("/verification", get(verification))
}

/// Exchange username+password for a signed bearer token.
///
/// 401 with "Incorrect username or password" on bad credentials.
async fn token(
    State(state): State<AppState>,
    Form(form): Form<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let auth = AuthService::new(state.pool(), state.config());
    let (_user, access_token) = auth.login(&form.username, &form.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token,
            token_type: "bearer",
        }),
    ))
}

/// Consume the emailed verification token and mark the account verified.
///
/// 401 on an invalid/expired token or an already-verified account.
async fn verification(
    State(state): State<AppState>,
    Query(query): Query<VerificationQuery>,
) -> Result<Json<VerificationResponse>, AppError> {
    let auth = AuthService::new(state.pool(), state.config());
    let user = auth.verify_email(&query.token).await?;

    tracing::info!(user_id = %user.id, "account verified");

    Ok(Json(VerificationResponse {
        username: user.username,
        message: "Account verified successfully".to_owned(),
    }))
}
