//! Authentication extractor and authorization predicates.
//!
//! The access-control gate: every protected handler takes a
//! [`CurrentUser`], which resolves the `Authorization: Bearer` header to
//! a persisted user or rejects with 401. Authorization is then
//! re-derived per operation with [`CurrentUser::require_role`] plus
//! explicit ownership checks; a mismatch is a 403 raised before any
//! state mutation.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use vendora_core::Role;

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Require an exact role.
    ///
    /// `action` completes the rejection message: "Only customers can
    /// create an order".
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the caller's role differs.
    pub fn require_role(&self, role: Role, action: &str) -> Result<(), AppError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Only {} can {action}",
                role_label(role)
            )))
        }
    }
}

/// Plural label used in authorization rejection messages.
const fn role_label(role: Role) -> &'static str {
    match role {
        Role::Customer => "customers",
        Role::BusinessOwner => "business owners",
        Role::Admin => "admins",
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Auth("Not authenticated".to_owned()))?;

        let auth = AuthService::new(state.pool(), state.config());
        let user = auth.current_user(token).await?;

        Ok(Self(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;
    use vendora_core::{Email, UserId, Username};

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/order/");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    fn user_with_role(role: Role) -> CurrentUser {
        CurrentUser(User {
            id: UserId::new(1),
            username: Username::parse("alice01").unwrap(),
            email: Email::parse("alice@example.com").unwrap(),
            password_hash: String::new(),
            is_verified: true,
            join_date: Utc::now(),
            role,
        })
    }

    #[test]
    fn test_bearer_token_extraction() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_or_wrong_scheme() {
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic Zm9v"))), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("abc.def.ghi"))), None);
    }

    #[test]
    fn test_require_role_matches() {
        let customer = user_with_role(Role::Customer);
        assert!(customer.require_role(Role::Customer, "create an order").is_ok());
    }

    #[test]
    fn test_require_role_rejects_mismatch() {
        let customer = user_with_role(Role::Customer);
        let err = customer
            .require_role(Role::BusinessOwner, "add a new product")
            .unwrap_err();
        assert!(
            matches!(&err, AppError::Forbidden(msg) if msg == "Only business owners can add a new product")
        );
    }
}
