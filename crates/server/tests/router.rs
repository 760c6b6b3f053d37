//! Router smoke tests.
//!
//! These drive the real router through `tower::ServiceExt::oneshot` with
//! a lazily-connected pool, so no database is required: every assertion
//! here is about routing, extraction, and the access-control gate
//! rejecting requests before any store access happens.

#![allow(clippy::unwrap_used)]

use std::net::IpAddr;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use sqlx::PgPool;
use tower::ServiceExt;

use vendora_server::config::ServerConfig;
use vendora_server::routes;
use vendora_server::state::AppState;

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://localhost/unreachable"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 8000,
        base_url: "http://localhost:8000".to_owned(),
        jwt_secret: SecretString::from("4fYm2sQ8vK1wL9xD3cR7pN5tH0jB6gZa"),
        token_ttl_hours: 24,
        static_dir: PathBuf::from("./static"),
        email: None,
        sentry_dsn: None,
    }
}

fn test_app() -> Router {
    // connect_lazy defers any network traffic until a query runs.
    let pool = PgPool::connect_lazy("postgres://localhost/unreachable").unwrap();
    let state = AppState::new(test_config(), pool).unwrap();
    routes::app(state)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_home_returns_welcome() {
    let response = test_app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Welcome to our home page!"));
}

#[tokio::test]
async fn test_health_is_static() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_protected_route_requires_bearer() {
    let response = test_app()
        .oneshot(Request::get("/order/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let body = body_string(response).await;
    assert!(body.contains("Not authenticated"));
}

#[tokio::test]
async fn test_garbage_token_is_rejected_without_store_access() {
    // Token validation fails before the user lookup, so the unreachable
    // database is never touched.
    let response = test_app()
        .oneshot(
            Request::get("/product/")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_string(response).await;
    assert!(body.contains("Invalid token or expired token"));
}

#[tokio::test]
async fn test_wrong_scheme_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::get("/order/")
                .header(header::AUTHORIZATION, "Basic YWxpY2U6cGFzcw==")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validates_before_store_access() {
    // Weak password fails validation ahead of any insert, so this works
    // without a database.
    let response = test_app()
        .oneshot(
            Request::post("/user/registration")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"alice01","email":"alice@example.com","password":"weak","role":"customer"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Password must be at least 8 characters"));
}

#[tokio::test]
async fn test_registration_rejects_bad_username() {
    let response = test_app()
        .oneshot(
            Request::post("/user/registration")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"a b","email":"alice@example.com","password":"Str0ng!Pass","role":"customer"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
