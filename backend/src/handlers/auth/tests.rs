use crate::configure_app;
use crate::middleware::{RateLimitConfig, RateLimiter};
use crate::utils::jwt::JwtService;
use actix_web::http::StatusCode;
use actix_web::{test, App};
use bid_lotto_shared::{DrawStrategy, UserRole};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

const SECRET: &str = "handler-tests-secret-key-with-32-chars!";

// Requests here are rejected before any query runs, so the pool never connects.
fn lazy_pool() -> sqlx::PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://localhost/unused")
        .unwrap()
}

fn jwt() -> Arc<JwtService> {
    Arc::new(JwtService::new(SECRET, 3600).unwrap())
}

fn bearer(jwt: &JwtService, role: UserRole) -> String {
    let token = jwt
        .generate_token(7, role, Some("someone@example.com".to_string()), None)
        .unwrap();
    format!("Bearer {}", token)
}

macro_rules! app {
    ($jwt:expr) => {{
        let jwt = $jwt.clone();
        test::init_service(App::new().configure(move |cfg| {
            configure_app(
                cfg,
                lazy_pool(),
                jwt,
                DrawStrategy::FromInventory,
                RateLimiter::new(RateLimitConfig::default()),
            )
        }))
        .await
    }};
}

#[actix_web::test]
async fn register_rejects_mismatched_passwords() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "somchai@example.com",
            "first_name": "Somchai",
            "last_name": "Jaidee",
            "password": "password123",
            "password_confirmation": "password321"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn register_requires_email_or_phone() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "first_name": "Somchai",
            "last_name": "Jaidee",
            "password": "password123",
            "password_confirmation": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_json_is_a_validation_error() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn login_without_identity_is_rejected() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "password": "password123" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn me_requires_token() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn token_from_another_secret_is_rejected() {
    let jwt = jwt();
    let app = app!(jwt);

    let other = JwtService::new("another-secret-key-that-is-long-enough", 3600).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/wallet/get_wallet")
        .insert_header(("Authorization", bearer(&other, UserRole::Customer)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn customers_cannot_reach_admin_routes() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::post()
        .uri("/api/admin/reset")
        .insert_header(("Authorization", bearer(&jwt, UserRole::Customer)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn customers_cannot_list_users() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(("Authorization", bearer(&jwt, UserRole::Customer)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn customers_cannot_edit_tickets() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::put()
        .uri("/api/lotto/1")
        .insert_header(("Authorization", bearer(&jwt, UserRole::Customer)))
        .set_json(json!({ "price": 100 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unknown_status_name_is_a_validation_error() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::get()
        .uri("/api/lotto/status/lost")
        .insert_header(("Authorization", bearer(&jwt, UserRole::Customer)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_draw_rejects_empty_reward_list() {
    let jwt = jwt();
    let app = app!(jwt);

    let req = test::TestRequest::post()
        .uri("/api/admin/draw_random_number")
        .insert_header(("Authorization", bearer(&jwt, UserRole::Admin)))
        .set_json(json!({ "rewardPoints": [] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
