//! Login, token checks, and role enforcement over HTTP.

mod common;

use admissions_api::bootstrap::ensure_admin;
use admissions_db::repositories::UserRepo;
use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, post_json_auth, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_token_and_user(pool: PgPool) {
    let user = common::create_user(&pool, "registrar", "staff").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": "registrar", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 24 * 3600);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "staff");
    assert!(json["user"].get("password_hash").is_none());

    let token = json["access_token"].as_str().unwrap();
    let me = get_auth(app, "/api/v1/auth/me", token).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["data"]["username"], "registrar");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_or_unknown_user_is_401(pool: PgPool) {
    common::create_user(&pool, "registrar", "staff").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": "registrar", "password": "nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "ghost", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_routes_require_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in [
        "/api/v1/leads",
        "/api/v1/students",
        "/api/v1/applications",
        "/api/v1/tasks",
        "/api/v1/timeline",
        "/api/v1/lookups/degree",
        "/api/v1/auth/me",
    ] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }

    let response = get_auth(app, "/api/v1/leads", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lookup_writes_need_admin(pool: PgPool) {
    let staff = common::staff_token(&pool).await;
    let admin = common::admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let body = json!({ "name": "Bachelor" });
    let response =
        post_json_auth(app.clone(), "/api/v1/lookups/degree", body.clone(), &staff).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app.clone(), "/api/v1/lookups/degree", body, &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app, "/api/v1/lookups/degree", &staff).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_admin_only_on_empty_table(pool: PgPool) {
    let created = ensure_admin(&pool, "root", "first-password").await.unwrap();
    let admin = created.expect("admin should be created on an empty table");
    assert_eq!(admin.role, "admin");

    let again = ensure_admin(&pool, "other", "second-password").await.unwrap();
    assert!(again.is_none());
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "root", "password": "first-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
