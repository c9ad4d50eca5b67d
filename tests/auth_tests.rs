mod common;

use axum::http::StatusCode;
use common::{ADMIN_PASSWORD, USER_PASSWORD, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_health_reports_ok() {
    let app = spawn_app().await;

    let response = app.get("/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = spawn_app().await;

    let response = app.get("/api/does-not-exist", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_register_starts_session() {
    let app = spawn_app().await;

    let (id, cookie) = app.register("alice").await;

    let me = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["id"], id);
    assert_eq!(me.data()["username"], "alice");
    assert_eq!(me.data()["email"], "alice@example.com");
    assert_eq!(me.data()["role"], "user");
    assert_eq!(me.data()["must_change_password"], false);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = spawn_app().await;
    app.register("alice").await;

    let duplicate = app
        .post(
            "/api/auth/register",
            None,
            json!({"username": "alice", "email": "other@example.com", "password": USER_PASSWORD}),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let short_password = app
        .post(
            "/api/auth/register",
            None,
            json!({"username": "bob", "email": "bob@example.com", "password": "short"}),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_password.error(), "Password must be at least 8 characters");

    let missing = app.post("/api/auth/register", None, json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_accepts_username_or_email() {
    let app = spawn_app().await;
    app.register("alice").await;

    let by_name = app
        .post(
            "/api/auth/login",
            None,
            json!({"username": "alice", "password": USER_PASSWORD}),
        )
        .await;
    assert_eq!(by_name.status, StatusCode::OK);
    assert!(by_name.cookie.is_some());

    let by_email = app
        .post(
            "/api/auth/login",
            None,
            json!({"username": "alice@example.com", "password": USER_PASSWORD}),
        )
        .await;
    assert_eq!(by_email.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_401() {
    let app = spawn_app().await;
    app.register("alice").await;

    let response = app
        .post(
            "/api/auth/login",
            None,
            json!({"username": "alice", "password": "not-the-password"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);

    let unknown = app
        .post(
            "/api/auth/login",
            None,
            json!({"username": "nobody", "password": USER_PASSWORD}),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = spawn_app().await;

    let response = app.get("/api/auth/me", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Not authenticated");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;
    let (_, cookie) = app.register("alice").await;

    let logout = app.post("/api/auth/logout", Some(&cookie), json!({})).await;
    assert_eq!(logout.status, StatusCode::OK);

    let me = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bootstrap_admin_must_change_password() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let me = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.data()["role"], "admin");
    assert_eq!(me.data()["must_change_password"], true);

    let changed = app
        .put(
            "/api/auth/password",
            Some(&cookie),
            json!({"current_password": ADMIN_PASSWORD, "new_password": "a-much-better-one"}),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK, "{:?}", changed.body);

    let me = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.data()["must_change_password"], false);

    let old = app
        .post(
            "/api/auth/login",
            None,
            json!({"username": "admin", "password": ADMIN_PASSWORD}),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_checks_current() {
    let app = spawn_app().await;
    let (_, cookie) = app.register("alice").await;

    let response = app
        .put(
            "/api/auth/password",
            Some(&cookie),
            json!({"current_password": "wrong-password", "new_password": "another-secret"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_banned_user_is_locked_out() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (id, cookie) = app.register("mallory").await;

    let ban = app
        .patch(
            &format!("/api/users/{id}/status"),
            Some(&admin),
            json!({"status": "banned"}),
        )
        .await;
    assert_eq!(ban.status, StatusCode::OK, "{:?}", ban.body);

    let me = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);
    assert_eq!(me.error(), "Account is banned");

    let login = app
        .post(
            "/api/auth/login",
            None,
            json!({"username": "mallory", "password": USER_PASSWORD}),
        )
        .await;
    assert_eq!(login.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tampered_cookie_is_anonymous() {
    let app = spawn_app().await;
    let (_, cookie) = app.register("alice").await;

    let (name, value) = cookie.split_once('=').unwrap();
    let tampered = format!("{name}=x{value}");

    let me = app.get("/api/auth/me", Some(&tampered)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}
