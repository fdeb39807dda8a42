mod common;

use axum::http::StatusCode;
use campus_identity::campus_core::permissions;
use campus_identity::campus_models::{AccountStatus, RoleStatus};
use campus_identity::modules::auth::controller::FORGOT_PASSWORD_MESSAGE;
use common::{STRONG_PASSWORD, TestApp, send, unique_username};
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), "GET", "/api/nowhere", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Resource not found");
}

#[tokio::test]
async fn test_signup_then_signin() {
    let app = TestApp::new();
    let username = unique_username();

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": STRONG_PASSWORD
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["status"], "ACTIVE");
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": username, "password": STRONG_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].as_str().is_some());
    assert_eq!(body["identity"]["username"], username.as_str());
}

#[tokio::test]
async fn test_signup_rejects_invalid_username() {
    let app = TestApp::new();

    let (status, _) = send(
        app.router(),
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "username": "no spaces allowed",
            "email": "someone@example.com",
            "password": STRONG_PASSWORD
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signin_failures_are_indistinguishable() {
    let app = TestApp::new();
    let username = unique_username();
    app.create_account(&username, STRONG_PASSWORD, AccountStatus::Active)
        .await;

    let (wrong_status, wrong_body) = send(
        app.router(),
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": username, "password": "Wrong@Pass1" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        app.router(),
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": "ghost-user", "password": "Wrong@Pass1" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, wrong_status);
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_blocked_account_gets_forbidden() {
    let app = TestApp::new();
    app.create_account("bob", STRONG_PASSWORD, AccountStatus::Blocked)
        .await;

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": "bob", "password": STRONG_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is blocked");
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let app = TestApp::new();
    let username = unique_username();
    app.create_account(&username, STRONG_PASSWORD, AccountStatus::Active)
        .await;

    let (known_status, known_body) = send(
        app.router(),
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": format!("{}@example.com", username) })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        app.router(),
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known_body, unknown_body);
    assert_eq!(known_body["message"], FORGOT_PASSWORD_MESSAGE);
    assert_eq!(app.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_forgot_password_succeeds_when_delivery_fails() {
    let app = TestApp::new();
    let username = unique_username();
    app.create_account(&username, STRONG_PASSWORD, AccountStatus::Active)
        .await;
    app.notifier.fail_deliveries();

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": format!("{}@example.com", username) })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], FORGOT_PASSWORD_MESSAGE);
}

#[tokio::test]
async fn test_reset_password_flow() {
    let app = TestApp::new();
    let username = unique_username();
    app.create_account(&username, STRONG_PASSWORD, AccountStatus::Active)
        .await;

    send(
        app.router(),
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": format!("{}@example.com", username) })),
    )
    .await;
    let token = app.notifier.last_token().unwrap();

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/reset-password/validate",
        None,
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({ "token": token, "new_password": "weak" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("strength policy"));

    let (status, _) = send(
        app.router(),
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({ "token": token, "new_password": "NewP@ssw0rd1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/reset-password",
        None,
        Some(json!({ "token": token, "new_password": "NewP@ssw0rd2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password reset token has already been used");

    let (_, body) = send(
        app.router(),
        "POST",
        "/api/auth/reset-password/validate",
        None,
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["reason"], "token_already_used");

    app.bearer(&username, "NewP@ssw0rd1").await;
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::new();
    let target = app
        .create_account(&unique_username(), STRONG_PASSWORD, AccountStatus::Active)
        .await;

    let (status, _) = send(
        app.router(),
        "GET",
        &format!("/api/users/{}", target.id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_check_permissions() {
    let app = TestApp::new();
    let clerk_name = unique_username();
    let clerk = app
        .create_account(&clerk_name, STRONG_PASSWORD, AccountStatus::Active)
        .await;
    app.grant(&clerk, "clerk", RoleStatus::Active, &[permissions::USERS_READ])
        .await;
    let target = app
        .create_account(&unique_username(), STRONG_PASSWORD, AccountStatus::Active)
        .await;
    let token = app.bearer(&clerk_name, STRONG_PASSWORD).await;

    let (status, body) = send(
        app.router(),
        "GET",
        &format!("/api/users/{}", target.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], target.id.to_string());

    let (status, _) = send(
        app.router(),
        "DELETE",
        &format!("/api/users/{}", target.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_super_admin_manages_accounts_and_roles() {
    let app = TestApp::new();
    let admin_name = unique_username();
    app.create_super_admin(&admin_name, STRONG_PASSWORD).await;
    let token = app.bearer(&admin_name, STRONG_PASSWORD).await;

    let member_name = unique_username();
    let member = app
        .create_account(&member_name, STRONG_PASSWORD, AccountStatus::Active)
        .await;

    let (status, permission) = send(
        app.router(),
        "POST",
        "/api/permissions",
        Some(&token),
        Some(json!({ "code": "reports:view", "description": "View reports" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(permission["module"], "reports");

    let (status, role) = send(
        app.router(),
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({ "name": "analyst" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(role["status"], "ACTIVE");
    let role_id = role["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app.router(),
        "POST",
        &format!("/api/roles/{}/permissions", role_id),
        Some(&token),
        Some(json!({ "permission_ids": [permission["id"]] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        app.router(),
        "POST",
        &format!("/api/users/{}/roles", member.id),
        Some(&token),
        Some(json!({ "role_id": role_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": member_name, "password": STRONG_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["permissions"], json!(["reports:view"]));

    let (status, _) = send(
        app.router(),
        "PATCH",
        &format!("/api/users/{}/status", member.id),
        Some(&token),
        Some(json!({ "status": "BLOCKED" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        app.router(),
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": member_name, "password": STRONG_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        app.router(),
        "DELETE",
        &format!("/api/users/{}", member.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        app.router(),
        "GET",
        &format!("/api/users/{}", member.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grant_unknown_permission_is_unprocessable() {
    let app = TestApp::new();
    let admin_name = unique_username();
    app.create_super_admin(&admin_name, STRONG_PASSWORD).await;
    let token = app.bearer(&admin_name, STRONG_PASSWORD).await;

    let (_, role) = send(
        app.router(),
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({ "name": "empty" })),
    )
    .await;

    let (status, _) = send(
        app.router(),
        "POST",
        &format!("/api/roles/{}/permissions", role["id"].as_str().unwrap()),
        Some(&token),
        Some(json!({ "permission_ids": [uuid::Uuid::new_v4()] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_path_id_is_json_bad_request() {
    let app = TestApp::new();
    let admin_name = unique_username();
    app.create_super_admin(&admin_name, STRONG_PASSWORD).await;
    let token = app.bearer(&admin_name, STRONG_PASSWORD).await;

    let (status, body) = send(
        app.router(),
        "GET",
        "/api/users/not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid path parameter")
    );

    let (status, body) = send(
        app.router(),
        "POST",
        "/api/roles/42/permissions",
        Some(&token),
        Some(json!({ "permission_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
