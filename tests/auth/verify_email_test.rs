use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_password, test_username, TestContext};

async fn register(ctx: &TestContext, username: &str) {
    ctx.server
        .post("/auth/register")
        .json(&json!({
            "username": username,
            "name": "New Student",
            "email": format!("{}@example.com", username),
            "phone": "+12345678901",
            "password": test_password()
        }))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn verification_token(ctx: &TestContext, username: &str) -> String {
    let (token,): (String,) = sqlx::query_as(
        r#"
        SELECT v.token FROM email_verifications v
        JOIN users u ON u.id = v.user_id
        WHERE u.username = ?
        "#,
    )
    .bind(username)
    .fetch_one(&ctx.db)
    .await
    .expect("verification token");
    token
}

#[tokio::test]
#[serial]
async fn verify_email_marks_user_verified() {
    let ctx = TestContext::new().await;
    let username = test_username("verify");
    register(&ctx, &username).await;
    let token = verification_token(&ctx, &username).await;

    let response = ctx
        .server
        .post("/auth/verify-email")
        .json(&json!({ "token": token }))
        .await;
    response.assert_status(StatusCode::OK);

    let (verified,): (bool,) =
        sqlx::query_as("SELECT email_verified FROM users WHERE username = ?")
            .bind(&username)
            .fetch_one(&ctx.db)
            .await
            .expect("user row");
    assert!(verified);

    // Still blocked until an admin approves.
    let login = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "username": &username,
            "password": test_password()
        }))
        .await;
    login.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = login.json();
    assert_eq!(body["error"], "PENDING_APPROVAL");

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn verify_email_token_is_single_use() {
    let ctx = TestContext::new().await;
    let username = test_username("once");
    register(&ctx, &username).await;
    let token = verification_token(&ctx, &username).await;

    ctx.server
        .post("/auth/verify-email")
        .json(&json!({ "token": &token }))
        .await
        .assert_status(StatusCode::OK);

    let replay = ctx
        .server
        .post("/auth/verify-email")
        .json(&json!({ "token": &token }))
        .await;
    replay.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn verify_email_with_unknown_token_fails() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/auth/verify-email")
        .json(&json!({ "token": "00000000-0000-0000-0000-000000000000" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn resend_verification_replaces_token() {
    let ctx = TestContext::new().await;
    let username = test_username("resend");
    register(&ctx, &username).await;
    let first = verification_token(&ctx, &username).await;

    ctx.server
        .post("/auth/resend-verification")
        .json(&json!({ "email": format!("{}@example.com", username) }))
        .await
        .assert_status(StatusCode::OK);

    let second = verification_token(&ctx, &username).await;
    assert_ne!(first, second);

    // The superseded token no longer works.
    let response = ctx
        .server
        .post("/auth/verify-email")
        .json(&json!({ "token": &first }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn resend_verification_for_verified_user_fails() {
    let ctx = TestContext::new().await;
    let username = test_username("already");
    ctx.create_user(&username).await;

    let response = ctx
        .server
        .post("/auth/resend-verification")
        .json(&json!({ "email": format!("{}@example.com", username) }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
