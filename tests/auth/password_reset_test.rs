use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

use yoga_attendance::services::hashing;

use crate::common::{test_password, test_username, TestContext};

async fn seed_reset_code(ctx: &TestContext, user_id: &str, otp: &str, expires_in_minutes: i64) {
    sqlx::query(
        "INSERT INTO password_resets (id, user_id, otp_hash, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(hashing::sha256_hex(otp))
    .bind(Utc::now() + Duration::minutes(expires_in_minutes))
    .execute(&ctx.db)
    .await
    .expect("seed reset code");
}

#[tokio::test]
#[serial]
async fn forgot_password_creates_reset_code() {
    let ctx = TestContext::new().await;
    let username = test_username("forgot");
    let user_id = ctx.create_user(&username).await;

    let response = ctx
        .server
        .post("/auth/forgot-password")
        .json(&json!({ "email": format!("{}@example.com", username) }))
        .await;
    response.assert_status(StatusCode::OK);

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM password_resets WHERE user_id = ?")
            .bind(&user_id)
            .fetch_one(&ctx.db)
            .await
            .expect("count resets");
    assert_eq!(count, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_password_with_valid_code_changes_password() {
    let ctx = TestContext::new().await;
    let username = test_username("reset");
    let user_id = ctx.create_user(&username).await;
    seed_reset_code(&ctx, &user_id, "123456", 15).await;

    let response = ctx
        .server
        .post("/auth/reset-password")
        .json(&json!({
            "email": format!("{}@example.com", username),
            "otp": "123456",
            "new_password": "BrandNewPass99!"
        }))
        .await;
    response.assert_status(StatusCode::OK);

    // Old password no longer works, new one does.
    ctx.server
        .post("/auth/login")
        .json(&json!({
            "username": &username,
            "password": test_password()
        }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/auth/login")
        .json(&json!({
            "username": &username,
            "password": "BrandNewPass99!"
        }))
        .await
        .assert_status(StatusCode::OK);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_password_revokes_existing_sessions() {
    let ctx = TestContext::new().await;
    let username = test_username("revoke");
    let user_id = ctx.create_user(&username).await;

    let login: serde_json::Value = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "username": &username,
            "password": test_password()
        }))
        .await
        .json();
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    seed_reset_code(&ctx, &user_id, "654321", 15).await;
    ctx.server
        .post("/auth/reset-password")
        .json(&json!({
            "email": format!("{}@example.com", username),
            "otp": "654321",
            "new_password": "BrandNewPass99!"
        }))
        .await
        .assert_status(StatusCode::OK);

    let response = ctx
        .server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": &refresh_token }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_password_with_wrong_code_fails() {
    let ctx = TestContext::new().await;
    let username = test_username("wrongotp");
    let user_id = ctx.create_user(&username).await;
    seed_reset_code(&ctx, &user_id, "123456", 15).await;

    let response = ctx
        .server
        .post("/auth/reset-password")
        .json(&json!({
            "email": format!("{}@example.com", username),
            "otp": "999999",
            "new_password": "BrandNewPass99!"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_password_with_expired_code_fails() {
    let ctx = TestContext::new().await;
    let username = test_username("expired");
    let user_id = ctx.create_user(&username).await;
    seed_reset_code(&ctx, &user_id, "123456", -5).await;

    let response = ctx
        .server
        .post("/auth/reset-password")
        .json(&json!({
            "email": format!("{}@example.com", username),
            "otp": "123456",
            "new_password": "BrandNewPass99!"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn reset_code_is_single_use() {
    let ctx = TestContext::new().await;
    let username = test_username("singleuse");
    let user_id = ctx.create_user(&username).await;
    seed_reset_code(&ctx, &user_id, "123456", 15).await;

    let body = json!({
        "email": format!("{}@example.com", username),
        "otp": "123456",
        "new_password": "BrandNewPass99!"
    });

    ctx.server
        .post("/auth/reset-password")
        .json(&body)
        .await
        .assert_status(StatusCode::OK);

    let replay = ctx.server.post("/auth/reset-password").json(&body).await;
    replay.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
