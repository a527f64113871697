use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_password, test_username, TestContext};

fn register_body(username: &str) -> serde_json::Value {
    json!({
        "username": username,
        "name": "New Student",
        "email": format!("{}@example.com", username),
        "phone": "+12345678901",
        "password": test_password()
    })
}

#[tokio::test]
#[serial]
async fn register_creates_unverified_unapproved_user() {
    let ctx = TestContext::new().await;
    let username = test_username("reg");

    let response = ctx
        .server
        .post("/auth/register")
        .json(&register_body(&username))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], username);

    let (verified, approved): (bool, bool) =
        sqlx::query_as("SELECT email_verified, approved FROM users WHERE username = ?")
            .bind(&username)
            .fetch_one(&ctx.db)
            .await
            .expect("user row");
    assert!(!verified);
    assert!(!approved);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_issues_verification_token() {
    let ctx = TestContext::new().await;
    let username = test_username("reg");

    ctx.server
        .post("/auth/register")
        .json(&register_body(&username))
        .await
        .assert_status(StatusCode::CREATED);

    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM email_verifications v
        JOIN users u ON u.id = v.user_id
        WHERE u.username = ?
        "#,
    )
    .bind(&username)
    .fetch_one(&ctx.db)
    .await
    .expect("count verifications");
    assert_eq!(count, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_duplicate_username_returns_conflict() {
    let ctx = TestContext::new().await;
    let username = test_username("dup");
    ctx.create_user(&username).await;

    let mut body = register_body(&username);
    body["email"] = json!(format!("other_{}@example.com", username));

    let response = ctx.server.post("/auth/register").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_duplicate_email_returns_conflict() {
    let ctx = TestContext::new().await;
    let existing = test_username("mail");
    ctx.create_user(&existing).await;

    let mut body = register_body(&test_username("mail2"));
    body["email"] = json!(format!("{}@example.com", existing));

    let response = ctx.server.post("/auth/register").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_rejects_short_password() {
    let ctx = TestContext::new().await;

    let mut body = register_body(&test_username("pw"));
    body["password"] = json!("short");

    let response = ctx.server.post("/auth/register").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_rejects_invalid_email() {
    let ctx = TestContext::new().await;

    let mut body = register_body(&test_username("email"));
    body["email"] = json!("not-an-email");

    let response = ctx.server.post("/auth/register").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn register_rejects_markup_in_username() {
    let ctx = TestContext::new().await;

    let mut body = register_body("ignored");
    body["username"] = json!("<script>bad</script>");

    let response = ctx.server.post("/auth/register").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}
