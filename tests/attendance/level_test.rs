use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_username, TestContext};

#[tokio::test]
#[serial]
async fn level_two_unlocks_on_the_120th_attended_day() {
    let ctx = TestContext::new().await;
    let username = test_username("adept");
    let user_id = ctx.create_user(&username).await;
    ctx.seed_attended_days(&user_id, 119).await;
    ctx.seed_progress_today(&username).await;
    let token = ctx.login(&username).await;

    let response = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": true }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["days_completed"], 120);
    assert_eq!(body["level"], 2);
    // The record keeps the level held at submission time.
    assert_eq!(body["record"]["level"], 1);

    // The cached column was refreshed too.
    let (level,): (i32,) = sqlx::query_as("SELECT level FROM users WHERE username = ?")
        .bind(&username)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(level, 2);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn day_119_stays_on_level_one() {
    let ctx = TestContext::new().await;
    let username = test_username("almost");
    let user_id = ctx.create_user(&username).await;
    ctx.seed_attended_days(&user_id, 118).await;
    ctx.seed_progress_today(&username).await;
    let token = ctx.login(&username).await;

    let response = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": true }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["days_completed"], 119);
    assert_eq!(body["level"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn absent_days_do_not_count_toward_level() {
    let ctx = TestContext::new().await;
    let username = test_username("skipper");
    let user_id = ctx.create_user(&username).await;
    ctx.seed_attended_days(&user_id, 2).await;

    // A run of absences in between.
    let today = chrono::Utc::now().date_naive();
    for i in 3..=6 {
        sqlx::query(
            r#"
            INSERT INTO attendance (id, user_id, attendance_date, attended, level, device_info)
            VALUES (?, ?, ?, FALSE, 1, 'seed')
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&user_id)
        .bind(today - chrono::Duration::days(i))
        .execute(&ctx.db)
        .await
        .unwrap();
    }

    let token = ctx.login(&username).await;
    let response = ctx.server.get("/auth/me").authorization_bearer(&token).await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["days_completed"], 2);
    assert_eq!(body["level"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn level_three_is_terminal() {
    let ctx = TestContext::new().await;
    let username = test_username("master");
    let user_id = ctx.create_user(&username).await;
    ctx.seed_attended_days(&user_id, 500).await;

    let token = ctx.login(&username).await;
    let response = ctx.server.get("/auth/me").authorization_bearer(&token).await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["days_completed"], 500);
    assert_eq!(body["level"], 3);

    ctx.cleanup().await;
}
