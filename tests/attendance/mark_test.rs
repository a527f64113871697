use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

use crate::common::{test_username, TestContext};

#[tokio::test]
#[serial]
async fn absent_submission_needs_no_checklist() {
    let ctx = TestContext::new().await;
    let username = test_username("absent");
    ctx.create_user(&username).await;
    let token = ctx.login(&username).await;

    let response = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": false }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["record"]["attended"], false);
    assert_eq!(body["days_completed"], 0);
    assert_eq!(body["level"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn present_without_checklist_is_rejected_with_missing_tasks() {
    let ctx = TestContext::new().await;
    let username = test_username("unready");
    ctx.create_user(&username).await;
    let token = ctx.login(&username).await;

    let response = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": true }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    let missing: Vec<String> = body["missing"]
        .as_array()
        .expect("missing list")
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(missing, vec!["video", "routine", "habits"]);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn present_after_full_checklist_succeeds() {
    let ctx = TestContext::new().await;
    let username = test_username("ready");
    ctx.create_user(&username).await;
    ctx.seed_progress_today(&username).await;
    let token = ctx.login(&username).await;

    let response = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": true, "device_info": "ios 17" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["record"]["attended"], true);
    assert_eq!(body["record"]["device_info"], "ios 17");
    assert_eq!(body["days_completed"], 1);
    assert_eq!(body["level"], 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn second_submission_same_day_conflicts() {
    let ctx = TestContext::new().await;
    let username = test_username("twice");
    ctx.create_user(&username).await;
    let token = ctx.login(&username).await;

    ctx.server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": false }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": false }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn concurrent_submissions_accept_exactly_one() {
    let ctx = TestContext::new().await;
    let username = test_username("race");
    ctx.create_user(&username).await;
    let token = ctx.login(&username).await;

    let first = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": false }));
    let second = ctx
        .server
        .post("/attendance/mark")
        .authorization_bearer(&token)
        .json(&json!({ "attended": false }));

    let (a, b) = tokio::join!(first, second);

    let statuses = [a.status_code(), b.status_code()];
    assert!(statuses.contains(&StatusCode::CREATED));
    assert!(statuses.contains(&StatusCode::CONFLICT));

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM attendance a JOIN users u ON u.id = a.user_id WHERE u.username = ?",
    )
    .bind(&username)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(count, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn mark_requires_authentication() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/attendance/mark")
        .json(&json!({ "attended": false }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    ctx.cleanup().await;
}

#[tokio::test]
#[serial]
async fn user_sees_only_their_own_history() {
    let ctx = TestContext::new().await;
    let alice = test_username("alice");
    let bob = test_username("bob");
    let alice_id = ctx.create_user(&alice).await;
    ctx.create_user(&bob).await;
    ctx.seed_attended_days(&alice_id, 2).await;

    let alice_token = ctx.login(&alice).await;
    let bob_token = ctx.login(&bob).await;

    let own = ctx
        .server
        .get(&format!("/attendance/user/{}", alice))
        .authorization_bearer(&alice_token)
        .await;
    own.assert_status(StatusCode::OK);
    let records: Vec<serde_json::Value> = own.json();
    assert_eq!(records.len(), 2);

    let other = ctx
        .server
        .get(&format!("/attendance/user/{}", alice))
        .authorization_bearer(&bob_token)
        .await;
    other.assert_status(StatusCode::FORBIDDEN);

    ctx.cleanup().await;
}
