//! Integration tests for theme preferences and call-back requests.

use mebel_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_theme_toggle_is_per_visitor() {
    let ctx = TestContext::new().await;
    let client = ctx.visitor();

    let body: Value = client
        .get(ctx.url("/api/preferences/theme"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["darkMode"], false);

    let body: Value = client
        .post(ctx.url("/api/preferences/theme/toggle"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["darkMode"], true);

    let other: Value = ctx
        .visitor()
        .get(ctx.url("/api/preferences/theme"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(other["darkMode"], false);
}

#[tokio::test]
async fn test_valid_callback_request() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .visitor()
        .post(ctx.url("/api/contact/callback"))
        .json(&json!({
            "name": "Иван Петров",
            "phone": "+7-912-345-67-89",
            "email": "ivan@example.ru",
            "message": "Перезвоните после 18:00"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["callback"]["phone"], "+7-912-345-67-89");
    assert!(body["callback"]["submittedAt"].is_string());
}

#[tokio::test]
async fn test_invalid_callback_request_reports_fields() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .visitor()
        .post(ctx.url("/api/contact/callback"))
        .json(&json!({
            "name": "<script>",
            "phone": "позвоните",
            "email": "not-an-email"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.unwrap();
    let fields = body["fields"].as_object().unwrap();
    assert!(fields.contains_key("name"));
    assert!(fields.contains_key("phone"));
    assert_eq!(fields["email"], "Invalid email");
}

#[tokio::test]
async fn test_last_callback_prefills_the_form() {
    let ctx = TestContext::new().await;
    let client = ctx.visitor();

    let body: Value = client
        .get(ctx.url("/api/contact/callback"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["callback"].is_null());

    let resp = client
        .post(ctx.url("/api/contact/callback"))
        .json(&json!({ "name": "Анна", "phone": "+7-900-000-00-00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = client
        .get(ctx.url("/api/contact/callback"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["callback"]["name"], "Анна");
    assert_eq!(body["callback"]["phone"], "+7-900-000-00-00");

    let other: Value = ctx
        .visitor()
        .get(ctx.url("/api/contact/callback"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(other["callback"].is_null());
}

#[tokio::test]
async fn test_unreadable_callback_body_is_bad_request() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .visitor()
        .post(ctx.url("/api/contact/callback"))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(body.get("fields").is_none());
}
