//! Integration tests for health checks and catalogue loading.

use mebel_integration_tests::TestContext;
use mebel_storefront::catalogue::CatalogueSource;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;
    let client = ctx.visitor();

    let resp = client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_readiness_fails_without_catalogue() {
    let ctx = TestContext::with_source(CatalogueSource::File("/nonexistent/db.json".into())).await;

    let resp = ctx.visitor().get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_bundled_document_is_served_statically() {
    let ctx = TestContext::new().await;

    let resp = ctx.visitor().get(ctx.url("/db.json")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let document: Value = resp.json().await.unwrap();
    assert!(document.get("CatalogueProducts").is_some());
}

#[tokio::test]
async fn test_catalogue_index_lists_descriptors() {
    let ctx = TestContext::new().await;

    let resp = ctx.visitor().get(ctx.url("/api/catalogue")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"]["outcome"], "categories");
    assert!(body["products"].as_array().unwrap().is_empty());

    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert!(categories.iter().all(|c| c["uid"].is_string()));
}

#[tokio::test]
async fn test_category_by_russian_label() {
    let ctx = TestContext::new().await;
    let client = ctx.visitor();

    let resp = client
        .get(ctx.url("/api/catalogue/kitchen"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"]["count"], 5);
    assert_eq!(body["selected"]["key"], "kitchen");
    assert!(body["categories"].as_array().unwrap().is_empty());

    let resp = client
        .get(ctx.url("/api/catalogue/%D1%81%D0%BF%D0%B0%D0%BB%D1%8C%D0%BD%D0%B8"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["products"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .visitor()
        .get(ctx.url("/api/catalogue/nonexistent"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_unreachable_catalogue_is_bad_gateway() {
    let ctx = TestContext::with_source(CatalogueSource::File("/nonexistent/db.json".into())).await;

    let resp = ctx
        .visitor()
        .get(ctx.url("/api/catalogue/kitchen"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_refresh_and_works() {
    let ctx = TestContext::new().await;
    let client = ctx.visitor();

    let resp = client
        .post(ctx.url("/api/catalogue/refresh"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get(ctx.url("/api/works")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let works: Value = resp.json().await.unwrap();
    let works = works.as_array().unwrap();
    assert_eq!(works.len(), 3);
    assert!(works[0]["title"].is_string());
}
