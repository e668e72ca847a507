//! Integration tests for accounts and the public catalog.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p farmlink-api)
//!
//! Run with: cargo test -p farmlink-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use farmlink_integration_tests::{api_base_url, client, register_and_login};

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health_endpoints() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to get health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to get readiness");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_registration_conflicts() {
    let client = client();
    let base_url = api_base_url();
    let email = format!("dup-{}@test.farmlink.dev", Uuid::new_v4());

    let register = |client: &reqwest::Client| {
        client
            .post(format!("{base_url}/api/v1/users/register"))
            .json(&json!({
                "fullname": "Dup User",
                "email": email,
                "password": "long-enough-pw",
            }))
            .send()
    };

    let first = register(&client).await.expect("first registration");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = register(&client).await.expect("second registration");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_profile_requires_token() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/v1/users/profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let account = register_and_login(&client).await;
    let resp = client
        .get(format!("{base_url}/api/v1/users/profile"))
        .bearer_auth(&account.token)
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse profile");
    assert_eq!(body["user"]["email"], json!(account.email));
    assert!(body["orders"].is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_catalog_is_public_and_paginated() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/v1/products?page=1&limit=5"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse products");
    assert_eq!(body["status"], "success");
    assert!(body["products"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_coupon_routes_require_admin() {
    let client = client();
    let base_url = api_base_url();
    let account = register_and_login(&client).await;

    let resp = client
        .get(format!("{base_url}/api/v1/coupons"))
        .bearer_auth(&account.token)
        .send()
        .await
        .expect("Failed to list coupons");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
