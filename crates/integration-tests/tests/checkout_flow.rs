//! Integration tests for the checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p farmlink-api)
//!
//! Run with: cargo test -p farmlink-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use farmlink_integration_tests::{
    api_base_url, client, register_and_login, set_shipping_address,
};

fn order_items() -> Value {
    json!([
        {
            "product_id": null,
            "name": "Honeycrisp Apples",
            "description": "5lb box",
            "qty": 2,
            "price": "12.50",
        }
    ])
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_empty_order_rejected() {
    let client = client();
    let base_url = api_base_url();
    let account = register_and_login(&client).await;
    set_shipping_address(&client, &account).await;

    let resp = client
        .post(format!("{base_url}/api/v1/orders"))
        .bearer_auth(&account.token)
        .json(&json!({ "items": [] }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["status"], "error");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_without_shipping_address_rejected() {
    let client = client();
    let base_url = api_base_url();
    // No shipping address set on this account
    let account = register_and_login(&client).await;

    let resp = client
        .post(format!("{base_url}/api/v1/orders"))
        .bearer_auth(&account.token)
        .json(&json!({ "items": order_items() }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .to_lowercase()
            .contains("shipping"),
        "unexpected message: {body}"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_unknown_coupon_rejected() {
    let client = client();
    let base_url = api_base_url();
    let account = register_and_login(&client).await;
    set_shipping_address(&client, &account).await;

    let resp = client
        .post(format!(
            "{base_url}/api/v1/orders?coupon=NO-SUCH-COUPON-EVER"
        ))
        .bearer_auth(&account.token)
        .json(&json!({ "items": order_items() }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server, database, and Stripe test key"]
async fn test_checkout_returns_payment_url() {
    let client = client();
    let base_url = api_base_url();
    let account = register_and_login(&client).await;
    set_shipping_address(&client, &account).await;

    let resp = client
        .post(format!("{base_url}/api/v1/orders"))
        .bearer_auth(&account.token)
        .json(&json!({ "items": order_items() }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["status"], "success");
    assert!(
        body["url"].as_str().is_some_and(|u| u.starts_with("http")),
        "expected a hosted checkout url, got: {body}"
    );
    assert_eq!(body["order"]["status"], "pending");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_requires_auth() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/api/v1/orders"))
        .json(&json!({ "items": order_items() }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
