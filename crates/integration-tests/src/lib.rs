//! Integration tests for FarmLink.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations
//! cargo run -p farmlink-cli -- migrate
//!
//! # Start the API server
//! cargo run -p farmlink-api
//!
//! # Run the (ignored-by-default) integration tests
//! cargo test -p farmlink-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d unless a server is running at `API_BASE_URL`
//! (default `http://localhost:3000`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A registered test account with its bearer token.
pub struct TestAccount {
    pub email: String,
    pub password: String,
    pub token: String,
    pub user: Value,
}

/// Build a plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a fresh buyer account and log in, returning its bearer token.
///
/// # Panics
///
/// Panics if registration or login fails.
pub async fn register_and_login(client: &Client) -> TestAccount {
    let base_url = api_base_url();
    let email = format!("buyer-{}@test.farmlink.dev", Uuid::new_v4());
    let password = "integration-test-pw".to_string();

    let resp = client
        .post(format!("{base_url}/api/v1/users/register"))
        .json(&json!({
            "fullname": "Integration Buyer",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to register");
    assert!(
        resp.status().is_success(),
        "registration failed: {}",
        resp.status()
    );

    let resp = client
        .post(format!("{base_url}/api/v1/users/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());

    let body: Value = resp.json().await.expect("Failed to parse login response");
    let token = body["token"]
        .as_str()
        .expect("login response has no token")
        .to_string();

    TestAccount {
        email,
        password,
        token,
        user: body["user"].clone(),
    }
}

/// Set a shipping address on the account.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn set_shipping_address(client: &Client, account: &TestAccount) {
    let base_url = api_base_url();
    let resp = client
        .put(format!("{base_url}/api/v1/users/shipping"))
        .bearer_auth(&account.token)
        .json(&json!({
            "first_name": "Integration",
            "last_name": "Buyer",
            "address": "1 Orchard Lane",
            "city": "Harvest Falls",
            "postal_code": "12345",
            "province": "VT",
            "country": "US",
            "phone": "+1-555-0100",
        }))
        .send()
        .await
        .expect("Failed to set shipping address");
    assert!(resp.status().is_success());
}
