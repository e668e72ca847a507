//! Stripe Checkout API client.
//!
//! Only the hosted-checkout surface is used: create a session from line
//! items, hand the customer the session URL. Everything after that happens
//! on Stripe's side.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use farmlink_core::{CurrencyCode, OrderId, UserId};

use crate::config::StripeConfig;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One checkout line, already converted to minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor currency units (cents).
    pub unit_amount: i64,
    pub quantity: i64,
}

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted checkout URL to redirect the customer to.
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

/// Stripe API client for hosted checkout sessions.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    success_url: String,
    cancel_url: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| StripeError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        })
    }

    /// Create a hosted checkout session for an order.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response carries no
    /// checkout URL.
    pub async fn create_checkout_session(
        &self,
        items: &[LineItem],
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!("{BASE_URL}/checkout/sessions");
        let form = session_form(
            items,
            order_id,
            user_id,
            &self.success_url,
            &self.cancel_url,
        );

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| StripeError::Parse("session has no checkout url".to_owned()))?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}

/// Build the form-encoded session parameters Stripe expects.
///
/// Stripe's form encoding flattens nested objects into bracketed keys,
/// e.g. `line_items[0][price_data][unit_amount]`.
fn session_form(
    items: &[LineItem],
    order_id: OrderId,
    user_id: UserId,
    success_url: &str,
    cancel_url: &str,
) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("success_url".to_owned(), success_url.to_owned()),
        ("cancel_url".to_owned(), cancel_url.to_owned()),
        ("metadata[order_id]".to_owned(), order_id.to_string()),
        ("metadata[user_id]".to_owned(), user_id.to_string()),
    ];

    let currency = CurrencyCode::default().as_str();
    for (i, item) in items.iter().enumerate() {
        form.push((
            format!("line_items[{i}][price_data][currency]"),
            currency.to_owned(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(description) = &item.description {
            form.push((
                format!("line_items[{i}][price_data][product_data][description]"),
                description.clone(),
            ));
        }
        form.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
    }

    form
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn find<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_session_form_basics() {
        let items = vec![LineItem {
            name: "Honeycrisp Apples".to_owned(),
            description: Some("5lb box".to_owned()),
            unit_amount: 1250,
            quantity: 2,
        }];
        let form = session_form(
            &items,
            OrderId::new(7),
            UserId::new(3),
            "https://farmlink.dev/success",
            "https://farmlink.dev/cancel",
        );

        assert_eq!(find(&form, "mode"), Some("payment"));
        assert_eq!(find(&form, "metadata[order_id]"), Some("7"));
        assert_eq!(find(&form, "metadata[user_id]"), Some("3"));
        assert_eq!(
            find(&form, "line_items[0][price_data][currency]"),
            Some("usd")
        );
        assert_eq!(
            find(&form, "line_items[0][price_data][product_data][name]"),
            Some("Honeycrisp Apples")
        );
        assert_eq!(
            find(&form, "line_items[0][price_data][unit_amount]"),
            Some("1250")
        );
        assert_eq!(find(&form, "line_items[0][quantity]"), Some("2"));
    }

    #[test]
    fn test_session_form_indexes_multiple_items() {
        let items = vec![
            LineItem {
                name: "Eggs".to_owned(),
                description: None,
                unit_amount: 450,
                quantity: 1,
            },
            LineItem {
                name: "Butter".to_owned(),
                description: None,
                unit_amount: 700,
                quantity: 3,
            },
        ];
        let form = session_form(
            &items,
            OrderId::new(1),
            UserId::new(1),
            "https://farmlink.dev/success",
            "https://farmlink.dev/cancel",
        );

        assert_eq!(
            find(&form, "line_items[1][price_data][product_data][name]"),
            Some("Butter")
        );
        assert_eq!(find(&form, "line_items[1][quantity]"), Some("3"));
    }

    #[test]
    fn test_session_form_omits_missing_description() {
        let items = vec![LineItem {
            name: "Eggs".to_owned(),
            description: None,
            unit_amount: 450,
            quantity: 1,
        }];
        let form = session_form(
            &items,
            OrderId::new(1),
            UserId::new(1),
            "https://farmlink.dev/success",
            "https://farmlink.dev/cancel",
        );

        assert!(find(&form, "line_items[0][price_data][product_data][description]").is_none());
    }
}
