//! Email service for transactional notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Callers
//! that treat email as fire-and-forget spawn the send and log failures.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use farmlink_core::OrderStatus;

use crate::config::EmailConfig;

/// HTML template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmailHtml<'a> {
    name: &'a str,
}

/// Plain text template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeEmailText<'a> {
    name: &'a str,
}

/// HTML template for the email-verification email.
#[derive(Template)]
#[template(path = "email/verification_code.html")]
struct VerificationEmailHtml<'a> {
    token: &'a str,
}

/// Plain text template for the email-verification email.
#[derive(Template)]
#[template(path = "email/verification_code.txt")]
struct VerificationEmailText<'a> {
    token: &'a str,
}

/// HTML template for the password-reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    token: &'a str,
}

/// Plain text template for the password-reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    token: &'a str,
}

/// HTML template for the order-status email.
#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusEmailHtml<'a> {
    order_number: &'a str,
    status: &'a str,
}

/// Plain text template for the order-status email.
#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusEmailText<'a> {
    order_number: &'a str,
    status: &'a str,
}

/// HTML template for the product-created email.
#[derive(Template)]
#[template(path = "email/product_created.html")]
struct ProductCreatedEmailHtml<'a> {
    product_name: &'a str,
}

/// Plain text template for the product-created email.
#[derive(Template)]
#[template(path = "email/product_created.txt")]
struct ProductCreatedEmailText<'a> {
    product_name: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a welcome email after registration.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        let html = WelcomeEmailHtml { name }.render()?;
        let text = WelcomeEmailText { name }.render()?;

        self.send_multipart_email(to, "Welcome to FarmLink", &text, &html)
            .await
    }

    /// Send an email-verification token.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_verification_token(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let html = VerificationEmailHtml { token }.render()?;
        let text = VerificationEmailText { token }.render()?;

        self.send_multipart_email(to, "Verify your FarmLink email", &text, &html)
            .await
    }

    /// Send a password-reset token.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), EmailError> {
        let html = PasswordResetEmailHtml { token }.render()?;
        let text = PasswordResetEmailText { token }.render()?;

        self.send_multipart_email(to, "Reset your FarmLink password", &text, &html)
            .await
    }

    /// Send an order-status update.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_status(
        &self,
        to: &str,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<(), EmailError> {
        let status = status.as_str();
        let html = OrderStatusEmailHtml {
            order_number,
            status,
        }
        .render()?;
        let text = OrderStatusEmailText {
            order_number,
            status,
        }
        .render()?;

        self.send_multipart_email(
            to,
            &format!("Your FarmLink order #{order_number}"),
            &text,
            &html,
        )
        .await
    }

    /// Confirm to a vendor that their product is live.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_product_created(
        &self,
        to: &str,
        product_name: &str,
    ) -> Result<(), EmailError> {
        let html = ProductCreatedEmailHtml { product_name }.render()?;
        let text = ProductCreatedEmailText { product_name }.render()?;

        self.send_multipart_email(to, "Your product is live on FarmLink", &text, &html)
            .await
    }

    /// Send a multipart (text + HTML) email.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_owned()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_owned()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_owned()),
                    ),
            )?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_templates_render() {
        let html = WelcomeEmailHtml { name: "Ada" }.render().unwrap();
        let text = WelcomeEmailText { name: "Ada" }.render().unwrap();
        assert!(html.contains("Ada"));
        assert!(text.contains("Ada"));
    }

    #[test]
    fn test_order_status_templates_render() {
        let html = OrderStatusEmailHtml {
            order_number: "ORD-XYZ123",
            status: "shipped",
        }
        .render()
        .unwrap();
        assert!(html.contains("ORD-XYZ123"));
        assert!(html.contains("shipped"));

        let text = OrderStatusEmailText {
            order_number: "ORD-XYZ123",
            status: "shipped",
        }
        .render()
        .unwrap();
        assert!(text.contains("ORD-XYZ123"));
    }

    #[test]
    fn test_token_templates_render() {
        let html = VerificationEmailHtml { token: "tok123" }.render().unwrap();
        assert!(html.contains("tok123"));

        let reset = PasswordResetEmailText { token: "tok456" }.render().unwrap();
        assert!(reset.contains("tok456"));
    }
}
