//! Authentication service.
//!
//! Password registration and login, signed bearer tokens for request
//! identity, and sha256-hashed one-time tokens for email verification and
//! password reset. The raw one-time token goes to the user by email; only
//! its digest is stored, so a database leak does not leak usable tokens.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use farmlink_core::{Email, UserId, UserRole};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long email-verification and password-reset tokens stay valid.
const ONE_TIME_TOKEN_TTL_MINUTES: i64 = 10;

/// How long access tokens stay valid.
const ACCESS_TOKEN_TTL_HOURS: i64 = 72;

/// Access-token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: i32,
    /// Role at issue time.
    pub role: UserRole,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// A freshly issued one-time token.
///
/// `token` is what the user receives; `digest` is what gets stored.
pub struct OneTimeToken {
    pub token: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
///
/// Handles registration, login, and the one-time-token flows.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email or phone is taken.
    pub async fn register(
        &self,
        fullname: &str,
        email: &str,
        phone: Option<&str>,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(fullname, &email, phone, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AuthError::UserAlreadyExists(msg),
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong, `AuthError::AccountBlocked` if the account is blocked.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }

        if user.is_blocked {
            return Err(AuthError::AccountBlocked);
        }

        Ok(user)
    }

    /// Issue and store an email-verification token for a user.
    ///
    /// Returns the raw token to email to the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user does not exist.
    pub async fn request_email_verification(&self, id: UserId) -> Result<String, AuthError> {
        let user = self.users.get_by_id(id).await?.ok_or(AuthError::UserNotFound)?;

        let issued = issue_one_time_token();
        self.users
            .set_verification_token(user.id, &issued.digest, issued.expires_at)
            .await?;

        Ok(issued.token)
    }

    /// Verify an email with a previously issued token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` if no account holds an unexpired
    /// token matching this digest.
    pub async fn confirm_email(&self, token: &str) -> Result<User, AuthError> {
        let digest = sha256_hex(token);
        self.users
            .consume_verification_token(&digest, Utc::now())
            .await?
            .ok_or(AuthError::TokenExpired)
    }

    /// Issue and store a password-reset token for the account with this
    /// email. Returns the account and the raw token to email to it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this email.
    pub async fn request_password_reset(&self, email: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let issued = issue_one_time_token();
        self.users
            .set_reset_token(user.id, &issued.digest, issued.expires_at)
            .await?;

        Ok((user, issued.token))
    }

    /// Reset a password with a previously issued token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password is too short,
    /// `AuthError::TokenExpired` if the token does not match or has expired.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AuthError> {
        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        let digest = sha256_hex(token);
        self.users
            .consume_reset_token(&digest, &password_hash, Utc::now())
            .await?
            .ok_or(AuthError::TokenExpired)
    }
}

/// Issue a signed access token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenInvalid` if signing fails.
pub fn issue_access_token(user: &User, secret: &SecretString) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.as_i32(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ACCESS_TOKEN_TTL_HOURS)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenInvalid)
}

/// Decode and validate an access token.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for expired tokens and
/// `AuthError::TokenInvalid` for anything else that fails validation.
pub fn decode_access_token(token: &str, secret: &SecretString) -> Result<Claims, AuthError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    })
}

/// Hash a password with argon2id and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` on hashing failure.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;

    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if the stored hash is unparseable.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Reject passwords below the minimum length.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Generate a random one-time token and its storable digest.
fn issue_one_time_token() -> OneTimeToken {
    let bytes: [u8; 32] = rand::random();
    let token = URL_SAFE_NO_PAD.encode(bytes);
    let digest = sha256_hex(&token);

    OneTimeToken {
        token,
        digest,
        expires_at: Utc::now() + Duration::minutes(ONE_TIME_TOKEN_TTL_MINUTES),
    }
}

/// Hex-encoded sha256 digest of a token string.
fn sha256_hex(token: &str) -> String {
    use std::fmt::Write as _;

    let digest = Sha256::digest(token.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: UserId::new(1),
            fullname: "Test Buyer".to_owned(),
            email: Email::parse("buyer@example.com").unwrap(),
            phone: None,
            role: UserRole::Buyer,
            is_blocked: false,
            is_email_verified: true,
            shipping_address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password(&hash, "correct horse battery").unwrap());
        assert!(!verify_password(&hash, "wrong password").unwrap());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_access_token_roundtrip() {
        let secret = SecretString::from("uP3$kQ9!xB2@vN7#mC4^zL8*wF1&tG6t");
        let user = test_user();

        let token = issue_access_token(&user, &secret).unwrap();
        let claims = decode_access_token(&token, &secret).unwrap();

        assert_eq!(claims.sub, 1);
        assert_eq!(claims.role, UserRole::Buyer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_access_token_rejects_wrong_secret() {
        let secret = SecretString::from("uP3$kQ9!xB2@vN7#mC4^zL8*wF1&tG6t");
        let other = SecretString::from("aD5$eH2!jM8@qR4#sV7^yX1*zB9&cN3c");
        let user = test_user();

        let token = issue_access_token(&user, &secret).unwrap();
        assert!(matches!(
            decode_access_token(&token, &other),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_one_time_token_digest_matches() {
        let issued = issue_one_time_token();
        assert_eq!(sha256_hex(&issued.token), issued.digest);
        assert_eq!(issued.digest.len(), 64);
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_one_time_tokens_are_unique() {
        assert_ne!(issue_one_time_token().token, issue_one_time_token().token);
    }

    #[test]
    fn test_sha256_hex_known_value() {
        // sha256("abc")
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
