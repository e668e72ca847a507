//! User repository for database operations.
//!
//! Password hashes and one-time token digests never leave this module;
//! callers get the [`User`] domain type.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use farmlink_core::{Email, UserId, UserRole};

use super::{RepositoryError, conflict_on_unique};
use crate::models::user::{ShippingAddress, User};

/// Columns shared by every user query that returns a [`User`].
const USER_COLUMNS: &str = "id, fullname, email, phone, role, is_blocked, is_email_verified, \
                            shipping_address, created_at, updated_at";

/// Database row backing a [`User`].
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    fullname: String,
    email: String,
    phone: Option<String>,
    role: UserRole,
    is_blocked: bool,
    is_email_verified: bool,
    shipping_address: Option<Json<ShippingAddress>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            fullname: self.fullname,
            email,
            phone: self.phone,
            role: self.role,
            is_blocked: self.is_blocked,
            is_email_verified: self.is_email_verified,
            shipping_address: self.shipping_address.map(|Json(addr)| addr),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn describe_user_conflict(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_phone_key") => "phone number already exists".to_owned(),
        _ => "email already exists".to_owned(),
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone is taken.
    pub async fn create(
        &self,
        fullname: &str,
        email: &Email,
        phone: Option<&str>,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (fullname, email, phone, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(fullname)
            .bind(email)
            .bind(phone)
            .bind(password_hash)
            .bind(role)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, describe_user_conflict))?;

        row.into_user()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct AuthRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, AuthRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some((r.user.into_user()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    /// Update profile fields; `None` keeps the current value.
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a new email or phone is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        fullname: Option<&str>,
        email: Option<&Email>,
        phone: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "UPDATE users
             SET fullname = COALESCE($2, fullname),
                 email = COALESCE($3, email),
                 phone = COALESCE($4, phone),
                 password_hash = COALESCE($5, password_hash),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(fullname)
            .bind(email)
            .bind(phone)
            .bind(password_hash)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, describe_user_conflict))?;

        row.map(UserRow::into_user).transpose()
    }

    /// Replace the shipping address on file.
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_shipping_address(
        &self,
        id: UserId,
        address: &ShippingAddress,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "UPDATE users SET shipping_address = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(Json(address))
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Block or unblock an account.
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_blocked(
        &self,
        id: UserId,
        blocked: bool,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "UPDATE users SET is_blocked = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(blocked)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Delete a user. Returns `false` if the user did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Store an email-verification token digest with its expiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_verification_token(
        &self,
        id: UserId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE users
             SET verification_token_digest = $2, verification_token_expires_at = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(digest)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Mark the matching account verified and clear the token.
    ///
    /// Returns `None` if no account holds an unexpired token with this
    /// digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume_verification_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "UPDATE users
             SET is_email_verified = TRUE,
                 verification_token_digest = NULL,
                 verification_token_expires_at = NULL,
                 updated_at = now()
             WHERE verification_token_digest = $1 AND verification_token_expires_at > $2
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(digest)
            .bind(now)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Store a password-reset token digest with its expiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_reset_token(
        &self,
        id: UserId,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE users
             SET reset_token_digest = $2, reset_token_expires_at = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(digest)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Replace the password on the account holding an unexpired reset token
    /// with this digest, clearing the token.
    ///
    /// Returns `None` if the token does not match or has expired.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume_reset_token(
        &self,
        digest: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "UPDATE users
             SET password_hash = $2,
                 reset_token_digest = NULL,
                 reset_token_expires_at = NULL,
                 updated_at = now()
             WHERE reset_token_digest = $1 AND reset_token_expires_at > $3
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(digest)
            .bind(new_password_hash)
            .bind(now)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}
