//! Authentication extractors.
//!
//! Handlers take [`RequireAuth`] (any logged-in user) or [`RequireAdmin`]
//! (admin role) as arguments; the bearer token is decoded from the
//! `Authorization` header against the configured signing secret.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn profile(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
//!     format!("user {}", auth.id)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use farmlink_core::{UserId, UserRole};

use crate::error::AppError;
use crate::services::auth::decode_access_token;
use crate::state::AppState;

/// The authenticated caller, decoded from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// User ID.
    pub id: UserId,
    /// Role at token-issue time.
    pub role: UserRole,
}

impl AuthUser {
    /// Authorization predicate: may this caller mutate a resource owned by
    /// `owner`? Admins may mutate anything; everyone else only their own.
    #[must_use]
    pub fn can_modify(&self, owner: UserId) -> bool {
        self.role.is_admin() || self.id == owner
    }
}

/// Extractor that requires a valid bearer token.
pub struct RequireAuth(pub AuthUser);

/// Extractor that requires a valid bearer token with the admin role.
pub struct RequireAdmin(pub AuthUser);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_owned()))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid authorization header".to_owned()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected bearer token".to_owned()))
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthUser, AppError> {
    let token = bearer_token(parts)?;
    let claims = decode_access_token(token, &state.config().jwt_secret)?;

    Ok(AuthUser {
        id: UserId::new(claims.sub),
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = authenticate(parts, state)?;
        if !auth.role.is_admin() {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }
        Ok(Self(auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_can_modify_anything() {
        let admin = AuthUser {
            id: UserId::new(1),
            role: UserRole::Admin,
        };
        assert!(admin.can_modify(UserId::new(99)));
    }

    #[test]
    fn test_owner_can_modify_own() {
        let vendor = AuthUser {
            id: UserId::new(5),
            role: UserRole::Vendor,
        };
        assert!(vendor.can_modify(UserId::new(5)));
        assert!(!vendor.can_modify(UserId::new(6)));
    }
}
