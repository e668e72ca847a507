//! Coupon code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CouponCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CouponCodeError {
    /// The input string is empty.
    #[error("coupon code cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("coupon code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("coupon code cannot contain whitespace")]
    Whitespace,
}

/// A discount coupon code.
///
/// Codes are case-insensitive and stored upper-cased, so `save10` and
/// `SAVE10` refer to the same coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Maximum length of a coupon code.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `CouponCode` from a string, normalizing to upper case.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 32 characters,
    /// or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, CouponCodeError> {
        if s.is_empty() {
            return Err(CouponCodeError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(CouponCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(CouponCodeError::Whitespace);
        }

        Ok(Self(s.to_uppercase()))
    }

    /// Returns the normalized code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CouponCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CouponCode {
    type Err = CouponCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CouponCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CouponCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are already normalized
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CouponCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases() {
        let code = CouponCode::parse("save10").unwrap();
        assert_eq!(code.as_str(), "SAVE10");
    }

    #[test]
    fn test_parse_same_code_regardless_of_case() {
        assert_eq!(
            CouponCode::parse("Harvest2026").unwrap(),
            CouponCode::parse("HARVEST2026").unwrap()
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(CouponCode::parse(""), Err(CouponCodeError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "X".repeat(33);
        assert!(matches!(
            CouponCode::parse(&long),
            Err(CouponCodeError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_whitespace() {
        assert!(matches!(
            CouponCode::parse("SAVE 10"),
            Err(CouponCodeError::Whitespace)
        ));
    }

    #[test]
    fn test_serde_transparent() {
        let code = CouponCode::parse("SAVE10").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"SAVE10\"");
    }
}
