//! Money conversions for payment-provider APIs.
//!
//! Prices are stored and computed as [`Decimal`] in the currency's standard
//! unit (e.g. dollars). Payment providers want the smallest currency unit
//! (e.g. cents), so checkout converts at the boundary via [`to_minor_units`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
}

impl CurrencyCode {
    /// Lower-case ISO code as payment APIs expect it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
            Self::Gbp => "gbp",
            Self::Cad => "cad",
        }
    }
}

/// Convert a standard-unit amount into minor currency units (cents).
///
/// Rounds half-up to the nearest cent. Returns `None` if the amount is
/// negative or too large for an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    if amount.is_sign_negative() {
        return None;
    }
    let cents = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents.to_i64()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_dollars() {
        assert_eq!(to_minor_units(Decimal::new(19, 0)), Some(1900));
    }

    #[test]
    fn test_cents_preserved() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)), Some(1999));
    }

    #[test]
    fn test_sub_cent_rounds() {
        assert_eq!(to_minor_units(Decimal::new(5, 3)), Some(1));
        assert_eq!(to_minor_units(Decimal::new(4, 3)), Some(0));
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(to_minor_units(Decimal::new(-1, 0)), None);
    }

    #[test]
    fn test_currency_code_str() {
        assert_eq!(CurrencyCode::Usd.as_str(), "usd");
        assert_eq!(CurrencyCode::default(), CurrencyCode::Usd);
    }
}
