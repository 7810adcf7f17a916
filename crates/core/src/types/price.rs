//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are a structured column in the catalog, so unlike attribute
//! payloads they are always present and always validated on write.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

const MAX_SCALE: u32 = 2;

/// A strictly positive product price.
///
/// The catalog is single-currency, so only the amount is carried.
///
/// ## Examples
///
/// ```
/// use multiverse_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::new(Decimal::new(450, 2)).is_ok());
/// assert!(Price::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting amounts the `NUMERIC(10, 2)` price column
    /// cannot hold exactly.
    ///
    /// Trailing zeros are fine (`4.500`), a third significant decimal is not.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidFieldValue` for the `price` field if the
    /// amount is not strictly positive, has more than two decimal places, or
    /// exceeds [`Price::max_amount`].
    pub fn new(amount: Decimal) -> Result<Self, CatalogError> {
        if amount <= Decimal::ZERO {
            return Err(CatalogError::invalid("price", "must be greater than 0"));
        }
        if amount.normalize().scale() > MAX_SCALE {
            return Err(CatalogError::invalid(
                "price",
                "must have at most 2 decimal places",
            ));
        }
        let max = Self::max_amount();
        if amount > max {
            return Err(CatalogError::invalid(
                "price",
                format!("must not exceed {max}"),
            ));
        }
        Ok(Self(amount))
    }

    /// Largest storable amount: `99999999.99`.
    #[must_use]
    pub fn max_amount() -> Decimal {
        Decimal::new(9_999_999_999, MAX_SCALE)
    }

    /// The amount in the catalog currency.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CatalogError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert!(Price::new(Decimal::ZERO).is_err());
        assert!(Price::new(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_rejects_sub_cent_amounts() {
        let err = Price::new(Decimal::new(1, 3)).unwrap_err();
        assert_eq!(
            err,
            CatalogError::invalid("price", "must have at most 2 decimal places")
        );
        assert!(Price::new(Decimal::new(4999, 3)).is_err());

        // Trailing zeros do not count
        let price = Price::new(Decimal::new(4500, 3)).unwrap();
        assert_eq!(price.to_string(), "4.50");
    }

    #[test]
    fn test_rejects_amounts_beyond_the_column() {
        assert!(Price::new(Price::max_amount()).is_ok());
        assert!(Price::new(Decimal::new(100_000_000, 0)).is_err());

        let err = Price::new(Decimal::new(1_000_000_000_000, 0)).unwrap_err();
        assert_eq!(err.field(), Some("price"));
    }

    #[test]
    fn test_display_two_decimals() {
        let price = Price::new(Decimal::new(45, 1)).unwrap();
        assert_eq!(price.to_string(), "4.50");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Price, _> = serde_json::from_str("\"12.90\"");
        assert_eq!(ok.unwrap().amount(), Decimal::new(1290, 2));

        let err: Result<Price, _> = serde_json::from_str("\"-3\"");
        assert!(err.is_err());
    }
}
