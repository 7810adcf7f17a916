//! Business universes a shop can belong to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The business type of a shop, which selects its attribute vocabulary.
///
/// Parsing is total: anything that is not one of the four known keys becomes
/// [`ShopType::Unrecognized`], which skips specialized validation and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShopType {
    Brewery,
    TeaShop,
    BeautyShop,
    HerbShop,
    Unrecognized,
}

impl ShopType {
    /// The recognized business types, in declaration order.
    pub const ALL: [Self; 4] = [Self::Brewery, Self::TeaShop, Self::BeautyShop, Self::HerbShop];

    /// Wire key (`"brewery"`, `"teaShop"`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Brewery => "brewery",
            Self::TeaShop => "teaShop",
            Self::BeautyShop => "beautyShop",
            Self::HerbShop => "herbShop",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Human label for dashboards.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Brewery => "Brasserie",
            Self::TeaShop => "Maison de thé",
            Self::BeautyShop => "Institut de beauté",
            Self::HerbShop => "Herboristerie",
            Self::Unrecognized => "Boutique",
        }
    }

    /// Whether this type has a specialized schema.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

impl fmt::Display for ShopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShopType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for ShopType {
    fn from(s: &str) -> Self {
        match s.trim() {
            "brewery" => Self::Brewery,
            "teaShop" => Self::TeaShop,
            "beautyShop" => Self::BeautyShop,
            "herbShop" => Self::HerbShop,
            _ => Self::Unrecognized,
        }
    }
}

impl From<String> for ShopType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ShopType> for String {
    fn from(shop_type: ShopType) -> Self {
        shop_type.as_str().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_round_trip() {
        for shop_type in ShopType::ALL {
            assert_eq!(ShopType::from(shop_type.as_str()), shop_type);
        }
    }

    #[test]
    fn test_unknown_key_falls_back() {
        assert_eq!(ShopType::from("bakery"), ShopType::Unrecognized);
        assert_eq!(ShopType::from("Brewery"), ShopType::Unrecognized);
        assert!(!ShopType::Unrecognized.is_recognized());
    }

    #[test]
    fn test_serde_uses_wire_keys() {
        let json = serde_json::to_string(&ShopType::TeaShop).unwrap();
        assert_eq!(json, "\"teaShop\"");

        let parsed: ShopType = serde_json::from_str("\"herbShop\"").unwrap();
        assert_eq!(parsed, ShopType::HerbShop);

        let unknown: ShopType = serde_json::from_str("\"florist\"").unwrap();
        assert_eq!(unknown, ShopType::Unrecognized);
    }
}
