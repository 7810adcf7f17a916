//! Per-universe strategies behind a closed, exhaustive dispatch.
//!
//! Each recognized [`ShopType`] has a module providing its schema, a typed
//! attribute record, a predicate bundle, and a statistics fold. The enums
//! below select one of them from the shop type in a single match.

pub mod beauty;
pub mod brewery;
pub mod herb;
pub mod tea;

use serde::Serialize;

use crate::attributes::{AttributeMap, AttributePayload};
use crate::schema::STOCK_FIELD;
use crate::types::ShopType;

pub use beauty::{BeautyAttributes, BeautyPredicates, BeautyStats};
pub use brewery::{BreweryAttributes, BreweryPredicates, BreweryStats};
pub use herb::{HerbAttributes, HerbPredicates, HerbStats};
pub use tea::{TeaAttributes, TeaPredicates, TeaStats};

/// Attribute payload decoded according to the owning shop's type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAttributes {
    Brewery(BreweryAttributes),
    Tea(TeaAttributes),
    Beauty(BeautyAttributes),
    Herb(HerbAttributes),
    /// Unrecognized shop type: a bag of scalars.
    Opaque(AttributeMap),
}

impl ProductAttributes {
    #[must_use]
    pub fn decode(shop_type: ShopType, map: &AttributeMap) -> Self {
        match shop_type {
            ShopType::Brewery => Self::Brewery(BreweryAttributes::from_map(map)),
            ShopType::TeaShop => Self::Tea(TeaAttributes::from_map(map)),
            ShopType::BeautyShop => Self::Beauty(BeautyAttributes::from_map(map)),
            ShopType::HerbShop => Self::Herb(HerbAttributes::from_map(map)),
            ShopType::Unrecognized => Self::Opaque(map.clone()),
        }
    }

    #[must_use]
    pub fn stock(&self) -> Option<f64> {
        match self {
            Self::Brewery(attrs) => attrs.stock,
            Self::Tea(attrs) => attrs.stock,
            Self::Beauty(attrs) => attrs.stock,
            Self::Herb(attrs) => attrs.stock,
            Self::Opaque(map) => map.number(STOCK_FIELD),
        }
    }
}

/// A type-gated predicate bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedPredicates {
    Brewery(BreweryPredicates),
    Tea(TeaPredicates),
    Beauty(BeautyPredicates),
    Herb(HerbPredicates),
}

impl TypedPredicates {
    /// The shop type this bundle applies to.
    #[must_use]
    pub const fn shop_type(&self) -> ShopType {
        match self {
            Self::Brewery(_) => ShopType::Brewery,
            Self::Tea(_) => ShopType::TeaShop,
            Self::Beauty(_) => ShopType::BeautyShop,
            Self::Herb(_) => ShopType::HerbShop,
        }
    }

    /// Whether no predicate in the bundle is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Brewery(p) => p.is_empty(),
            Self::Tea(p) => p.is_empty(),
            Self::Beauty(p) => p.is_empty(),
            Self::Herb(p) => p.is_empty(),
        }
    }

    /// Evaluate the bundle against a product of the given shop type.
    ///
    /// A bundle declared for another shop type is inert and always matches.
    /// An active bundle never matches a malformed payload.
    #[must_use]
    pub fn matches(&self, shop_type: ShopType, payload: &AttributePayload) -> bool {
        if self.shop_type() != shop_type || self.is_empty() {
            return true;
        }
        if payload.is_malformed() {
            return false;
        }

        let map = payload.map();
        match self {
            Self::Brewery(p) => p.matches(&BreweryAttributes::from_map(map)),
            Self::Tea(p) => p.matches(&TeaAttributes::from_map(map)),
            Self::Beauty(p) => p.matches(&BeautyAttributes::from_map(map)),
            Self::Herb(p) => p.matches(&HerbAttributes::from_map(map)),
        }
    }
}

/// Type-specific part of a statistics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniverseStats {
    Brewery(BreweryStats),
    Tea(TeaStats),
    Beauty(BeautyStats),
    Herb(HerbStats),
}

/// Accumulator for [`UniverseStats`] during a single left-to-right fold.
#[derive(Debug)]
pub(crate) enum UniverseFold {
    Brewery(brewery::BreweryFold),
    Tea(tea::TeaFold),
    Beauty(beauty::BeautyFold),
    Herb(herb::HerbFold),
}

impl UniverseFold {
    pub(crate) fn for_type(shop_type: ShopType) -> Option<Self> {
        match shop_type {
            ShopType::Brewery => Some(Self::Brewery(brewery::BreweryFold::default())),
            ShopType::TeaShop => Some(Self::Tea(tea::TeaFold::default())),
            ShopType::BeautyShop => Some(Self::Beauty(beauty::BeautyFold::default())),
            ShopType::HerbShop => Some(Self::Herb(herb::HerbFold::default())),
            ShopType::Unrecognized => None,
        }
    }

    /// Fold in one decoded payload. Each universe skips products lacking
    /// its discriminant field.
    pub(crate) fn add(&mut self, map: &AttributeMap) {
        match self {
            Self::Brewery(fold) => fold.add(&BreweryAttributes::from_map(map)),
            Self::Tea(fold) => fold.add(&TeaAttributes::from_map(map)),
            Self::Beauty(fold) => fold.add(&BeautyAttributes::from_map(map)),
            Self::Herb(fold) => fold.add(&HerbAttributes::from_map(map)),
        }
    }

    pub(crate) fn finish(self) -> UniverseStats {
        match self {
            Self::Brewery(fold) => UniverseStats::Brewery(fold.finish()),
            Self::Tea(fold) => UniverseStats::Tea(fold.finish()),
            Self::Beauty(fold) => UniverseStats::Beauty(fold.finish()),
            Self::Herb(fold) => UniverseStats::Herb(fold.finish()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::filter::Range;

    fn alcohol_at_least(min: f64) -> TypedPredicates {
        TypedPredicates::Brewery(BreweryPredicates {
            degre_alcool: Range::at_least(min),
            ..Default::default()
        })
    }

    #[test]
    fn test_bundle_for_other_type_is_inert() {
        let predicates = alcohol_at_least(5.0);
        let payload = AttributePayload::read(Some(r#"{"origine_plantation":"Assam"}"#));
        assert!(predicates.matches(ShopType::TeaShop, &payload));
        assert!(!predicates.matches(ShopType::Brewery, &payload));
    }

    #[test]
    fn test_active_bundle_rejects_malformed_payload() {
        let malformed = AttributePayload::read(Some("{invalid"));
        assert!(!alcohol_at_least(0.0).matches(ShopType::Brewery, &malformed));

        let empty = TypedPredicates::Brewery(BreweryPredicates::default());
        assert!(empty.matches(ShopType::Brewery, &malformed));
    }

    #[test]
    fn test_decode_follows_shop_type() {
        let map = crate::attributes::decode(Some(r#"{"degre_alcool":"6.5","stock":3}"#));
        let attrs = ProductAttributes::decode(ShopType::Brewery, &map);
        assert_eq!(attrs.stock(), Some(3.0));
        let ProductAttributes::Brewery(brewery) = attrs else {
            panic!("expected brewery attributes");
        };
        assert_eq!(brewery.degre_alcool, Some(6.5));

        let opaque = ProductAttributes::decode(ShopType::Unrecognized, &map);
        assert_eq!(opaque, ProductAttributes::Opaque(map));
    }

    #[test]
    fn test_unrecognized_type_has_no_fold() {
        assert!(UniverseFold::for_type(ShopType::Unrecognized).is_none());
        for shop_type in ShopType::ALL {
            assert!(UniverseFold::for_type(shop_type).is_some());
        }
    }
}
