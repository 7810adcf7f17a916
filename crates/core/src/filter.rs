//! Predicate filter engine.
//!
//! Filtering runs in two stages. The [`StructuredFilter`] covers typed
//! columns and is pushed down to the store. The [`ProductFilter`] then runs
//! in-process over decoded attribute payloads. Every predicate is an
//! independent conjunction, so the stages can run in either order.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::catalog::ProductRecord;
use crate::schema::STOCK_FIELD;
use crate::types::{ShopType, StockStatus};
use crate::universes::{
    BeautyPredicates, BreweryPredicates, HerbPredicates, TeaPredicates, TypedPredicates,
};

/// Inclusive numeric range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    #[must_use]
    pub const fn between(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn at_least(min: f64) -> Self {
        Self::between(Some(min), None)
    }

    #[must_use]
    pub const fn at_most(max: f64) -> Self {
        Self::between(None, Some(max))
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `value` lies within the range.
    ///
    /// An unbounded range matches everything; a bounded one never matches an
    /// absent value.
    #[must_use]
    pub fn contains(&self, value: Option<f64>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Case-insensitive containment. An absent needle is inactive; an absent
/// haystack fails an active needle.
pub(crate) fn contains_ci(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match (haystack, needle) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(haystack), Some(needle)) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

/// Case-insensitive equality with the same absence rules as [`contains_ci`].
pub(crate) fn equals_ci(value: Option<&str>, expected: Option<&str>) -> bool {
    match (value, expected) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(value), Some(expected)) => value.trim().to_lowercase() == expected.to_lowercase(),
    }
}

/// Predicates on typed columns, pushed down to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredFilter {
    /// Substring of the category name.
    pub category: Option<String>,
    /// Substring of the name or the description.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl StructuredFilter {
    /// In-process evaluation, for stores that cannot push the filter down.
    #[must_use]
    pub fn matches(&self, record: &ProductRecord) -> bool {
        let search = self.search.as_deref();
        let price = record.price.amount();

        contains_ci(Some(&record.category_name), self.category.as_deref())
            && (contains_ci(Some(&record.name), search)
                || contains_ci(record.description.as_deref(), search))
            && self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
    }
}

/// In-process predicates over decoded attribute payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub stock_status: Option<StockStatus>,
    pub typed: Option<TypedPredicates>,
}

impl ProductFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stock_status.is_none() && self.typed.as_ref().is_none_or(TypedPredicates::is_empty)
    }

    /// Evaluate against a product of a shop of type `shop_type`.
    ///
    /// A stock-status predicate never matches a malformed payload, although
    /// such products list as in stock when unfiltered.
    #[must_use]
    pub fn matches(&self, shop_type: ShopType, record: &ProductRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        let payload = record.payload();

        if let Some(wanted) = self.stock_status {
            if payload.is_malformed() {
                return false;
            }
            if StockStatus::classify(payload.map().number(STOCK_FIELD)) != wanted {
                return false;
            }
        }

        self.typed
            .as_ref()
            .is_none_or(|typed| typed.matches(shop_type, &payload))
    }

    /// Narrow `records` to the matching subset, preserving order.
    #[must_use]
    pub fn apply(&self, shop_type: ShopType, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
        if self.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|record| self.matches(shop_type, record))
            .collect()
    }
}

/// Flat product query as received from the front end.
///
/// Blank values are inactive. Type-gated keys only take effect for shops of
/// the matching type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    #[serde(deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(rename = "minPrice", deserialize_with = "blank_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(rename = "maxPrice", deserialize_with = "blank_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(rename = "stockStatus", deserialize_with = "blank_as_none")]
    pub stock_status: Option<StockStatus>,

    // brewery
    #[serde(deserialize_with = "finite_or_none")]
    pub degre_alcool_min: Option<f64>,
    #[serde(deserialize_with = "finite_or_none")]
    pub degre_alcool_max: Option<f64>,
    #[serde(deserialize_with = "finite_or_none")]
    pub amertume_ibu_min: Option<f64>,
    #[serde(deserialize_with = "finite_or_none")]
    pub amertume_ibu_max: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub type_houblon: Option<String>,

    // teaShop
    #[serde(deserialize_with = "blank_as_none")]
    pub origine_plantation: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub grade_qualite: Option<String>,

    // beautyShop
    #[serde(deserialize_with = "blank_as_none")]
    pub type_peau: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub certification_bio: Option<bool>,
    #[serde(deserialize_with = "finite_or_none")]
    pub contenance_ml_min: Option<f64>,
    #[serde(deserialize_with = "finite_or_none")]
    pub contenance_ml_max: Option<f64>,

    // herbShop
    #[serde(deserialize_with = "blank_as_none")]
    pub forme_galenique: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub certification: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub usage_traditionnel: Option<String>,
}

impl FilterQuery {
    /// The type-gated bundle for `shop_type`, if any of its keys is set.
    #[must_use]
    pub fn typed_predicates(&self, shop_type: ShopType) -> Option<TypedPredicates> {
        let predicates = match shop_type {
            ShopType::Brewery => TypedPredicates::Brewery(BreweryPredicates {
                degre_alcool: Range::between(self.degre_alcool_min, self.degre_alcool_max),
                amertume_ibu: Range::between(self.amertume_ibu_min, self.amertume_ibu_max),
                type_houblon: self.type_houblon.clone(),
            }),
            ShopType::TeaShop => TypedPredicates::Tea(TeaPredicates {
                origine_plantation: self.origine_plantation.clone(),
                grade_qualite: self.grade_qualite.clone(),
            }),
            ShopType::BeautyShop => TypedPredicates::Beauty(BeautyPredicates {
                type_peau: self.type_peau.clone(),
                certification_bio: self.certification_bio,
                contenance_ml: Range::between(self.contenance_ml_min, self.contenance_ml_max),
            }),
            ShopType::HerbShop => TypedPredicates::Herb(HerbPredicates {
                forme_galenique: self.forme_galenique.clone(),
                certification: self.certification.clone(),
                usage_traditionnel: self.usage_traditionnel.clone(),
            }),
            ShopType::Unrecognized => return None,
        };
        (!predicates.is_empty()).then_some(predicates)
    }

    /// Split into the pushed-down and in-process stages.
    #[must_use]
    pub fn into_parts(self, shop_type: ShopType) -> (StructuredFilter, ProductFilter) {
        let product = ProductFilter {
            stock_status: self.stock_status,
            typed: self.typed_predicates(shop_type),
        };
        let structured = StructuredFilter {
            category: self.category,
            search: self.search,
            min_price: self.min_price,
            max_price: self.max_price,
        };
        (structured, product)
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// [`blank_as_none`] for range bounds: `NaN` and infinities never compare,
/// so they would silently empty the listing.
fn finite_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none::<D, f64>(deserializer)? {
        Some(bound) if !bound.is_finite() => Err(serde::de::Error::custom(format!(
            "range bound must be a finite number, got {bound}"
        ))),
        bound => Ok(bound),
    }
}
