//! Shop-type schema registry.
//!
//! Schemas are compiled in: each recognized universe declares its field rules
//! in its own module and this registry maps a [`ShopType`] to them. There is
//! no runtime schema storage.

use serde::Serialize;

use crate::types::ShopType;
use crate::universes::{beauty, brewery, herb, tea};

/// Name of the stock field shared by every recognized schema.
pub const STOCK_FIELD: &str = "stock";

/// Value constraint of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    /// A number, optionally bounded below (inclusive).
    Number { min: Option<f64> },
    /// Non-blank text.
    Text,
    /// A boolean.
    Flag,
}

/// One field of an attribute schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    /// A mandatory number with an inclusive lower bound.
    #[must_use]
    pub const fn required_number(name: &'static str, min: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Number { min: Some(min) },
            required: true,
        }
    }

    /// An optional number with an inclusive lower bound.
    #[must_use]
    pub const fn optional_number(name: &'static str, min: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Number { min: Some(min) },
            required: false,
        }
    }

    #[must_use]
    pub const fn required_text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional_text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: false,
        }
    }

    #[must_use]
    pub const fn optional_flag(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Flag,
            required: false,
        }
    }

    /// Non-negative stock, mandatory in every recognized schema.
    #[must_use]
    pub const fn stock() -> Self {
        Self::required_number(STOCK_FIELD, 0.0)
    }
}

/// The attribute vocabulary of one business type.
///
/// Required fields are declared first; their order is the order in which the
/// validator reports the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSchema {
    pub shop_type: ShopType,
    pub fields: &'static [FieldRule],
}

impl AttributeSchema {
    /// Look up the rule for a field.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&'static FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }

    /// Mandatory field names in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|rule| rule.required)
            .map(|rule| rule.name)
    }

    /// Whether the schema mandates a non-negative stock.
    #[must_use]
    pub fn requires_stock(&self) -> bool {
        self.rule(STOCK_FIELD).is_some_and(|rule| rule.required)
    }

    /// The field whose presence admits a product into type-specific statistics:
    /// the first mandatory field.
    #[must_use]
    pub fn discriminant(&self) -> Option<&'static str> {
        self.required_fields().next()
    }
}

/// Look up the schema of a business type.
///
/// Returns `None` for [`ShopType::Unrecognized`], meaning "no specialized
/// validation".
#[must_use]
pub fn schema_for(shop_type: ShopType) -> Option<&'static AttributeSchema> {
    match shop_type {
        ShopType::Brewery => Some(&brewery::SCHEMA),
        ShopType::TeaShop => Some(&tea::SCHEMA),
        ShopType::BeautyShop => Some(&beauty::SCHEMA),
        ShopType::HerbShop => Some(&herb::SCHEMA),
        ShopType::Unrecognized => None,
    }
}
