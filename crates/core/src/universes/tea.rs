//! Tea shop universe: teas described by plantation origin and leaf grade.

use serde::Serialize;

use crate::attributes::AttributeMap;
use crate::filter::contains_ci;
use crate::schema::{AttributeSchema, FieldRule, STOCK_FIELD};
use crate::stats::Tally;
use crate::types::ShopType;

/// Grade marker of premium whole-leaf teas.
pub const PREMIUM_GRADE_MARKER: &str = "FTGFOP";

pub static SCHEMA: AttributeSchema = AttributeSchema {
    shop_type: ShopType::TeaShop,
    fields: &[
        FieldRule::required_text("origine_plantation"),
        FieldRule::required_text("grade_qualite"),
        FieldRule::stock(),
    ],
};

/// Typed view of a tea payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeaAttributes {
    pub origine_plantation: Option<String>,
    pub grade_qualite: Option<String>,
    pub stock: Option<f64>,
}

impl TeaAttributes {
    #[must_use]
    pub fn from_map(map: &AttributeMap) -> Self {
        Self {
            origine_plantation: map.text_owned("origine_plantation"),
            grade_qualite: map.text_owned("grade_qualite"),
            stock: map.number(STOCK_FIELD),
        }
    }

    /// Whether the grade carries the premium marker.
    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.grade_qualite
            .as_deref()
            .is_some_and(|grade| grade.to_uppercase().contains(PREMIUM_GRADE_MARKER))
    }
}

/// Tea-only filter predicates, both case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeaPredicates {
    pub origine_plantation: Option<String>,
    pub grade_qualite: Option<String>,
}

impl TeaPredicates {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.origine_plantation.is_none() && self.grade_qualite.is_none()
    }

    #[must_use]
    pub fn matches(&self, attrs: &TeaAttributes) -> bool {
        contains_ci(
            attrs.origine_plantation.as_deref(),
            self.origine_plantation.as_deref(),
        ) && contains_ci(attrs.grade_qualite.as_deref(), self.grade_qualite.as_deref())
    }
}

/// Tea shop rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeaStats {
    /// Products carrying an `origine_plantation`.
    pub products: usize,
    pub top_origin: Option<String>,
    pub premium_count: usize,
    pub origin_count: usize,
}

#[derive(Debug, Default)]
pub(crate) struct TeaFold {
    products: usize,
    premium: usize,
    origins: Tally,
}

impl TeaFold {
    pub(crate) fn add(&mut self, attrs: &TeaAttributes) {
        let Some(origin) = &attrs.origine_plantation else {
            return;
        };
        self.products += 1;
        self.origins.add(origin);
        if attrs.is_premium() {
            self.premium += 1;
        }
    }

    pub(crate) fn finish(self) -> TeaStats {
        TeaStats {
            products: self.products,
            top_origin: self.origins.most_common().map(str::to_owned),
            premium_count: self.premium,
            origin_count: self.origins.distinct(),
        }
    }
}
