//! Brewery universe: beers described by strength, bitterness and hops.

use serde::Serialize;

use crate::attributes::AttributeMap;
use crate::filter::{Range, contains_ci};
use crate::schema::{AttributeSchema, FieldRule, STOCK_FIELD};
use crate::stats::{Mean, Tally};
use crate::types::ShopType;

pub static SCHEMA: AttributeSchema = AttributeSchema {
    shop_type: ShopType::Brewery,
    fields: &[
        FieldRule::required_number("degre_alcool", 0.0),
        FieldRule::required_number("amertume_ibu", 0.0),
        FieldRule::stock(),
        FieldRule::optional_text("type_houblon"),
    ],
};

/// Typed view of a brewery payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreweryAttributes {
    /// Alcohol by volume, in degrees.
    pub degre_alcool: Option<f64>,
    /// Bitterness in IBU.
    pub amertume_ibu: Option<f64>,
    pub type_houblon: Option<String>,
    pub stock: Option<f64>,
}

impl BreweryAttributes {
    #[must_use]
    pub fn from_map(map: &AttributeMap) -> Self {
        Self {
            degre_alcool: map.number("degre_alcool"),
            amertume_ibu: map.number("amertume_ibu"),
            type_houblon: map.text_owned("type_houblon"),
            stock: map.number(STOCK_FIELD),
        }
    }
}

/// Brewery-only filter predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreweryPredicates {
    pub degre_alcool: Range,
    pub amertume_ibu: Range,
    /// Case-insensitive substring of the hop variety.
    pub type_houblon: Option<String>,
}

impl BreweryPredicates {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.degre_alcool.is_unbounded()
            && self.amertume_ibu.is_unbounded()
            && self.type_houblon.is_none()
    }

    #[must_use]
    pub fn matches(&self, attrs: &BreweryAttributes) -> bool {
        self.degre_alcool.contains(attrs.degre_alcool)
            && self.amertume_ibu.contains(attrs.amertume_ibu)
            && contains_ci(attrs.type_houblon.as_deref(), self.type_houblon.as_deref())
    }
}

/// Brewery rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreweryStats {
    /// Products carrying a parsable `degre_alcool`.
    pub products: usize,
    pub average_alcohol_degree: f64,
    pub most_common_hop: Option<String>,
    pub hop_varieties: usize,
}

#[derive(Debug, Default)]
pub(crate) struct BreweryFold {
    degrees: Mean,
    hops: Tally,
}

impl BreweryFold {
    pub(crate) fn add(&mut self, attrs: &BreweryAttributes) {
        let Some(degree) = attrs.degre_alcool else {
            return;
        };
        self.degrees.add(degree);
        if let Some(hop) = &attrs.type_houblon {
            self.hops.add(hop);
        }
    }

    pub(crate) fn finish(self) -> BreweryStats {
        BreweryStats {
            products: self.degrees.count(),
            average_alcohol_degree: self.degrees.value(),
            most_common_hop: self.hops.most_common().map(str::to_owned),
            hop_varieties: self.hops.distinct(),
        }
    }
}
