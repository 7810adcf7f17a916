//! Beauty shop universe: cosmetics described by skin type and formulation.

use serde::Serialize;

use crate::attributes::AttributeMap;
use crate::filter::{Range, equals_ci};
use crate::schema::{AttributeSchema, FieldRule, STOCK_FIELD};
use crate::stats::{Mean, percentage};
use crate::types::ShopType;

pub static SCHEMA: AttributeSchema = AttributeSchema {
    shop_type: ShopType::BeautyShop,
    fields: &[
        FieldRule::required_text("type_peau"),
        FieldRule::required_text("ingredients_actifs"),
        FieldRule::stock(),
        FieldRule::optional_flag("certification_bio"),
        FieldRule::optional_number("contenance_ml", 0.0),
    ],
};

/// Typed view of a beauty payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeautyAttributes {
    pub type_peau: Option<String>,
    pub ingredients_actifs: Option<String>,
    pub certification_bio: Option<bool>,
    /// Volume in millilitres.
    pub contenance_ml: Option<f64>,
    pub stock: Option<f64>,
}

impl BeautyAttributes {
    #[must_use]
    pub fn from_map(map: &AttributeMap) -> Self {
        Self {
            type_peau: map.text_owned("type_peau"),
            ingredients_actifs: map.text_owned("ingredients_actifs"),
            certification_bio: map.flag("certification_bio"),
            contenance_ml: map.number("contenance_ml"),
            stock: map.number(STOCK_FIELD),
        }
    }

    /// Organic certification, absent reading as `false`.
    #[must_use]
    pub fn is_bio(&self) -> bool {
        self.certification_bio.unwrap_or(false)
    }
}

/// Beauty-only filter predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeautyPredicates {
    /// Case-insensitive equality on the skin type.
    pub type_peau: Option<String>,
    pub certification_bio: Option<bool>,
    pub contenance_ml: Range,
}

impl BeautyPredicates {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_peau.is_none()
            && self.certification_bio.is_none()
            && self.contenance_ml.is_unbounded()
    }

    #[must_use]
    pub fn matches(&self, attrs: &BeautyAttributes) -> bool {
        equals_ci(attrs.type_peau.as_deref(), self.type_peau.as_deref())
            && self
                .certification_bio
                .is_none_or(|wanted| attrs.is_bio() == wanted)
            && self.contenance_ml.contains(attrs.contenance_ml)
    }
}

/// Beauty shop rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeautyStats {
    /// Products carrying a `type_peau`.
    pub products: usize,
    pub bio_percentage: f64,
    pub average_volume_ml: f64,
}

#[derive(Debug, Default)]
pub(crate) struct BeautyFold {
    products: usize,
    bio: usize,
    volumes: Mean,
}

impl BeautyFold {
    pub(crate) fn add(&mut self, attrs: &BeautyAttributes) {
        if attrs.type_peau.is_none() {
            return;
        }
        self.products += 1;
        if attrs.is_bio() {
            self.bio += 1;
        }
        if let Some(volume) = attrs.contenance_ml {
            self.volumes.add(volume);
        }
    }

    pub(crate) fn finish(self) -> BeautyStats {
        BeautyStats {
            products: self.products,
            bio_percentage: percentage(self.bio, self.products),
            average_volume_ml: self.volumes.value(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::attributes::from_json;

    fn attrs(value: &serde_json::Value) -> BeautyAttributes {
        BeautyAttributes::from_map(&from_json(value).unwrap())
    }

    #[test]
    fn test_bio_flag_accepts_text_true() {
        let predicates = BeautyPredicates {
            certification_bio: Some(true),
            ..Default::default()
        };
        assert!(predicates.matches(&attrs(&json!({"certification_bio": true}))));
        assert!(predicates.matches(&attrs(&json!({"certification_bio": "true"}))));
        assert!(!predicates.matches(&attrs(&json!({"certification_bio": false}))));
        assert!(!predicates.matches(&attrs(&json!({}))));
    }

    #[test]
    fn test_not_bio_matches_absent_flag() {
        let predicates = BeautyPredicates {
            certification_bio: Some(false),
            ..Default::default()
        };
        assert!(predicates.matches(&attrs(&json!({}))));
        assert!(!predicates.matches(&attrs(&json!({"certification_bio": "true"}))));
    }

    #[test]
    fn test_skin_type_equality() {
        let predicates = BeautyPredicates {
            type_peau: Some("Sèche".to_string()),
            ..Default::default()
        };
        assert!(predicates.matches(&attrs(&json!({"type_peau": "sèche"}))));
        assert!(!predicates.matches(&attrs(&json!({"type_peau": "très sèche"}))));
    }

    #[test]
    fn test_fold_percentage_and_volume() {
        let mut fold = BeautyFold::default();
        fold.add(&attrs(&json!({"type_peau": "mixte", "certification_bio": true, "contenance_ml": 50})));
        fold.add(&attrs(&json!({"type_peau": "grasse", "contenance_ml": 100})));
        fold.add(&attrs(&json!({"type_peau": "sèche", "certification_bio": "true"})));
        fold.add(&attrs(&json!({"type_peau": "normale"})));
        fold.add(&attrs(&json!({"certification_bio": true})));

        let stats = fold.finish();
        assert_eq!(stats.products, 4);
        assert!((stats.bio_percentage - 50.0).abs() < f64::EPSILON);
        assert!((stats.average_volume_ml - 75.0).abs() < f64::EPSILON);
    }
}
