//! Herb shop universe: remedies described by active principles and certification.

use serde::Serialize;

use crate::attributes::AttributeMap;
use crate::filter::{contains_ci, equals_ci};
use crate::schema::{AttributeSchema, FieldRule, STOCK_FIELD};
use crate::stats::Tally;
use crate::types::ShopType;

/// Certification marker of organic products.
pub const ORGANIC_MARKER: &str = "biologique";

pub static SCHEMA: AttributeSchema = AttributeSchema {
    shop_type: ShopType::HerbShop,
    fields: &[
        FieldRule::required_text("principes_actifs"),
        FieldRule::required_text("usage_traditionnel"),
        FieldRule::stock(),
        FieldRule::optional_text("forme_galenique"),
        FieldRule::optional_text("certification"),
    ],
};

/// Typed view of a herb payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HerbAttributes {
    pub principes_actifs: Option<String>,
    pub usage_traditionnel: Option<String>,
    /// Galenic form (tisane, gélules, teinture mère...).
    pub forme_galenique: Option<String>,
    pub certification: Option<String>,
    pub stock: Option<f64>,
}

impl HerbAttributes {
    #[must_use]
    pub fn from_map(map: &AttributeMap) -> Self {
        Self {
            principes_actifs: map.text_owned("principes_actifs"),
            usage_traditionnel: map.text_owned("usage_traditionnel"),
            forme_galenique: map.text_owned("forme_galenique"),
            certification: map.text_owned("certification"),
            stock: map.number(STOCK_FIELD),
        }
    }

    #[must_use]
    pub fn is_organic(&self) -> bool {
        self.certification
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(ORGANIC_MARKER))
    }
}

/// Herb-only filter predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HerbPredicates {
    /// Case-insensitive equality on the galenic form.
    pub forme_galenique: Option<String>,
    /// Case-insensitive substring of the certification.
    pub certification: Option<String>,
    /// Case-insensitive substring of the traditional use.
    pub usage_traditionnel: Option<String>,
}

impl HerbPredicates {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.forme_galenique.is_none()
            && self.certification.is_none()
            && self.usage_traditionnel.is_none()
    }

    #[must_use]
    pub fn matches(&self, attrs: &HerbAttributes) -> bool {
        equals_ci(
            attrs.forme_galenique.as_deref(),
            self.forme_galenique.as_deref(),
        ) && contains_ci(attrs.certification.as_deref(), self.certification.as_deref())
            && contains_ci(
                attrs.usage_traditionnel.as_deref(),
                self.usage_traditionnel.as_deref(),
            )
    }
}

/// Herb shop rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HerbStats {
    /// Products carrying `principes_actifs`.
    pub products: usize,
    pub top_certification: Option<String>,
    pub organic_products: usize,
    pub certification_count: usize,
}

#[derive(Debug, Default)]
pub(crate) struct HerbFold {
    products: usize,
    organic: usize,
    certifications: Tally,
}

impl HerbFold {
    pub(crate) fn add(&mut self, attrs: &HerbAttributes) {
        if attrs.principes_actifs.is_none() {
            return;
        }
        self.products += 1;
        if let Some(certification) = &attrs.certification {
            self.certifications.add(certification);
        }
        if attrs.is_organic() {
            self.organic += 1;
        }
    }

    pub(crate) fn finish(self) -> HerbStats {
        HerbStats {
            products: self.products,
            top_certification: self.certifications.most_common().map(str::to_owned),
            organic_products: self.organic,
            certification_count: self.certifications.distinct(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::attributes::from_json;

    fn attrs(value: &serde_json::Value) -> HerbAttributes {
        HerbAttributes::from_map(&from_json(value).unwrap())
    }

    #[test]
    fn test_organic_marker() {
        assert!(attrs(&json!({"certification": "Biologique AB"})).is_organic());
        assert!(!attrs(&json!({"certification": "Non certifié"})).is_organic());
        assert!(!attrs(&json!({})).is_organic());
    }

    #[test]
    fn test_galenic_form_equality_and_use_substring() {
        let predicates = HerbPredicates {
            forme_galenique: Some("tisane".to_string()),
            usage_traditionnel: Some("sommeil".to_string()),
            ..Default::default()
        };
        assert!(predicates.matches(&attrs(&json!({
            "forme_galenique": "Tisane",
            "usage_traditionnel": "Favorise le sommeil"
        }))));
        assert!(!predicates.matches(&attrs(&json!({
            "forme_galenique": "Gélules",
            "usage_traditionnel": "Favorise le sommeil"
        }))));
    }

    #[test]
    fn test_fold_counts_organic_certifications() {
        let mut fold = HerbFold::default();
        fold.add(&attrs(&json!({"principes_actifs": "valériane", "certification": "Biologique AB"})));
        fold.add(&attrs(&json!({"principes_actifs": "menthe", "certification": "Non certifié"})));
        fold.add(&attrs(&json!({"principes_actifs": "camomille", "certification": "Biologique AB"})));
        fold.add(&attrs(&json!({"certification": "Biologique AB"})));

        let stats = fold.finish();
        assert_eq!(stats.products, 3);
        assert_eq!(stats.organic_products, 2);
        assert_eq!(stats.top_certification.as_deref(), Some("Biologique AB"));
        assert_eq!(stats.certification_count, 2);
    }
}
