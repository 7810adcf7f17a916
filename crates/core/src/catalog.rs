//! Catalog records and the product write path.
//!
//! Records arrive from the store by value. [`NewProduct`] and
//! [`ProductPatch`] turn request bodies into a [`ValidatedProduct`] ready for
//! persistence, checking scalar fields, the category relation, and the
//! attribute payload in that order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::{self, AttributeMap, AttributePayload};
use crate::error::CatalogError;
use crate::schema::STOCK_FIELD;
use crate::types::{CategoryId, Price, ProductId, ShopId, ShopType, StockStatus};
use crate::validate::{ValidationMode, validate};

/// A storefront belonging to one business universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub shop_type: ShopType,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub shop_id: ShopId,
    pub name: String,
}

/// Shop to be inserted by a seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    pub name: String,
    pub shop_type: ShopType,
    #[serde(default)]
    pub description: Option<String>,
}

/// Category to be inserted by a seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub shop_id: ShopId,
    pub name: String,
}

/// A product row as stored, with its category name joined in.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    /// Raw attribute payload, decoded on read.
    pub attributes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Lenient read of the stored payload.
    #[must_use]
    pub fn payload(&self) -> AttributePayload {
        AttributePayload::read(self.attributes.as_deref())
    }

    /// Stock status derived from the payload; malformed payloads read as in stock.
    #[must_use]
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.payload().map().number(STOCK_FIELD))
    }
}

/// Presentation shape of a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub attributes: AttributeMap,
    pub stock_status: StockStatus,
    pub created_at: DateTime<Utc>,
}

impl ProductView {
    #[must_use]
    pub fn from_record(record: ProductRecord) -> Self {
        let attributes = record.payload().into_map();
        let stock_status = StockStatus::classify(attributes.number(STOCK_FIELD));
        Self {
            id: record.id,
            shop_id: record.shop_id,
            category_id: record.category_id,
            category_name: record.category_name,
            name: record.name,
            description: record.description,
            price: record.price,
            image_url: record.image_url,
            attributes,
            stock_status,
            created_at: record.created_at,
        }
    }
}

impl From<ProductRecord> for ProductView {
    fn from(record: ProductRecord) -> Self {
        Self::from_record(record)
    }
}

/// Filtered listing of one shop's products.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub products: Vec<ProductView>,
    pub total: usize,
    pub shop_type: ShopType,
    pub shop_name: String,
}

impl ProductListing {
    #[must_use]
    pub fn new(shop: &Shop, records: Vec<ProductRecord>) -> Self {
        let products: Vec<ProductView> = records.into_iter().map(ProductView::from).collect();
        Self {
            total: products.len(),
            products,
            shop_type: shop.shop_type,
            shop_name: shop.name.clone(),
        }
    }
}

/// A product that passed the write path, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    pub shop_id: ShopId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    /// Encoded attribute payload.
    pub attributes: Option<String>,
}

/// Request body for creating a product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: CategoryId,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub attributes: Value,
}

impl NewProduct {
    /// Run the create path for a product of `shop`.
    ///
    /// `category` is the looked-up category for `category_id`, if any.
    ///
    /// # Errors
    ///
    /// `InvalidFieldValue` for a blank name or non-positive price,
    /// `UnknownRelation` when the category is missing or belongs to another
    /// shop, then any attribute validation error.
    pub fn validate(
        &self,
        shop: &Shop,
        category: Option<&Category>,
    ) -> Result<ValidatedProduct, CatalogError> {
        let name = required_name(&self.name)?;
        let price = Price::new(self.price)?;
        check_category(shop, self.category_id, category)?;

        let candidate = attributes::from_json(&self.attributes)?;
        let normalized = validate(shop.shop_type, &candidate, ValidationMode::Create)?;

        Ok(ValidatedProduct {
            shop_id: shop.id,
            category_id: self.category_id,
            name,
            description: normalize_optional(self.description.as_deref()),
            price,
            image_url: normalize_optional(self.image_url.as_deref()),
            attributes: Some(attributes::encode(&normalized)),
        })
    }
}

/// Request body for a partial product update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<String>,
    pub attributes: Option<Value>,
}

impl ProductPatch {
    /// Run the update path over `existing`.
    ///
    /// Only supplied fields are checked. Supplied attributes are validated in
    /// update mode and merged over the stored payload; a malformed stored
    /// payload is replaced by the patch. The category relation is re-checked
    /// only when the category changes.
    ///
    /// # Errors
    ///
    /// As [`NewProduct::validate`], restricted to supplied fields.
    pub fn apply(
        &self,
        existing: &ProductRecord,
        shop: &Shop,
        category: Option<&Category>,
    ) -> Result<ValidatedProduct, CatalogError> {
        let name = match &self.name {
            Some(name) => required_name(name)?,
            None => existing.name.clone(),
        };
        let price = match self.price {
            Some(amount) => Price::new(amount)?,
            None => existing.price,
        };

        let category_id = match self.category_id {
            Some(id) if id != existing.category_id => {
                check_category(shop, id, category)?;
                id
            }
            _ => existing.category_id,
        };

        let attributes = match &self.attributes {
            Some(value) => {
                let candidate = attributes::from_json(value)?;
                let normalized = validate(shop.shop_type, &candidate, ValidationMode::Update)?;
                let stored = existing.payload().into_map();
                Some(attributes::encode(&stored.merged_with(&normalized)))
            }
            None => existing.attributes.clone(),
        };

        Ok(ValidatedProduct {
            shop_id: existing.shop_id,
            category_id,
            name,
            description: match &self.description {
                Some(text) => normalize_optional(Some(text)),
                None => existing.description.clone(),
            },
            price,
            image_url: match &self.image_url {
                Some(url) => normalize_optional(Some(url)),
                None => existing.image_url.clone(),
            },
            attributes,
        })
    }
}

fn required_name(name: &str) -> Result<String, CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::invalid("name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn check_category(
    shop: &Shop,
    category_id: CategoryId,
    category: Option<&Category>,
) -> Result<(), CatalogError> {
    match category {
        Some(category) if category.id == category_id && category.shop_id == shop.id => Ok(()),
        _ => Err(CatalogError::UnknownRelation {
            entity: "category",
            id: category_id.as_i32(),
        }),
    }
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn brewery() -> Shop {
        Shop {
            id: ShopId::new(1),
            name: "Brasserie du Multivers".to_string(),
            shop_type: ShopType::Brewery,
            description: None,
        }
    }

    fn blondes() -> Category {
        Category {
            id: CategoryId::new(10),
            shop_id: ShopId::new(1),
            name: "Blondes".to_string(),
        }
    }

    fn new_beer(attributes: Value) -> NewProduct {
        NewProduct {
            name: "  Cascade Blonde ".to_string(),
            description: Some(String::new()),
            price: Decimal::new(450, 2),
            category_id: CategoryId::new(10),
            image_url: None,
            attributes,
        }
    }

    fn stored(attributes: Option<&str>) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(7),
            shop_id: ShopId::new(1),
            category_id: CategoryId::new(10),
            category_name: "Blondes".to_string(),
            name: "Cascade Blonde".to_string(),
            description: None,
            price: Price::new(Decimal::new(450, 2)).unwrap(),
            image_url: None,
            attributes: attributes.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_normalizes_and_encodes() {
        let product = new_beer(json!({
            "degre_alcool": 5.2,
            "amertume_ibu": 25,
            "type_houblon": "Cascade",
            "stock": 50
        }));
        let validated = product.validate(&brewery(), Some(&blondes())).unwrap();

        assert_eq!(validated.name, "Cascade Blonde");
        assert_eq!(validated.description, None);
        let map = attributes::decode(validated.attributes.as_deref());
        assert_eq!(map.number("amertume_ibu"), Some(25.0));
        assert_eq!(StockStatus::classify(map.number("stock")), StockStatus::InStock);
    }

    #[test]
    fn test_create_checks_relation_before_attributes() {
        let mut product = new_beer(json!({}));
        product.category_id = CategoryId::new(99);
        let err = product.validate(&brewery(), None).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownRelation {
                entity: "category",
                id: 99
            }
        );

        // A category of another shop is not a valid relation either
        let foreign = Category {
            shop_id: ShopId::new(2),
            ..blondes()
        };
        let err = new_beer(json!({})).validate(&brewery(), Some(&foreign)).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRelation { .. }));
    }

    #[test]
    fn test_create_rejects_bad_scalars() {
        let mut product = new_beer(json!({}));
        product.price = Decimal::ZERO;
        let err = product.validate(&brewery(), Some(&blondes())).unwrap_err();
        assert_eq!(err.field(), Some("price"));

        let mut product = new_beer(json!({}));
        product.name = "   ".to_string();
        let err = product.validate(&brewery(), Some(&blondes())).unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_create_without_attributes_reports_first_field() {
        let err = new_beer(Value::Null)
            .validate(&brewery(), Some(&blondes()))
            .unwrap_err();
        assert_eq!(err.field(), Some("degre_alcool"));
    }

    #[test]
    fn test_patch_merges_supplied_attributes() {
        let existing = stored(Some(
            r#"{"degre_alcool":5.2,"amertume_ibu":25,"type_houblon":"Cascade","stock":50}"#,
        ));
        let patch = ProductPatch {
            attributes: Some(json!({"stock": "4"})),
            ..Default::default()
        };
        let validated = patch.apply(&existing, &brewery(), None).unwrap();

        let map = attributes::decode(validated.attributes.as_deref());
        assert_eq!(map.number("stock"), Some(4.0));
        assert_eq!(map.text("type_houblon"), Some("Cascade"));
        assert_eq!(validated.category_id, existing.category_id);
    }

    #[test]
    fn test_patch_rejects_negative_stock() {
        let existing = stored(Some(r#"{"degre_alcool":5,"amertume_ibu":20,"stock":5}"#));
        let patch = ProductPatch {
            attributes: Some(json!({"stock": -1})),
            ..Default::default()
        };
        let err = patch.apply(&existing, &brewery(), None).unwrap_err();
        assert_eq!(err.field(), Some("stock"));
    }

    #[test]
    fn test_patch_cannot_blank_an_optional_attribute() {
        let existing = stored(Some(
            r#"{"degre_alcool":5.2,"amertume_ibu":25,"type_houblon":"Cascade","stock":50}"#,
        ));
        let patch = ProductPatch {
            attributes: Some(json!({"type_houblon": "   "})),
            ..Default::default()
        };
        let err = patch.apply(&existing, &brewery(), None).unwrap_err();
        assert_eq!(err, CatalogError::invalid("type_houblon", "must not be empty"));
    }

    #[test]
    fn test_patch_replaces_malformed_payload() {
        let existing = stored(Some("{invalid"));
        let patch = ProductPatch {
            attributes: Some(json!({"stock": 3})),
            ..Default::default()
        };
        let validated = patch.apply(&existing, &brewery(), None).unwrap();
        assert_eq!(validated.attributes.as_deref(), Some(r#"{"stock":3}"#));
    }

    #[test]
    fn test_patch_checks_category_only_on_change() {
        let existing = stored(None);
        let same = ProductPatch {
            category_id: Some(CategoryId::new(10)),
            price: Some(Decimal::new(500, 2)),
            ..Default::default()
        };
        let validated = same.apply(&existing, &brewery(), None).unwrap();
        assert_eq!(validated.price.amount(), Decimal::new(500, 2));
        assert_eq!(validated.attributes, None);

        let moved = ProductPatch {
            category_id: Some(CategoryId::new(11)),
            ..Default::default()
        };
        assert!(matches!(
            moved.apply(&existing, &brewery(), None),
            Err(CatalogError::UnknownRelation { id: 11, .. })
        ));
    }

    #[test]
    fn test_view_defaults_malformed_stock_to_in_stock() {
        let view = ProductView::from_record(stored(Some("{invalid")));
        assert_eq!(view.stock_status, StockStatus::InStock);
        assert!(view.attributes.is_empty());

        let json = serde_json::to_value(ProductView::from_record(stored(Some(r#"{"stock":0}"#))))
            .unwrap();
        assert_eq!(json["stockStatus"], "out_of_stock");
        assert_eq!(json["categoryName"], "Blondes");
    }
}
