//! Errors surfaced by the catalog write path.
//!
//! Read paths (listing, filtering, statistics) never produce these: irregular
//! data there is absorbed by the lenient-read policy in [`crate::attributes`].

use thiserror::Error;

use crate::types::ShopType;

/// Field-level failure reported by the validator and the product write path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The attribute payload could not be decoded into a JSON object.
    #[error("malformed attribute payload: {0}")]
    MalformedAttributePayload(String),

    /// A field required by the shop type's schema is absent.
    #[error("missing mandatory field `{field}` for {shop_type} products")]
    MissingMandatoryField {
        /// Name of the missing field.
        field: String,
        /// Business type whose schema requires it.
        shop_type: ShopType,
    },

    /// A supplied field violates its constraint.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidFieldValue {
        /// Name of the offending field.
        field: String,
        /// Human-readable constraint description.
        reason: String,
    },

    /// A referenced shop or category does not exist, or belongs to another shop.
    #[error("{entity} {id} not found")]
    UnknownRelation {
        /// Kind of entity that was referenced (`"shop"`, `"category"`).
        entity: &'static str,
        /// The referenced identifier.
        id: i32,
    },
}

impl CatalogError {
    /// Build an [`CatalogError::InvalidFieldValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The field this error is about, if it concerns a single field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingMandatoryField { field, .. } | Self::InvalidFieldValue { field, .. } => {
                Some(field)
            }
            Self::MalformedAttributePayload(_) | Self::UnknownRelation { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = CatalogError::MissingMandatoryField {
            field: "amertume_ibu".to_string(),
            shop_type: ShopType::Brewery,
        };
        assert_eq!(
            err.to_string(),
            "missing mandatory field `amertume_ibu` for brewery products"
        );
        assert_eq!(err.field(), Some("amertume_ibu"));
    }

    #[test]
    fn test_unknown_relation_has_no_field() {
        let err = CatalogError::UnknownRelation {
            entity: "category",
            id: 9,
        };
        assert_eq!(err.to_string(), "category 9 not found");
        assert_eq!(err.field(), None);
    }
}
