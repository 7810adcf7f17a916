//! Attribute validator for the write path.
//!
//! Validation is fail-fast: fields are checked in schema order and the first
//! failure is the one reported. The output is the normalized payload that
//! gets encoded and handed to persistence.

use serde_json::Value;

use crate::attributes::{self, AttributeMap, AttributeValue};
use crate::error::CatalogError;
use crate::schema::{FieldKind, FieldRule, schema_for};
use crate::types::ShopType;

/// Whether a payload is a full create or a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every mandatory field must be present.
    Create,
    /// Only supplied fields are checked; the result is merged over the stored payload.
    Update,
}

/// Validate and normalize a candidate attribute map.
///
/// Normalization turns numeric text into numbers, `"true"`/`"false"` into
/// booleans for flag fields, and trims text. Fields outside the schema pass
/// through unchanged. A blank optional field is dropped on create. Unrecognized
/// shop types are returned as-is.
///
/// # Errors
///
/// - `MissingMandatoryField` on create when a required field is absent or blank.
/// - `InvalidFieldValue` when a supplied field violates its rule, or when any
///   schema field is supplied blank on update.
pub fn validate(
    shop_type: ShopType,
    candidate: &AttributeMap,
    mode: ValidationMode,
) -> Result<AttributeMap, CatalogError> {
    let Some(schema) = schema_for(shop_type) else {
        return Ok(candidate.clone());
    };

    let mut normalized = candidate.clone();
    for rule in schema.fields {
        match (candidate.get(rule.name), mode) {
            (Some(value), _) if !is_blank(value) => {
                normalized.insert(rule.name, normalize(rule, value)?);
            }
            // An explicit blank would overwrite the stored value
            (Some(_), ValidationMode::Update) => {
                return Err(CatalogError::invalid(rule.name, "must not be empty"));
            }
            (Some(_), ValidationMode::Create) if !rule.required => {
                normalized.remove(rule.name);
            }
            (_, ValidationMode::Create) if rule.required => {
                return Err(CatalogError::MissingMandatoryField {
                    field: rule.name.to_string(),
                    shop_type,
                });
            }
            _ => {}
        }
    }

    Ok(normalized)
}

/// Strictly decode a JSON payload, then [`validate`] it.
///
/// # Errors
///
/// `MalformedAttributePayload` if the payload is not an object, otherwise as
/// [`validate`].
pub fn validate_json(
    shop_type: ShopType,
    candidate: &Value,
    mode: ValidationMode,
) -> Result<AttributeMap, CatalogError> {
    let map = attributes::from_json(candidate)?;
    validate(shop_type, &map, mode)
}

/// Strictly decode payload text, then [`validate`] it.
///
/// # Errors
///
/// As [`validate_json`].
pub fn validate_raw(
    shop_type: ShopType,
    raw: &str,
    mode: ValidationMode,
) -> Result<AttributeMap, CatalogError> {
    let map = attributes::try_decode(raw)?;
    validate(shop_type, &map, mode)
}

fn is_blank(value: &AttributeValue) -> bool {
    matches!(value, AttributeValue::Text(s) if s.trim().is_empty())
}

fn normalize(rule: &FieldRule, value: &AttributeValue) -> Result<AttributeValue, CatalogError> {
    match rule.kind {
        FieldKind::Number { min } => {
            let number = match value {
                AttributeValue::Number(n) if n.as_f64().is_some_and(f64::is_finite) => n.clone(),
                AttributeValue::Text(s) => attributes::parse_number(s)
                    .ok_or_else(|| CatalogError::invalid(rule.name, "must be a number"))?,
                _ => return Err(CatalogError::invalid(rule.name, "must be a number")),
            };
            if let (Some(min), Some(actual)) = (min, number.as_f64())
                && actual < min
            {
                return Err(CatalogError::invalid(
                    rule.name,
                    format!("must be at least {min}"),
                ));
            }
            Ok(AttributeValue::Number(number))
        }
        FieldKind::Text => match value {
            AttributeValue::Text(s) => Ok(AttributeValue::Text(s.trim().to_string())),
            _ => Err(CatalogError::invalid(rule.name, "must be a string")),
        },
        FieldKind::Flag => value
            .as_flag()
            .map(AttributeValue::Bool)
            .ok_or_else(|| CatalogError::invalid(rule.name, "must be a boolean")),
    }
}
