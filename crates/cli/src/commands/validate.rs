//! Offline attribute validation.
//!
//! Runs the same validator as the product write path and prints the
//! normalized payload, so seed files and front-end forms can be checked
//! without a database.

use std::path::Path;

use multiverse_core::{CatalogError, ShopType, ValidationMode, validate_raw};

#[derive(Debug, thiserror::Error)]
pub enum ValidateCommandError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] CatalogError),

    #[error("Failed to render payload: {0}")]
    Render(#[from] serde_json::Error),
}

/// Validate a payload and print its normalized JSON to stdout.
///
/// # Errors
///
/// Returns the first validation failure, or an error if the input file
/// cannot be read.
pub fn run(shop_type: &str, update: bool, input: &str) -> Result<(), ValidateCommandError> {
    let normalized = normalize(shop_type, update, input)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{normalized}");
    }
    Ok(())
}

fn normalize(shop_type: &str, update: bool, input: &str) -> Result<String, ValidateCommandError> {
    let shop_type = ShopType::from(shop_type);
    if shop_type == ShopType::Unrecognized {
        tracing::warn!("Unrecognized shop type, only checking that the payload is an object");
    }

    let mode = if update {
        ValidationMode::Update
    } else {
        ValidationMode::Create
    };

    let raw = read_input(input)?;
    let map = validate_raw(shop_type, &raw, mode)?;
    Ok(serde_json::to_string_pretty(&map.to_json())?)
}

/// Inline JSON, or the contents of the file named after `@`.
fn read_input(input: &str) -> Result<String, ValidateCommandError> {
    let Some(path) = input.strip_prefix('@') else {
        return Ok(input.to_string());
    };
    std::fs::read_to_string(Path::new(path)).map_err(|source| ValidateCommandError::Read {
        path: path.to_string(),
        source,
    })
}
