//! Seed the catalog database.
//!
//! Loads a YAML catalog (the embedded demo catalog by default) and inserts
//! its shops, categories and products into an empty catalog database.
//! Products are validated exactly as the API validates them, and the whole
//! file is checked before the first row is written. Seeding a catalog that
//! already has shops is refused.

use std::path::Path;

use tracing::info;

use multiverse_api::db::PgCatalogStore;
use multiverse_api::seed::{SeedCatalog, SeedError, seed_empty_catalog};

#[derive(Debug, thiserror::Error)]
pub enum SeedCommandError {
    #[error(transparent)]
    MissingEnvVar(#[from] super::MissingDatabaseUrl),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Seed the catalog from a YAML file, or from the demo catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a product fails
/// validation, the catalog is not empty, or a database operation fails.
pub async fn run(file: Option<&Path>) -> Result<(), SeedCommandError> {
    let catalog = load_catalog(file)?;
    let database_url = super::database_url()?;

    info!("Connecting to catalog database...");
    let pool = multiverse_api::db::create_pool(&database_url).await?;
    let store = PgCatalogStore::new(pool);

    let summary = seed_empty_catalog(&store, &catalog).await?;
    info!(
        shops = summary.shops,
        categories = summary.categories,
        products = summary.products,
        "Catalog seeded"
    );
    Ok(())
}

fn load_catalog(file: Option<&Path>) -> Result<SeedCatalog, SeedCommandError> {
    let Some(path) = file else {
        info!("Using embedded demo catalog");
        return Ok(SeedCatalog::demo()?);
    };

    info!(path = %path.display(), "Loading catalog file");
    let text = std::fs::read_to_string(path).map_err(|source| SeedCommandError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(SeedCatalog::from_yaml(&text)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog_is_default() {
        let catalog = load_catalog(None).unwrap();
        assert_eq!(catalog.shops.len(), 4);
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = load_catalog(Some(Path::new("/nonexistent/catalog.yaml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.yaml"));
    }
}
