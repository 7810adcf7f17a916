//! Catalog seeding from YAML.
//!
//! The demo catalog (`seed/universes.yaml`) is embedded in the binary. Every
//! seeded product goes through [`NewProduct::validate`], so a seed file
//! cannot introduce payloads the API would refuse.
//!
//! # File Format
//!
//! ```yaml
//! shops:
//!   - name: Brasserie du Multivers
//!     shopType: brewery
//!     categories: [Blondes]
//!     products:
//!       - name: Blonde du Comptoir
//!         category: Blondes
//!         price: "4.50"
//!         attributes: { degre_alcool: 5.2, amertume_ibu: 25, stock: 50 }
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use multiverse_core::{CatalogError, NewCategory, NewProduct, NewShop};

use crate::db::{CatalogStore, MemoryCatalogStore, RepositoryError};

/// The embedded demo catalog.
pub const DEMO_CATALOG: &str = include_str!("../seed/universes.yaml");

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("product `{product}` of `{shop}` references unknown category `{category}`")]
    UnknownCategory {
        shop: String,
        product: String,
        category: String,
    },

    #[error("product `{product}` of `{shop}` is invalid: {source}")]
    InvalidProduct {
        shop: String,
        product: String,
        #[source]
        source: CatalogError,
    },

    #[error("catalog already holds {0} shop(s), refusing to seed it again")]
    NotEmpty(usize),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A whole seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCatalog {
    pub shops: Vec<SeedShop>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedShop {
    #[serde(flatten)]
    pub shop: NewShop,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub name: String,
    /// Category name within the same shop.
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl SeedCatalog {
    /// Parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the text is not a valid seed file.
    pub fn from_yaml(text: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// The embedded demo catalog.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the embedded file is invalid.
    pub fn demo() -> Result<Self, SeedError> {
        Self::from_yaml(DEMO_CATALOG)
    }
}

/// Counts of inserted rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub shops: usize,
    pub categories: usize,
    pub products: usize,
}

/// Insert a seed catalog into a store.
///
/// Shops are inserted in file order, each followed by its categories and
/// products. Seeding stops at the first invalid product.
///
/// # Errors
///
/// Returns `SeedError` if a product references an unknown category, fails
/// validation, or the store rejects a write.
pub async fn seed_catalog(
    store: &dyn CatalogStore,
    catalog: &SeedCatalog,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for seed in &catalog.shops {
        let shop = store.create_shop(&seed.shop).await?;
        summary.shops += 1;
        tracing::debug!(shop = %shop.name, shop_type = %shop.shop_type, "Seeded shop");

        let mut categories = HashMap::with_capacity(seed.categories.len());
        for name in &seed.categories {
            let category = store
                .create_category(&NewCategory {
                    shop_id: shop.id,
                    name: name.clone(),
                })
                .await?;
            categories.insert(name.as_str(), category);
            summary.categories += 1;
        }

        for product in &seed.products {
            let category = categories.get(product.category.as_str()).ok_or_else(|| {
                SeedError::UnknownCategory {
                    shop: shop.name.clone(),
                    product: product.name.clone(),
                    category: product.category.clone(),
                }
            })?;

            let validated = NewProduct {
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                category_id: category.id,
                image_url: product.image_url.clone(),
                attributes: product.attributes.clone(),
            }
            .validate(&shop, Some(category))
            .map_err(|source| SeedError::InvalidProduct {
                shop: shop.name.clone(),
                product: product.name.clone(),
                source,
            })?;

            store.create_product(&validated).await?;
            summary.products += 1;
        }
    }

    Ok(summary)
}

/// Seed a store that holds no shops yet.
///
/// The whole catalog is first loaded into a scratch [`MemoryCatalogStore`],
/// so an invalid product or an unknown category fails before anything
/// reaches `store`. A store failure part-way through can still leave the
/// rows written so far behind.
///
/// # Errors
///
/// Returns `SeedError::NotEmpty` if `store` already has shops, otherwise as
/// [`seed_catalog`].
pub async fn seed_empty_catalog(
    store: &dyn CatalogStore,
    catalog: &SeedCatalog,
) -> Result<SeedSummary, SeedError> {
    let existing = store.list_shops().await?.len();
    if existing > 0 {
        return Err(SeedError::NotEmpty(existing));
    }

    MemoryCatalogStore::new().load(catalog).await?;
    tracing::debug!("Seed catalog passed the dry run");

    seed_catalog(store, catalog).await
}
