//! In-process catalog store.
//!
//! Runs the structured filter stage in-process. Backs the `memory` storage
//! mode and the HTTP tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use multiverse_core::{
    Category, CategoryId, NewCategory, NewShop, ProductId, ProductRecord, Shop, ShopId,
    StructuredFilter, ValidatedProduct,
};

use super::{CatalogStore, RepositoryError};
use crate::seed::{SeedCatalog, SeedError, SeedSummary, seed_catalog};

#[derive(Debug, Default)]
struct Tables {
    shops: Vec<Shop>,
    categories: Vec<Category>,
    products: Vec<ProductRecord>,
    next_product_id: i32,
}

impl Tables {
    fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn product_index(&self, id: ProductId) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }

    /// Category name for a product write, checking the foreign keys.
    fn category_name(&self, product: &ValidatedProduct) -> Result<String, RepositoryError> {
        if !self.shops.iter().any(|s| s.id == product.shop_id) {
            return Err(RepositoryError::Conflict(format!(
                "shop {} does not exist",
                product.shop_id
            )));
        }
        self.category(product.category_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| {
                RepositoryError::Conflict(format!(
                    "category {} does not exist",
                    product.category_id
                ))
            })
    }
}

/// Catalog store held in memory behind a `tokio` lock.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl MemoryCatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store loaded with the embedded demo catalog.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the demo catalog does not pass the write path.
    pub async fn with_demo_catalog() -> Result<Self, SeedError> {
        let store = Self::new();
        let summary = store.load(&SeedCatalog::demo()?).await?;
        tracing::info!(
            shops = summary.shops,
            categories = summary.categories,
            products = summary.products,
            "In-memory catalog seeded"
        );
        Ok(store)
    }

    /// Load a seed catalog into this store.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if a product does not pass the write path.
    pub async fn load(&self, catalog: &SeedCatalog) -> Result<SeedSummary, SeedError> {
        seed_catalog(self, catalog).await
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        Ok(self.tables.read().await.shops.clone())
    }

    async fn get_shop(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.shops.iter().find(|s| s.id == id).cloned())
    }

    async fn create_shop(&self, shop: &NewShop) -> Result<Shop, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = i32::try_from(tables.shops.len() + 1)
            .map_err(|_| RepositoryError::Conflict("too many shops".to_string()))?;
        let shop = Shop {
            id: ShopId::new(id),
            name: shop.name.clone(),
            shop_type: shop.shop_type,
            description: shop.description.clone(),
        };
        tables.shops.push(shop.clone());
        Ok(shop)
    }

    async fn list_categories(&self, shop_id: ShopId) -> Result<Vec<Category>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .filter(|c| c.shop_id == shop_id)
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.tables.read().await.category(id).cloned())
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .iter()
            .any(|c| c.shop_id == category.shop_id && c.name == category.name)
        {
            return Err(RepositoryError::Conflict(format!(
                "category `{}` already exists",
                category.name
            )));
        }
        let id = i32::try_from(tables.categories.len() + 1)
            .map_err(|_| RepositoryError::Conflict("too many categories".to_string()))?;
        let category = Category {
            id: CategoryId::new(id),
            shop_id: category.shop_id,
            name: category.name.clone(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_products(
        &self,
        shop_id: ShopId,
        filter: &StructuredFilter,
    ) -> Result<Vec<ProductRecord>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| p.shop_id == shop_id && filter.matches(p))
            .cloned()
            .collect())
    }

    async fn list_all_products(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(
        &self,
        product: &ValidatedProduct,
    ) -> Result<ProductRecord, RepositoryError> {
        let mut tables = self.tables.write().await;
        let category_name = tables.category_name(product)?;
        let id = tables
            .next_product_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Conflict("too many products".to_string()))?;
        tables.next_product_id = id;

        let record = ProductRecord {
            id: ProductId::new(id),
            shop_id: product.shop_id,
            category_id: product.category_id,
            category_name,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            attributes: product.attributes.clone(),
            created_at: Utc::now(),
        };
        tables.products.push(record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &ValidatedProduct,
    ) -> Result<ProductRecord, RepositoryError> {
        let mut tables = self.tables.write().await;
        let index = tables.product_index(id).ok_or(RepositoryError::NotFound)?;
        let category_name = tables.category_name(product)?;

        let record = tables
            .products
            .get_mut(index)
            .ok_or(RepositoryError::NotFound)?;
        record.category_id = product.category_id;
        record.category_name = category_name;
        record.name.clone_from(&product.name);
        record.description.clone_from(&product.description);
        record.price = product.price;
        record.image_url.clone_from(&product.image_url);
        record.attributes.clone_from(&product.attributes);
        Ok(record.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let index = tables.product_index(id).ok_or(RepositoryError::NotFound)?;
        tables.products.remove(index);
        Ok(())
    }
}
