//! `PostgreSQL` catalog store.
//!
//! The structured filter stage is pushed down as `WHERE` clauses built with
//! [`QueryBuilder`]; substring predicates use `ILIKE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use multiverse_core::{
    Category, CategoryId, NewCategory, NewShop, Price, ProductId, ProductRecord, Shop, ShopId,
    ShopType, StructuredFilter, ValidatedProduct,
};

use super::{CatalogStore, RepositoryError};

const PRODUCT_COLUMNS: &str = "p.id, p.shop_id, p.category_id, c.name AS category_name, \
     p.name, p.description, p.price, p.image_url, p.attributes, p.created_at";

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i32,
    name: String,
    shop_type: String,
    description: Option<String>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: ShopId::new(row.id),
            name: row.name,
            shop_type: ShopType::from(row.shop_type),
            description: row.description,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    shop_id: i32,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            shop_id: ShopId::new(row.shop_id),
            name: row.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    shop_id: i32,
    category_id: i32,
    category_name: String,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    attributes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for ProductRecord {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            shop_id: ShopId::new(row.shop_id),
            category_id: CategoryId::new(row.category_id),
            category_name: row.category_name,
            name: row.name,
            description: row.description,
            price,
            image_url: row.image_url,
            attributes: row.attributes,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// Catalog store backed by the `catalog` schema.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_products(
        &self,
        mut query: QueryBuilder<'_, Postgres>,
    ) -> Result<Vec<ProductRecord>, RepositoryError> {
        query.push(" ORDER BY p.id");
        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(ProductRecord::try_from).collect()
    }
}

fn select_products<'a>() -> QueryBuilder<'a, Postgres> {
    QueryBuilder::new(format!(
        "SELECT {PRODUCT_COLUMNS} FROM catalog.products p \
         JOIN catalog.categories c ON c.id = p.category_id"
    ))
}

/// Append the structured filter stage as `AND` clauses.
fn push_structured_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &StructuredFilter) {
    if let Some(category) = &filter.category {
        query.push(" AND c.name ILIKE ").push_bind(like_pattern(category));
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query
            .push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(min) = filter.min_price {
        query.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        query.push(" AND p.price <= ").push_bind(max);
    }
}

/// `%text%` with `LIKE` wildcards in `text` escaped.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        let rows: Vec<ShopRow> = sqlx::query_as(
            "SELECT id, name, shop_type, description FROM catalog.shops ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_shop(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let row: Option<ShopRow> = sqlx::query_as(
            "SELECT id, name, shop_type, description FROM catalog.shops WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create_shop(&self, shop: &NewShop) -> Result<Shop, RepositoryError> {
        let row: ShopRow = sqlx::query_as(
            r"
            INSERT INTO catalog.shops (name, shop_type, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, shop_type, description
            ",
        )
        .bind(&shop.name)
        .bind(shop.shop_type.as_str())
        .bind(&shop.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_categories(&self, shop_id: ShopId) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, shop_id, name FROM catalog.categories WHERE shop_id = $1 ORDER BY id",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, shop_id, name FROM catalog.categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let row: CategoryRow = sqlx::query_as(
            r"
            INSERT INTO catalog.categories (shop_id, name)
            VALUES ($1, $2)
            RETURNING id, shop_id, name
            ",
        )
        .bind(category.shop_id)
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(format!("category `{}` already exists", category.name))
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(row.into())
    }

    async fn list_products(
        &self,
        shop_id: ShopId,
        filter: &StructuredFilter,
    ) -> Result<Vec<ProductRecord>, RepositoryError> {
        let mut query = select_products();
        query.push(" WHERE p.shop_id = ").push_bind(shop_id);
        push_structured_filter(&mut query, filter);
        self.fetch_products(query).await
    }

    async fn list_all_products(&self) -> Result<Vec<ProductRecord>, RepositoryError> {
        self.fetch_products(select_products()).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<ProductRecord>, RepositoryError> {
        let mut query = select_products();
        query.push(" WHERE p.id = ").push_bind(id);
        let row: Option<ProductRow> = query.build_query_as().fetch_optional(&self.pool).await?;
        row.map(ProductRecord::try_from).transpose()
    }

    async fn create_product(
        &self,
        product: &ValidatedProduct,
    ) -> Result<ProductRecord, RepositoryError> {
        let sql = format!(
            r"
            WITH p AS (
                INSERT INTO catalog.products
                    (shop_id, category_id, name, description, price, image_url, attributes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS} FROM p JOIN catalog.categories c ON c.id = p.category_id
            "
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(product.shop_id)
            .bind(product.category_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(&product.image_url)
            .bind(&product.attributes)
            .fetch_one(&self.pool)
            .await
            .map_err(map_foreign_key)?;

        row.try_into()
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &ValidatedProduct,
    ) -> Result<ProductRecord, RepositoryError> {
        let sql = format!(
            r"
            WITH p AS (
                UPDATE catalog.products
                SET category_id = $2, name = $3, description = $4, price = $5,
                    image_url = $6, attributes = $7, updated_at = now()
                WHERE id = $1
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS} FROM p JOIN catalog.categories c ON c.id = p.category_id
            "
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(product.category_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(&product.image_url)
            .bind(&product.attributes)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_foreign_key)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn map_foreign_key(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            RepositoryError::Conflict(db_err.message().to_string())
        }
        other => RepositoryError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("blonde"), "%blonde%");
        assert_eq!(like_pattern("100%_pur"), "%100\\%\\_pur%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_structured_filter_sql() {
        let filter = StructuredFilter {
            category: Some("blond".to_string()),
            search: Some("ipa".to_string()),
            min_price: Some(Decimal::new(300, 2)),
            max_price: None,
        };
        let mut query = select_products();
        query.push(" WHERE p.shop_id = ").push_bind(ShopId::new(1));
        push_structured_filter(&mut query, &filter);

        let sql = query.sql();
        assert!(sql.contains("WHERE p.shop_id = $1"));
        assert!(sql.contains("AND c.name ILIKE $2"));
        assert!(sql.contains("AND (p.name ILIKE $3 OR p.description ILIKE $4)"));
        assert!(sql.contains("AND p.price >= $5"));
        assert!(!sql.contains("p.price <="));
    }

    #[test]
    fn test_unknown_shop_type_is_kept_as_unrecognized() {
        let shop = Shop::from(ShopRow {
            id: 3,
            name: "Boutique".to_string(),
            shop_type: "bakery".to_string(),
            description: None,
        });
        assert_eq!(shop.shop_type, ShopType::Unrecognized);
    }
}
