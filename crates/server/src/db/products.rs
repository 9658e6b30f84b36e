//! Product repository for database operations.

use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::SqlitePool;

use ezelectronics_core::{Category, Price, ProductModel};

use super::carts::{load_unpaid_carts, save_cart_lines};
use super::{RepositoryError, map_unique_violation};
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "model, category, selling_price, arrival_date, details, quantity";

/// A product as stored, before validation.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    model: String,
    category: String,
    selling_price: String,
    arrival_date: NaiveDate,
    details: Option<String>,
    quantity: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let model = ProductModel::parse(&row.model).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid model in database: {e}"))
        })?;
        let category = Category::from_str(&row.category)
            .map_err(|e| RepositoryError::DataCorruption(format!("{e} for {model}")))?;
        let selling_price = Price::from_str(&row.selling_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for {model}: {e}"))
        })?;
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid quantity for {model}"))
        })?;

        Ok(Self {
            model,
            category,
            quantity,
            details: row.details,
            selling_price,
            arrival_date: row.arrival_date,
        })
    }
}

/// Which products a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// Every product.
    All,
    /// Products of one category.
    Category(Category),
    /// The single product with this model.
    Model(ProductModel),
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the model already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO products (model, category, selling_price, arrival_date, details, quantity)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(product.model.as_str())
        .bind(product.category.as_str())
        .bind(product.selling_price.amount().to_string())
        .bind(product.arrival_date)
        .bind(product.details.as_deref())
        .bind(i64::from(product.quantity))
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "model"))?;

        tracing::debug!(model = %product.model, "product row inserted");
        Ok(())
    }

    /// Get a product by model.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, model: &ProductModel) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE model = ?"
        ))
        .bind(model.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// List products matching `filter`, optionally only those in stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        available_only: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        let stock_clause = if available_only { " AND quantity > 0" } else { "" };

        let rows: Vec<ProductRow> = match filter {
            ProductFilter::All => {
                sqlx::query_as(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1{stock_clause} ORDER BY model"
                ))
                .fetch_all(self.pool)
                .await?
            }
            ProductFilter::Category(category) => {
                sqlx::query_as(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?{stock_clause} ORDER BY model"
                ))
                .bind(category.as_str())
                .fetch_all(self.pool)
                .await?
            }
            ProductFilter::Model(model) => {
                sqlx::query_as(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE model = ?{stock_clause}"
                ))
                .bind(model.as_str())
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Add units to a product's stock and return the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the new stock would exceed
    /// `u32::MAX`; the row is left unchanged.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn increase_quantity(
        &self,
        model: &ProductModel,
        by: u32,
    ) -> Result<u32, RepositoryError> {
        let quantity: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE products SET quantity = quantity + ?
            WHERE model = ? AND quantity + ? <= ?
            RETURNING quantity
            ",
        )
        .bind(i64::from(by))
        .bind(model.as_str())
        .bind(i64::from(by))
        .bind(i64::from(u32::MAX))
        .fetch_optional(self.pool)
        .await?;

        match quantity {
            Some(q) => stored_quantity(model, q),
            None if self.get(model).await?.is_some() => Err(RepositoryError::Conflict(format!(
                "stock of {model} cannot exceed {}",
                u32::MAX
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Remove units from a product's stock and return the new quantity.
    ///
    /// The update only applies when enough units are in stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product does not exist or
    /// has fewer than `by` units.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn decrease_quantity(
        &self,
        model: &ProductModel,
        by: u32,
    ) -> Result<u32, RepositoryError> {
        let quantity: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE products SET quantity = quantity - ?
            WHERE model = ? AND quantity >= ?
            RETURNING quantity
            ",
        )
        .bind(i64::from(by))
        .bind(model.as_str())
        .bind(i64::from(by))
        .fetch_optional(self.pool)
        .await?;

        quantity
            .ok_or_else(|| RepositoryError::Conflict(format!("not enough stock for {model}")))
            .and_then(|q| stored_quantity(model, q))
    }

    /// Delete a product and strip it from every unpaid cart.
    ///
    /// Reviews of the product are removed by the foreign key cascade. Returns
    /// false if the product did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails; nothing is
    /// changed in that case.
    pub async fn delete(&self, model: &ProductModel) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM products WHERE model = ?")
            .bind(model.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Ok(false);
        }

        let mut touched = 0_usize;
        for mut stored in load_unpaid_carts(&mut *tx).await? {
            if stored.cart.strip_model(model) {
                save_cart_lines(&mut *tx, &stored).await?;
                touched += 1;
            }
        }

        tx.commit().await?;
        tracing::debug!(model = %model, carts = touched, "product deleted");
        Ok(true)
    }

    /// Delete every product and empty every unpaid cart.
    ///
    /// Returns the number of deleted products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails; nothing is
    /// changed in that case.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for mut stored in load_unpaid_carts(&mut *tx).await? {
            if !stored.cart.is_empty() {
                stored.cart.clear();
                save_cart_lines(&mut *tx, &stored).await?;
            }
        }

        tx.commit().await?;
        Ok(deleted)
    }
}

fn stored_quantity(model: &ProductModel, quantity: i64) -> Result<u32, RepositoryError> {
    u32::try_from(quantity)
        .map_err(|_| RepositoryError::DataCorruption(format!("invalid quantity for {model}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn model(s: &str) -> ProductModel {
        ProductModel::parse(s).unwrap()
    }

    fn product(name: &str, category: Category, quantity: u32) -> Product {
        Product {
            model: model(name),
            category,
            quantity,
            details: Some(format!("{name} details")),
            selling_price: "199.99".parse().unwrap(),
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = create_test_pool().await.unwrap();
        let repo = ProductRepository::new(&pool);

        let iphone = product("iPhone13", Category::Smartphone, 5);
        repo.create(&iphone).await.unwrap();

        let fetched = repo.get(&model("iPhone13")).await.unwrap().unwrap();
        assert_eq!(fetched, iphone);
        assert!(repo.get(&model("Pixel")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let pool = create_test_pool().await.unwrap();
        let repo = ProductRepository::new(&pool);

        repo.create(&product("iPhone13", Category::Smartphone, 5))
            .await
            .unwrap();
        let err = repo
            .create(&product("iPhone13", Category::Laptop, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let pool = create_test_pool().await.unwrap();
        let repo = ProductRepository::new(&pool);
        repo.create(&product("iPhone13", Category::Smartphone, 5))
            .await
            .unwrap();
        repo.create(&product("Pixel8", Category::Smartphone, 0))
            .await
            .unwrap();
        repo.create(&product("XPS13", Category::Laptop, 2))
            .await
            .unwrap();

        assert_eq!(repo.list(&ProductFilter::All, false).await.unwrap().len(), 3);
        assert_eq!(repo.list(&ProductFilter::All, true).await.unwrap().len(), 2);

        let phones = repo
            .list(&ProductFilter::Category(Category::Smartphone), false)
            .await
            .unwrap();
        assert_eq!(phones.len(), 2);

        let available_phones = repo
            .list(&ProductFilter::Category(Category::Smartphone), true)
            .await
            .unwrap();
        assert_eq!(available_phones.len(), 1);
        assert_eq!(available_phones[0].model.as_str(), "iPhone13");

        let pixel = repo
            .list(&ProductFilter::Model(model("Pixel8")), true)
            .await
            .unwrap();
        assert!(pixel.is_empty());
    }

    #[tokio::test]
    async fn test_increase_and_decrease_quantity() {
        let pool = create_test_pool().await.unwrap();
        let repo = ProductRepository::new(&pool);
        repo.create(&product("XPS13", Category::Laptop, 2))
            .await
            .unwrap();

        assert_eq!(repo.increase_quantity(&model("XPS13"), 3).await.unwrap(), 5);
        assert_eq!(repo.decrease_quantity(&model("XPS13"), 5).await.unwrap(), 0);

        let err = repo.decrease_quantity(&model("XPS13"), 1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let err = repo
            .increase_quantity(&model("Missing"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_increase_quantity_past_u32_max_leaves_row_intact() {
        let pool = create_test_pool().await.unwrap();
        let repo = ProductRepository::new(&pool);
        repo.create(&product("XPS13", Category::Laptop, 4_000_000_000))
            .await
            .unwrap();

        let err = repo
            .increase_quantity(&model("XPS13"), 1_000_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let stored = repo.get(&model("XPS13")).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 4_000_000_000);
        assert_eq!(repo.list(&ProductFilter::All, false).await.unwrap().len(), 1);

        let room = u32::MAX - 4_000_000_000;
        assert_eq!(
            repo.increase_quantity(&model("XPS13"), room).await.unwrap(),
            u32::MAX
        );
    }

    #[tokio::test]
    async fn test_delete_all() {
        let pool = create_test_pool().await.unwrap();
        let repo = ProductRepository::new(&pool);
        repo.create(&product("iPhone13", Category::Smartphone, 5))
            .await
            .unwrap();
        repo.create(&product("XPS13", Category::Laptop, 2))
            .await
            .unwrap();

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert!(repo.list(&ProductFilter::All, false).await.unwrap().is_empty());
        assert!(!repo.delete(&model("iPhone13")).await.unwrap());
    }
}
