//! Catalog and stock rules.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use ezelectronics_core::{Category, Price, ProductModel, ensure_not_future, parse_iso_date};

use super::error::DomainError;
use super::today;
use crate::db::products::{ProductFilter, ProductRepository};
use crate::db::RepositoryError;
use crate::models::Product;

/// Raw product registration as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct NewProductInput<'a> {
    pub model: &'a str,
    pub category: &'a str,
    pub quantity: i64,
    pub details: Option<&'a str>,
    pub selling_price: f64,
    pub arrival_date: Option<&'a str>,
}

/// Raw listing query parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingQuery<'a> {
    pub grouping: Option<&'a str>,
    pub category: Option<&'a str>,
    pub model: Option<&'a str>,
}

/// Turn listing query parameters into a filter.
///
/// # Errors
///
/// Returns `DomainError::Validation` when the parameters do not form one of
/// the accepted combinations: nothing, `grouping=category` with a category,
/// or `grouping=model` with a model.
pub fn parse_listing_query(query: ListingQuery<'_>) -> Result<ProductFilter, DomainError> {
    let invalid = |msg: &str| Err(DomainError::Validation(msg.to_string()));

    match query.grouping {
        None => {
            if query.category.is_some() || query.model.is_some() {
                return invalid("category and model require a grouping");
            }
            Ok(ProductFilter::All)
        }
        Some("category") => {
            if query.model.is_some() {
                return invalid("model cannot be combined with grouping=category");
            }
            let Some(category) = query.category else {
                return invalid("grouping=category requires a category");
            };
            let category: Category = category.parse().map_err(DomainError::Validation)?;
            Ok(ProductFilter::Category(category))
        }
        Some("model") => {
            if query.category.is_some() {
                return invalid("category cannot be combined with grouping=model");
            }
            let Some(model) = query.model else {
                return invalid("grouping=model requires a model");
            };
            Ok(ProductFilter::Model(ProductModel::parse(model)?))
        }
        Some(other) => Err(DomainError::Validation(format!(
            "unknown grouping '{other}', expected 'category' or 'model'"
        ))),
    }
}

/// Product service.
pub struct ProductService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Register a new product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for blank model, unknown category,
    /// non-positive quantity or price, `DomainError::InvalidDate` for an
    /// arrival date after today, and `DomainError::ProductAlreadyExists` if
    /// the model is taken.
    pub async fn register(&self, input: NewProductInput<'_>) -> Result<Product, DomainError> {
        let model = ProductModel::parse(input.model)?;
        let category: Category = input.category.parse().map_err(DomainError::Validation)?;
        let quantity = positive_quantity(input.quantity)?;
        let selling_price = Price::parse_f64(input.selling_price)?;
        let arrival_date = optional_past_date(input.arrival_date)?;
        let details = input
            .details
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);

        let product = Product {
            model,
            category,
            quantity,
            details,
            selling_price,
            arrival_date,
        };

        self.products.create(&product).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => DomainError::ProductAlreadyExists,
            other => DomainError::Repository(other),
        })?;

        tracing::info!(model = %product.model, quantity, "product registered");
        Ok(product)
    }

    /// Add units to a product and return the new stock level.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDate` if the change date is after today
    /// or before the product's arrival, `DomainError::ProductNotFound`
    /// for unknown models and `DomainError::Validation` if the new stock
    /// would not fit in a `u32`.
    pub async fn restock(
        &self,
        model: &str,
        quantity: i64,
        change_date: Option<&str>,
    ) -> Result<u32, DomainError> {
        let model = ProductModel::parse(model)?;
        let quantity = positive_quantity(quantity)?;
        let change_date = optional_past_date(change_date)?;

        let product = self.require(&model).await?;
        ensure_not_before_arrival(&product, change_date)?;
        if product.quantity.checked_add(quantity).is_none() {
            return Err(stock_limit_exceeded());
        }

        let new_quantity = self
            .products
            .increase_quantity(&model, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => DomainError::ProductNotFound,
                RepositoryError::Conflict(_) => stock_limit_exceeded(),
                other => DomainError::Repository(other),
            })?;

        tracing::info!(model = %model, added = quantity, new_quantity, "product restocked");
        Ok(new_quantity)
    }

    /// Record a sale of units and return the new stock level.
    ///
    /// # Errors
    ///
    /// Returns the same date and lookup errors as [`Self::restock`], plus
    /// `DomainError::EmptyProductStock` when nothing is left and
    /// `DomainError::LowProductStock` when fewer units than requested are left.
    pub async fn sell(
        &self,
        model: &str,
        quantity: i64,
        selling_date: Option<&str>,
    ) -> Result<u32, DomainError> {
        let model = ProductModel::parse(model)?;
        let quantity = positive_quantity(quantity)?;
        let selling_date = optional_past_date(selling_date)?;

        let product = self.require(&model).await?;
        ensure_not_before_arrival(&product, selling_date)?;
        ensure_stock(&product, quantity)?;

        let new_quantity = self
            .products
            .decrease_quantity(&model, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => DomainError::LowProductStock,
                other => DomainError::Repository(other),
            })?;

        tracing::info!(model = %model, sold = quantity, new_quantity, "product sold");
        Ok(new_quantity)
    }

    /// List products, optionally only those in stock.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an invalid query and
    /// `DomainError::ProductNotFound` when filtering by an unknown model.
    pub async fn list(
        &self,
        query: ListingQuery<'_>,
        available_only: bool,
    ) -> Result<Vec<Product>, DomainError> {
        let filter = parse_listing_query(query)?;

        if let ProductFilter::Model(ref model) = filter {
            self.require(model).await?;
        }

        Ok(self.products.list(&filter, available_only).await?)
    }

    /// Delete a product, its reviews and its lines in unpaid carts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` for unknown models.
    pub async fn delete(&self, model: &str) -> Result<(), DomainError> {
        let model = ProductModel::parse(model)?;

        if !self.products.delete(&model).await? {
            return Err(DomainError::ProductNotFound);
        }

        tracing::info!(model = %model, "product deleted");
        Ok(())
    }

    /// Delete every product and empty every unpaid cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, DomainError> {
        let deleted = self.products.delete_all().await?;
        tracing::info!(deleted, "all products deleted");
        Ok(deleted)
    }

    async fn require(&self, model: &ProductModel) -> Result<Product, DomainError> {
        self.products
            .get(model)
            .await?
            .ok_or(DomainError::ProductNotFound)
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, DomainError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| DomainError::Validation("quantity must be a positive integer".to_string()))
}

fn stock_limit_exceeded() -> DomainError {
    DomainError::Validation(format!("stock cannot exceed {}", u32::MAX))
}

/// Parse an optional date, defaulting to today and rejecting future dates.
fn optional_past_date(date: Option<&str>) -> Result<NaiveDate, DomainError> {
    let today = today();
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(today),
        Some(raw) => Ok(ensure_not_future(parse_iso_date(raw)?, today)?),
    }
}

fn ensure_not_before_arrival(product: &Product, date: NaiveDate) -> Result<(), DomainError> {
    if date < product.arrival_date {
        return Err(DomainError::InvalidDate(format!(
            "{date} is before the arrival of {} on {}",
            product.model, product.arrival_date
        )));
    }
    Ok(())
}

fn ensure_stock(product: &Product, requested: u32) -> Result<(), DomainError> {
    if product.quantity == 0 {
        return Err(DomainError::EmptyProductStock);
    }
    if product.quantity < requested {
        return Err(DomainError::LowProductStock);
    }
    Ok(())
}
