//! Shopping cart rules.
//!
//! A customer has at most one unpaid cart. It is created on the first add
//! and becomes part of the history at checkout.

use sqlx::SqlitePool;

use ezelectronics_core::{Cart, ProductModel, Username};

use super::error::DomainError;
use super::today;
use crate::db::RepositoryError;
use crate::db::carts::{CartRepository, StoredCart};
use crate::db::products::ProductRepository;
use crate::models::Product;

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// The customer's unpaid cart, or an empty one if there is none.
    ///
    /// No cart is created.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the stored cart cannot be read.
    pub async fn current(&self, customer: &Username) -> Result<Cart, DomainError> {
        Ok(self
            .carts
            .find_unpaid(customer)
            .await?
            .map_or_else(|| Cart::empty(customer.clone()), |stored| stored.cart))
    }

    /// Add one unit of a product to the unpaid cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` for unknown models and
    /// `DomainError::EmptyProductStock` when the product has no units left.
    pub async fn add(&self, customer: &Username, model: &str) -> Result<(), DomainError> {
        let model = ProductModel::parse(model)?;
        let product = self.require_product(&model).await?;
        if !product.is_available() {
            return Err(DomainError::EmptyProductStock);
        }

        let mut stored = match self.carts.find_unpaid(customer).await? {
            Some(stored) => stored,
            None => self.carts.create_unpaid(customer).await?,
        };

        stored
            .cart
            .add_unit(product.model, product.category, product.selling_price);
        self.carts.save(&stored).await?;

        tracing::debug!(customer = %customer, model = %model, total = %stored.cart.total, "added to cart");
        Ok(())
    }

    /// Pay for the unpaid cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CartNotFound` without an unpaid cart,
    /// `DomainError::EmptyCart` if it has no lines, and
    /// `DomainError::EmptyProductStock` or `DomainError::LowProductStock` if a
    /// line cannot be fulfilled.
    pub async fn checkout(&self, customer: &Username) -> Result<(), DomainError> {
        let mut stored = self.require_unpaid(customer).await?;
        if stored.cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        for line in &stored.cart.products {
            let product = self.require_product(&line.model).await?;
            if product.quantity == 0 {
                return Err(DomainError::EmptyProductStock);
            }
            if product.quantity < line.quantity {
                return Err(DomainError::LowProductStock);
            }
        }

        stored.cart.mark_paid(today());
        self.carts
            .checkout(&stored)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => DomainError::LowProductStock,
                other => DomainError::Repository(other),
            })?;

        tracing::info!(
            customer = %customer,
            total = %stored.cart.total,
            lines = stored.cart.products.len(),
            "cart checked out"
        );
        Ok(())
    }

    /// Paid carts of the customer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the query fails.
    pub async fn history(&self, customer: &Username) -> Result<Vec<Cart>, DomainError> {
        Ok(self.carts.paid_history(customer).await?)
    }

    /// Remove one unit of a product from the unpaid cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CartNotFound` without a non-empty unpaid cart,
    /// `DomainError::ProductNotFound` for unknown models and
    /// `DomainError::ProductNotInCart` if the cart has no line for it.
    pub async fn remove_unit(&self, customer: &Username, model: &str) -> Result<(), DomainError> {
        let model = ProductModel::parse(model)?;

        let mut stored = self.require_unpaid(customer).await?;
        if stored.cart.is_empty() {
            return Err(DomainError::CartNotFound);
        }
        self.require_product(&model).await?;

        stored.cart.remove_unit(&model)?;
        self.carts.save(&stored).await?;

        tracing::debug!(customer = %customer, model = %model, total = %stored.cart.total, "removed from cart");
        Ok(())
    }

    /// Remove every line from the unpaid cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CartNotFound` without an unpaid cart.
    pub async fn clear_current(&self, customer: &Username) -> Result<(), DomainError> {
        let mut stored = self.require_unpaid(customer).await?;
        stored.cart.clear();
        self.carts.save(&stored).await?;

        tracing::info!(customer = %customer, "cart cleared");
        Ok(())
    }

    /// Every cart of every customer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Cart>, DomainError> {
        Ok(self.carts.list_all().await?)
    }

    /// Delete every cart.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Repository` if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, DomainError> {
        let deleted = self.carts.delete_all().await?;
        tracing::info!(deleted, "all carts deleted");
        Ok(deleted)
    }

    async fn require_unpaid(&self, customer: &Username) -> Result<StoredCart, DomainError> {
        self.carts
            .find_unpaid(customer)
            .await?
            .ok_or(DomainError::CartNotFound)
    }

    async fn require_product(&self, model: &ProductModel) -> Result<Product, DomainError> {
        self.products
            .get(model)
            .await?
            .ok_or(DomainError::ProductNotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::create_test_pool;
    use crate::services::auth::{AuthService, Registration};
    use crate::services::products::{NewProductInput, ProductService};

    async fn setup() -> (SqlitePool, Username) {
        let pool = create_test_pool().await.unwrap();
        let user = AuthService::new(&pool)
            .register(Registration {
                username: "mario",
                name: "Mario",
                surname: "Rossi",
                password: "secret",
                role: "Customer",
            })
            .await
            .unwrap();

        let products = ProductService::new(&pool);
        for (model, quantity, price) in [("iPhone13", 2, 799.0), ("XPS13", 1, 1299.5)] {
            products
                .register(NewProductInput {
                    model,
                    category: "Smartphone",
                    quantity,
                    details: None,
                    selling_price: price,
                    arrival_date: Some("2024-01-01"),
                })
                .await
                .unwrap();
        }
        (pool, user.username)
    }

    #[tokio::test]
    async fn test_current_without_cart_is_empty_and_not_created() {
        let (pool, mario) = setup().await;
        let service = CartService::new(&pool);

        let cart = service.current(&mario).await.unwrap();
        assert!(cart.is_empty());
        assert!(!cart.paid);
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_units() {
        let (pool, mario) = setup().await;
        let service = CartService::new(&pool);

        service.add(&mario, "iPhone13").await.unwrap();
        service.add(&mario, "iPhone13").await.unwrap();
        service.add(&mario, "XPS13").await.unwrap();

        let cart = service.current(&mario).await.unwrap();
        assert_eq!(cart.products.len(), 2);
        assert_eq!(cart.total, Decimal::new(289_750, 2));

        service.remove_unit(&mario, "iPhone13").await.unwrap();
        let cart = service.current(&mario).await.unwrap();
        assert_eq!(cart.products[0].quantity, 1);
        assert_eq!(cart.total, Decimal::new(209_850, 2));

        assert!(matches!(
            service.add(&mario, "Pixel8").await,
            Err(DomainError::ProductNotFound)
        ));
    }

    #[tokio::test]
    async fn test_remove_unit_error_order() {
        let (pool, mario) = setup().await;
        let service = CartService::new(&pool);

        assert!(matches!(
            service.remove_unit(&mario, "iPhone13").await,
            Err(DomainError::CartNotFound)
        ));

        service.add(&mario, "iPhone13").await.unwrap();
        assert!(matches!(
            service.remove_unit(&mario, "Pixel8").await,
            Err(DomainError::ProductNotFound)
        ));
        assert!(matches!(
            service.remove_unit(&mario, "XPS13").await,
            Err(DomainError::ProductNotInCart)
        ));

        service.remove_unit(&mario, "iPhone13").await.unwrap();
        assert!(matches!(
            service.remove_unit(&mario, "iPhone13").await,
            Err(DomainError::CartNotFound)
        ));
    }

    #[tokio::test]
    async fn test_checkout() {
        let (pool, mario) = setup().await;
        let service = CartService::new(&pool);

        assert!(matches!(
            service.checkout(&mario).await,
            Err(DomainError::CartNotFound)
        ));

        service.add(&mario, "XPS13").await.unwrap();
        service.add(&mario, "XPS13").await.unwrap();
        assert!(matches!(
            service.checkout(&mario).await,
            Err(DomainError::LowProductStock)
        ));

        service.remove_unit(&mario, "XPS13").await.unwrap();
        service.checkout(&mario).await.unwrap();

        let history = service.history(&mario).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].paid);
        assert_eq!(history[0].payment_date, Some(today()));
        assert!(service.current(&mario).await.unwrap().is_empty());

        assert!(matches!(
            service.add(&mario, "XPS13").await,
            Err(DomainError::EmptyProductStock)
        ));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let (pool, mario) = setup().await;
        let service = CartService::new(&pool);

        service.add(&mario, "iPhone13").await.unwrap();
        service.clear_current(&mario).await.unwrap();
        assert!(matches!(
            service.checkout(&mario).await,
            Err(DomainError::EmptyCart)
        ));
    }
}
