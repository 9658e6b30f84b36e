//! Cart repository for database operations.
//!
//! Cart lines are stored as a JSON array in `products_in_cart`; the running
//! total is stored as decimal text.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};

use ezelectronics_core::{Cart, ProductInCart, Username};

use super::RepositoryError;

const CART_COLUMNS: &str = "id, customer, paid, payment_date, total, products_in_cart";

/// A cart as stored, before validation.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i64,
    customer: String,
    paid: bool,
    payment_date: Option<NaiveDate>,
    total: String,
    products_in_cart: String,
}

/// A cart together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCart {
    /// Row id.
    pub id: i64,
    /// Cart contents.
    pub cart: Cart,
}

impl TryFrom<CartRow> for StoredCart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let customer = Username::parse(&row.customer).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer on cart {}: {e}", row.id))
        })?;
        let total = Decimal::from_str(&row.total).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid total on cart {}: {e}", row.id))
        })?;
        let products: Vec<ProductInCart> =
            serde_json::from_str(&row.products_in_cart).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid lines on cart {}: {e}", row.id))
            })?;

        Ok(Self {
            id: row.id,
            cart: Cart {
                customer,
                paid: row.paid,
                payment_date: row.payment_date,
                total,
                products,
            },
        })
    }
}

fn encode_lines(cart: &Cart) -> Result<String, RepositoryError> {
    serde_json::to_string(&cart.products)
        .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode cart lines: {e}")))
}

/// Load every unpaid cart.
pub(super) async fn load_unpaid_carts(
    conn: &mut SqliteConnection,
) -> Result<Vec<StoredCart>, RepositoryError> {
    let rows: Vec<CartRow> =
        sqlx::query_as(&format!("SELECT {CART_COLUMNS} FROM carts WHERE paid = 0"))
            .fetch_all(&mut *conn)
            .await?;

    rows.into_iter().map(StoredCart::try_from).collect()
}

/// Write a cart's lines and total back to its row.
pub(super) async fn save_cart_lines(
    conn: &mut SqliteConnection,
    stored: &StoredCart,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE carts SET total = ?, products_in_cart = ? WHERE id = ?")
        .bind(stored.cart.total.to_string())
        .bind(encode_lines(&stored.cart)?)
        .bind(stored.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the customer's unpaid cart, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the customer has more than
    /// one unpaid cart or the stored cart is invalid.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_unpaid(
        &self,
        customer: &Username,
    ) -> Result<Option<StoredCart>, RepositoryError> {
        let mut rows: Vec<CartRow> = sqlx::query_as(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE customer = ? AND paid = 0"
        ))
        .bind(customer.as_str())
        .fetch_all(self.pool)
        .await?;

        if rows.len() > 1 {
            return Err(RepositoryError::DataCorruption(format!(
                "{customer} has {} unpaid carts",
                rows.len()
            )));
        }

        rows.pop().map(StoredCart::try_from).transpose()
    }

    /// Create an empty unpaid cart for the customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_unpaid(&self, customer: &Username) -> Result<StoredCart, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO carts (customer, paid, payment_date, total, products_in_cart)
            VALUES (?, 0, NULL, '0', '[]')
            RETURNING id
            ",
        )
        .bind(customer.as_str())
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(customer = %customer, cart_id = id, "cart created");
        Ok(StoredCart {
            id,
            cart: Cart::empty(customer.clone()),
        })
    }

    /// Persist the lines and total of a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn save(&self, stored: &StoredCart) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        save_cart_lines(&mut conn, stored).await
    }

    /// Persist a cart already marked paid with [`Cart::mark_paid`], taking
    /// every line out of stock.
    ///
    /// Runs in one transaction. A line whose product no longer has enough
    /// units aborts the whole checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the cart is not marked paid or
    /// naming the first line that could not be fulfilled.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn checkout(&self, stored: &StoredCart) -> Result<(), RepositoryError> {
        let Some(payment_date) = stored.cart.payment_date.filter(|_| stored.cart.paid) else {
            return Err(RepositoryError::Conflict(format!(
                "cart {} is not marked paid",
                stored.id
            )));
        };

        let mut tx = self.pool.begin().await?;

        for line in &stored.cart.products {
            let updated = sqlx::query(
                "UPDATE products SET quantity = quantity - ? WHERE model = ? AND quantity >= ?",
            )
            .bind(i64::from(line.quantity))
            .bind(line.model.as_str())
            .bind(i64::from(line.quantity))
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if updated == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "not enough stock for {}",
                    line.model
                )));
            }
        }

        sqlx::query("UPDATE carts SET paid = 1, payment_date = ? WHERE id = ? AND paid = 0")
            .bind(payment_date)
            .bind(stored.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Paid carts of a customer, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn paid_history(&self, customer: &Username) -> Result<Vec<Cart>, RepositoryError> {
        let rows: Vec<CartRow> = sqlx::query_as(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE customer = ? AND paid = 1 ORDER BY id"
        ))
        .bind(customer.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| StoredCart::try_from(row).map(|s| s.cart))
            .collect()
    }

    /// Every cart, paid or not, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Cart>, RepositoryError> {
        let rows: Vec<CartRow> =
            sqlx::query_as(&format!("SELECT {CART_COLUMNS} FROM carts ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter()
            .map(|row| StoredCart::try_from(row).map(|s| s.cart))
            .collect()
    }

    /// Delete every cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM carts").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}
