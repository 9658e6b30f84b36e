//! Seed the database with a demo catalog.
//!
//! Running it twice is harmless: models that already exist are skipped.

use sqlx::SqlitePool;
use tracing::{info, warn};

use ezelectronics_server::services::{DomainError, NewProductInput, ProductService};

/// model, category, quantity, price, details
const DEMO_PRODUCTS: &[(&str, &str, i64, f64, &str)] = &[
    ("iPhone13", "Smartphone", 10, 799.0, "6.1-inch display, 128GB"),
    ("Pixel8", "Smartphone", 8, 699.0, "6.2-inch display, 128GB"),
    ("GalaxyS23", "Smartphone", 5, 849.99, "6.1-inch display, 256GB"),
    ("XPS13", "Laptop", 4, 1299.0, "13.4-inch, 16GB RAM"),
    ("MacBookAir", "Laptop", 6, 1199.0, "13.6-inch, M2, 8GB RAM"),
    ("ThinkPadX1", "Laptop", 3, 1649.5, "14-inch, 32GB RAM"),
    ("WM-7000", "Appliance", 2, 549.0, "Front-load washing machine, 8kg"),
    ("FR-310", "Appliance", 3, 899.0, "Fridge freezer, 310L"),
];

/// Summary of a seeding run.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Insert every demo product that is not already present.
///
/// # Errors
///
/// Returns an error if the database cannot be reached or an insert fails
/// for a reason other than the model already existing.
pub async fn demo_catalog() -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    Ok(seed_products(&pool).await?)
}

async fn seed_products(pool: &SqlitePool) -> Result<SeedSummary, DomainError> {
    let products = ProductService::new(pool);
    let mut summary = SeedSummary::default();

    for &(model, category, quantity, selling_price, details) in DEMO_PRODUCTS {
        let result = products
            .register(NewProductInput {
                model,
                category,
                quantity,
                details: Some(details),
                selling_price,
                arrival_date: None,
            })
            .await;

        match result {
            Ok(_) => summary.inserted += 1,
            Err(DomainError::ProductAlreadyExists) => {
                warn!(model, "already exists, skipping");
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Seeding complete"
    );
    Ok(summary)
}
