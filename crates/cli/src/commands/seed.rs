//! Catalog seeding command.
//!
//! Inserts a small sample catalog for local development. Refuses to touch
//! a catalog that already has products.

use rust_decimal::Decimal;

use super::CliError;

struct SeedProduct {
    name: &'static str,
    price: Decimal,
    rating: Decimal,
    description: &'static str,
    category: &'static str,
    stock: i32,
}

fn sample_catalog() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Neem Oil Concentrate 250ml",
            price: Decimal::new(34900, 2),
            rating: Decimal::new(45, 1),
            description: "Cold-pressed neem oil for aphid and mite control.",
            category: "Pesticides",
            stock: 40,
        },
        SeedProduct {
            name: "Vermicompost 5kg",
            price: Decimal::new(19900, 2),
            rating: Decimal::new(47, 1),
            description: "Organic vermicompost for soil enrichment.",
            category: "Fertilizers",
            stock: 60,
        },
        SeedProduct {
            name: "Drip Irrigation Starter Kit",
            price: Decimal::new(129900, 2),
            rating: Decimal::new(43, 1),
            description: "Covers up to 50 plants; includes emitters and tubing.",
            category: "Equipment",
            stock: 15,
        },
        SeedProduct {
            name: "Hybrid Tomato Seeds 50g",
            price: Decimal::new(24900, 2),
            rating: Decimal::new(42, 1),
            description: "Disease-resistant hybrid tomato seeds.",
            category: "Seeds",
            stock: 100,
        },
        SeedProduct {
            name: "Soil pH Test Kit",
            price: Decimal::new(44900, 2),
            rating: Decimal::new(40, 1),
            description: "Quick colorimetric soil pH test, 25 uses.",
            category: "Equipment",
            stock: 25,
        },
    ]
}

/// Seed the catalog with sample products.
///
/// # Errors
///
/// Returns `CliError::Database` if the database is unreachable or any
/// insert fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::warn!("Catalog already has {existing} products; not seeding");
        return Ok(());
    }

    let catalog = sample_catalog();
    for product in &catalog {
        sqlx::query(
            "INSERT INTO product (name, price, rating, description, category, stock) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(product.name)
        .bind(product.price)
        .bind(product.rating)
        .bind(product.description)
        .bind(product.category)
        .bind(product.stock)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeded {} products", catalog.len());
    Ok(())
}
