//! Demo catalog seeding.
//!
//! Inserts the demo seafood products, updating price and availability
//! if a product code already exists.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::CommandError;

struct DemoProduct {
    code: &'static str,
    name: &'static str,
    price_per_kg: Decimal,
    is_weighted: bool,
    min_weight_kg: Option<Decimal>,
}

fn demo_catalog() -> Vec<DemoProduct> {
    vec![
        DemoProduct {
            code: "salmon",
            name: "Филе Атлантического лосося",
            price_per_kg: dec!(1780),
            is_weighted: true,
            min_weight_kg: Some(dec!(0.5)),
        },
        DemoProduct {
            code: "seabass",
            name: "Сибас охлаждённый",
            price_per_kg: dec!(1300),
            is_weighted: true,
            min_weight_kg: Some(dec!(0.5)),
        },
        DemoProduct {
            code: "shrimp",
            name: "Креветки тигровые",
            price_per_kg: dec!(2500),
            is_weighted: true,
            min_weight_kg: Some(dec!(0.5)),
        },
    ]
}

pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;
    let catalog = demo_catalog();

    tracing::info!("Seeding {} demo products...", catalog.len());
    for product in &catalog {
        sqlx::query(
            r"
            INSERT INTO products (code, name, price_per_kg, is_available, is_weighted, min_weight_kg)
            VALUES ($1, $2, $3, TRUE, $4, $5)
            ON CONFLICT (code) DO UPDATE SET
                name = EXCLUDED.name,
                price_per_kg = EXCLUDED.price_per_kg,
                is_available = TRUE,
                is_weighted = EXCLUDED.is_weighted,
                min_weight_kg = EXCLUDED.min_weight_kg
            ",
        )
        .bind(product.code)
        .bind(product.name)
        .bind(product.price_per_kg)
        .bind(product.is_weighted)
        .bind(product.min_weight_kg)
        .execute(&pool)
        .await?;
        tracing::info!("  {} - {} ({} ₽/кг)", product.code, product.name, product.price_per_kg);
    }

    tracing::info!("Demo catalog seeded");
    Ok(())
}
