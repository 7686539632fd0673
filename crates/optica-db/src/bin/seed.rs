//! # Seed Data Generator
//!
//! Populates a store with a demo optical catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed store "store-1" in ./optica_dev.db
//! cargo run -p optica-db --bin seed
//!
//! # Another store, custom tax rate
//! cargo run -p optica-db --bin seed -- --store downtown --tax 8.25
//!
//! # Specify database path
//! cargo run -p optica-db --bin seed -- --db ./data/optica.db
//! ```
//!
//! ## Generated Catalog
//! - Frames and sunglasses, one entry per brand and model
//! - Accessories (cases, cloths, solutions)
//! - Contact lenses across a range of powers
//!
//! Stock cycles through 0..=24 so some entries start below their minimum.

use chrono::Utc;
use optica_core::{ContactLens, Money, Product, TaxRate};
use optica_db::{Database, DbConfig};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use uuid::Uuid;

/// (category, brands, models, base price in cents)
const PRODUCT_LINES: &[(&str, &[&str], &[&str], i64)] = &[
    (
        "frames",
        &["Ray-Ban", "Oakley", "Vogue", "Persol"],
        &["Classic", "Round", "Aviator", "Square", "Cat Eye"],
        8999,
    ),
    (
        "sunglasses",
        &["Ray-Ban", "Oakley", "Carrera"],
        &["Wayfarer", "Sport", "Polarized"],
        12999,
    ),
    (
        "accessories",
        &["Optica"],
        &["Hard Case", "Microfiber Cloth", "Lens Spray", "Cord", "Multipurpose Solution"],
        599,
    ),
];

/// (brand, lens type, base curve, diameter, price in cents)
const LENS_LINES: &[(&str, &str, &str, &str, i64)] = &[
    ("Acuvue Oasys", "biweekly", "8.4", "14.0", 3899),
    ("Air Optix", "monthly", "8.6", "14.2", 4299),
    ("Dailies Total1", "daily", "8.5", "14.1", 5499),
];

const POWERS: &[&str] = &["-0.50", "-1.00", "-1.75", "-2.50", "-3.25", "+1.00", "+2.00"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut store_id = String::from("store-1");
    let mut db_path = String::from("./optica_dev.db");
    let mut tax_percent = Decimal::from(16);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--store" | "-s" => {
                if i + 1 < args.len() {
                    store_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tax" | "-t" => {
                if i + 1 < args.len() {
                    tax_percent = Decimal::from_str(&args[i + 1]).unwrap_or(tax_percent);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Optica Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --store <ID>     Store to seed (default: store-1)");
                println!("  -d, --db <PATH>      Database file path (default: ./optica_dev.db)");
                println!("  -t, --tax <PERCENT>  Store tax rate (default: 16)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Optica Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Store:    {}", store_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count(&store_id).await?;
    if existing > 0 {
        println!("⚠ Store already has {} catalog entries", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let rate = TaxRate::from_percent(tax_percent);
    db.settings().set_tax_rate(&store_id, rate).await?;
    println!("✓ Tax rate set to {}", rate);

    println!();
    println!("Generating catalog...");

    let mut seed = 0usize;
    let mut products = 0;
    for (category, brands, models, base_cents) in PRODUCT_LINES {
        for brand in brands.iter() {
            for model in models.iter() {
                let product = generate_product(&store_id, category, brand, model, *base_cents, seed);
                if let Err(e) = db.catalog().upsert_product(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }
                products += 1;
                seed += 1;
            }
        }
    }

    let mut lenses = 0;
    for line in LENS_LINES {
        for power in POWERS {
            let lens = generate_lens(&store_id, line, power, seed);
            if let Err(e) = db.catalog().upsert_contact_lens(&lens).await {
                eprintln!("Failed to insert {}: {}", lens.name, e);
                continue;
            }
            lenses += 1;
            seed += 1;
        }
    }

    println!("  Products:       {}", products);
    println!("  Contact lenses: {}", lenses);

    let low = db.catalog().load(&store_id).await?.low_stock().len();
    println!("  Below minimum:  {}", low);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one frame, sunglass or accessory.
fn generate_product(
    store_id: &str,
    category: &str,
    brand: &str,
    model: &str,
    base_cents: i64,
    seed: usize,
) -> Product {
    let now = Utc::now();

    // Spread prices up to +$40 over the base
    let price_cents = base_cents + ((seed * 137) % 4000) as i64;
    // Cost is 40-60% of price
    let cost_cents = price_cents * (40 + (seed % 20) as i64) / 100;

    Product {
        id: Uuid::new_v4().to_string(),
        store_id: store_id.to_string(),
        name: format!("{} {}", brand, model),
        brand: Some(brand.to_string()),
        category: Some(category.to_string()),
        sku: Some(format!(
            "{}-{:04}",
            category[..3].to_uppercase(),
            seed
        )),
        description: None,
        price: Money::new(Decimal::new(price_cents, 2)),
        cost: Money::new(Decimal::new(cost_cents, 2)),
        stock: (seed % 25) as i64,
        min_stock: 3,
        created_at: now,
        updated_at: now,
    }
}

/// Generates one contact lens SKU for a given power.
fn generate_lens(
    store_id: &str,
    (brand, lens_type, base_curve, diameter, price_cents): &(&str, &str, &str, &str, i64),
    power: &str,
    seed: usize,
) -> ContactLens {
    let now = Utc::now();

    ContactLens {
        id: Uuid::new_v4().to_string(),
        store_id: store_id.to_string(),
        name: format!("{} {}", brand, power),
        brand: Some(brand.to_string()),
        lens_type: Some(lens_type.to_string()),
        power: Some(power.to_string()),
        base_curve: Some(base_curve.to_string()),
        diameter: Some(diameter.to_string()),
        price: Money::new(Decimal::new(*price_cents, 2)),
        cost: Money::new(Decimal::new(price_cents / 2, 2)),
        stock: (seed % 25) as i64,
        min_stock: 6,
        created_at: now,
        updated_at: now,
    }
}
