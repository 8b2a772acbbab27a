//! # Seed Data Generator
//!
//! Populates the database with sample apparel-store data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p storebill-db --bin seed
//!
//! # Specify database path
//! cargo run -p storebill-db --bin seed -- --db ./data/store_pos.db
//! ```
//!
//! ## Generated Data
//! - A small apparel catalog across categories (tops, bottoms, accessories)
//! - A handful of customers with phone numbers
//! - One supplier ledger with opening entries
//!
//! Seeding is skipped when products already exist, so re-running is safe.

use std::env;

use storebill_db::repository::customer::CustomerInput;
use storebill_db::repository::product::ProductInput;
use storebill_db::{Database, DbConfig};

/// (name, category, price, cost, stock, tax %, barcode)
const PRODUCTS: &[(&str, &str, f64, f64, i64, f64, &str)] = &[
    ("Linen Shirt", "Tops", 49.0, 22.0, 24, 18.0, "8901001000011"),
    ("Plain Tee", "Tops", 15.0, 6.0, 80, 18.0, "8901001000028"),
    ("Denim Jacket", "Outerwear", 89.0, 45.0, 12, 18.0, "8901001000035"),
    ("Slim Jeans", "Bottoms", 59.0, 28.0, 30, 18.0, "8901001000042"),
    ("Chino Shorts", "Bottoms", 35.0, 16.0, 18, 18.0, "8901001000059"),
    ("Wool Scarf", "Accessories", 25.0, 10.0, 40, 12.0, "8901001000066"),
    ("Leather Belt", "Accessories", 29.0, 12.0, 22, 12.0, "8901001000073"),
    ("Canvas Tote", "Accessories", 19.0, 7.0, 6, 12.0, "8901001000080"),
    ("Summer Dress", "Dresses", 69.0, 32.0, 14, 18.0, "8901001000097"),
    ("Rain Poncho", "Outerwear", 22.0, 9.0, 5, 18.0, "8901001000103"),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Priya Sharma", "9876543210"),
    ("Daniel Okafor", "9876501234"),
    ("Mei Lin", "9876512345"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./store_pos.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storebill Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./store_pos.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storebill Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied, defaults seeded");

    let existing = db.products().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");
    for (name, category, price, cost, stock, tax, barcode) in PRODUCTS {
        db.products()
            .create(ProductInput {
                name: name.to_string(),
                category: Some(category.to_string()),
                price: *price,
                cost_price: *cost,
                stock: *stock,
                tax_rate: *tax,
                barcode: Some(barcode.to_string()),
                description: None,
            })
            .await?;
    }
    println!("  {} products", PRODUCTS.len());

    println!("Seeding customers...");
    for (name, phone) in CUSTOMERS {
        db.customers()
            .create(CustomerInput {
                name: name.to_string(),
                phone: Some(phone.to_string()),
                email: None,
                address: None,
            })
            .await?;
    }
    println!("  {} customers", CUSTOMERS.len());

    println!("Seeding ledgers...");
    let ledger = db.ledgers().create("Wholesale Supplier").await?;
    db.ledgers()
        .add_entry(
            ledger.id,
            "2026-08-01".parse()?,
            "Autumn stock order",
            1850.0,
            1000.0,
        )
        .await?;
    db.ledgers()
        .add_entry(
            ledger.id,
            "2026-08-18".parse()?,
            "Accessories restock",
            420.0,
            420.0,
        )
        .await?;
    println!("  1 ledger, 2 entries");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
