//! # Seed Data Generator
//!
//! Loads a demo catalog, customers and opening stock.
//!
//! ## Usage
//! ```bash
//! cargo run -p distrib-db --bin seed
//! cargo run -p distrib-db --bin seed -- --db ./data/distrib.db
//! ```

use anyhow::{bail, Context};
use std::env;

use distrib_core::{Customer, Product};
use distrib_db::{Database, DbConfig};

/// (code, name, price in cents, opening stock, min stock)
const PRODUCTS: &[(&str, &str, i64, i64, i64)] = &[
    ("LIQ001", "Liquidificador Industrial 2L", 29999, 50, 10),
    ("PAN001", "Panela de Pressão 10L", 18990, 30, 10),
    ("FRI001", "Fritadeira Elétrica 5L", 45000, 20, 10),
    ("MIC001", "Microondas 30L", 38000, 15, 10),
    ("CX001", "Caixa de Papelão 30x30x30cm", 550, 500, 20),
    ("SAC001", "Sacola Plástica Reforçada P", 25, 2000, 500),
    ("PAP001", "Papel Kraft 80g - Bobina", 4500, 100, 20),
    ("FIT001", "Fita Adesiva Transparente", 890, 200, 20),
    ("SHA001", "Shampoo Anticaspa 400ml", 1290, 150, 30),
    ("CRE001", "Creme Dental Branqueador", 850, 200, 30),
    ("SAB001", "Sabonete Líquido 250ml", 675, 300, 30),
];

/// (name, document)
const CUSTOMERS: &[(&str, Option<&str>)] = &[
    ("Maria Silva", Some("123.456.789-00")),
    ("Empresa ABC Ltda", Some("12.345.678/0001-90")),
    ("João Santos", None),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./distrib.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                let Some(path) = args.get(i + 1) else {
                    bail!("--db requires a path");
                };
                db_path = path.clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Distrib Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./distrib.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    println!("Distrib Seed Data Generator");
    println!("===========================");
    println!("Database: {db_path}");

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    let existing = db.catalog().count_products().await?;
    if existing > 0 {
        println!("Database already has {existing} products, skipping seed.");
        return Ok(());
    }

    for (code, name, price_cents, stock, min_stock) in PRODUCTS {
        let product = db
            .catalog()
            .insert_product(&Product {
                id: String::new(),
                code: code.to_string(),
                name: name.to_string(),
                price_cents: *price_cents,
                is_active: true,
            })
            .await
            .with_context(|| format!("inserting product {code}"))?;

        db.inventory()
            .set_stock(&product.id, *stock, *min_stock, None)
            .await
            .with_context(|| format!("setting stock for {code}"))?;
    }
    println!("Inserted {} products with opening stock", PRODUCTS.len());

    for (name, document) in CUSTOMERS {
        db.catalog()
            .insert_customer(&Customer {
                id: String::new(),
                name: name.to_string(),
                document: document.map(str::to_string),
                is_active: true,
            })
            .await
            .with_context(|| format!("inserting customer {name}"))?;
    }
    println!("Inserted {} customers", CUSTOMERS.len());

    db.close().await;
    println!("Seed complete.");
    Ok(())
}
