//! # Seed Data Generator
//!
//! Populates the database with development data: categories, products with
//! and without variants, opening purchases, one sale and a few expenses.
//!
//! ## Usage
//! ```bash
//! # Default database (./balcao_dev.db)
//! cargo run -p balcao-db --bin seed
//!
//! # Specify database path
//! cargo run -p balcao-db --bin seed -- --db ./data/balcao.db
//! ```

use std::env;

use chrono::{Duration, Utc};
use tracing_subscriber::EnvFilter;

use balcao_core::{
    Money, MoveType, NewExpense, NewProduct, NewSale, NewStockMove, NewVariantSpec,
    PackagingRequest, SaleLine, SaleStatus,
};
use balcao_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./balcao_dev.db");

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
                println!("Balcão Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./balcao_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Balcão Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().list_rows().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let last_week = today - Duration::days(7);

    // Categories
    let roupas = db.categories().create("Roupas", true).await?;
    let embalagens = db.categories().create("Embalagens", true).await?;

    // Product with color variants, each with opening stock
    db.products()
        .create(NewProduct {
            sku: "CAM-BASICA".into(),
            name: "Camiseta Básica".into(),
            category_id: roupas,
            variant_attribute_name: Some("Cor".into()),
            brand: Some("Genérica".into()),
            cost_default: Money::from_cents(1200),
            price_default: Money::from_cents(3990),
            stock_min: 5,
            is_active: true,
            variants: vec![
                NewVariantSpec {
                    value: "Preto".into(),
                    sku: None,
                    initial_qty: 20,
                },
                NewVariantSpec {
                    value: "Branco".into(),
                    sku: None,
                    initial_qty: 15,
                },
            ],
        })
        .await?;

    // Single-variant product
    db.products()
        .create(NewProduct {
            sku: "BONE-TRUCKER".into(),
            name: "Boné Trucker".into(),
            category_id: roupas,
            variant_attribute_name: None,
            brand: None,
            cost_default: Money::from_cents(1800),
            price_default: Money::from_cents(5490),
            stock_min: 3,
            is_active: true,
            variants: vec![],
        })
        .await?;

    // Packaging supplies
    db.products()
        .create(NewProduct {
            sku: "CAIXA-P".into(),
            name: "Caixa P".into(),
            category_id: embalagens,
            variant_attribute_name: None,
            brand: None,
            cost_default: Money::from_cents(150),
            price_default: Money::zero(),
            stock_min: 10,
            is_active: true,
            variants: vec![],
        })
        .await?;

    println!("✓ Categories and products created");

    // Purchases drive the cost engine
    let bone = db
        .variants()
        .get_by_sku("BONE-TRUCKER")
        .await?
        .ok_or("BONE-TRUCKER variant missing")?;
    db.stock()
        .record_movement(NewStockMove::manual(
            last_week,
            bone.variant_id,
            MoveType::In,
            "COMPRA",
            10,
            Money::from_cents(1750),
        ))
        .await?;

    let caixa = db
        .variants()
        .get_by_sku("CAIXA-P")
        .await?
        .ok_or("CAIXA-P variant missing")?;
    db.stock()
        .record_movement(NewStockMove::manual(
            last_week,
            caixa.variant_id,
            MoveType::In,
            "COMPRA",
            50,
            Money::from_cents(150),
        ))
        .await?;

    println!("✓ Purchases recorded");

    // One sale with packaging
    let sale_id = db
        .sales()
        .create_sale(NewSale {
            sale_date: today,
            channel: "Shopee".into(),
            status: SaleStatus::AEnviar,
            order_ref: "PED-0001".into(),
            customer_name: "Cliente Exemplo".into(),
            notes: String::new(),
            lines: vec![
                SaleLine {
                    sku: "CAM-BASICA-PRETO".into(),
                    qty: 2,
                    unit_price: Money::from_cents(3990),
                    fees: Money::from_cents(450),
                    discount: Money::zero(),
                },
                SaleLine {
                    sku: "BONE-TRUCKER".into(),
                    qty: 1,
                    unit_price: Money::from_cents(5490),
                    fees: Money::zero(),
                    discount: Money::from_cents(500),
                },
            ],
            packaging: Some(PackagingRequest {
                volumes: 1,
                box_sku: Some("CAIXA-P".into()),
                envelope_sku: None,
            }),
        })
        .await?;
    println!("✓ Sale #{} created", sale_id);

    // Expenses
    db.expenses()
        .create(NewExpense {
            exp_date: today,
            category: "FRETE".into(),
            description: "Etiquetas de envio".into(),
            amount: Money::from_cents(1890),
            payment_method: "PIX".into(),
            notes: String::new(),
        })
        .await?;
    println!("✓ Expenses recorded");

    // Quick sanity report
    let overview = db.stock().stock_overview().await?;
    println!();
    println!("Stock overview ({} variants):", overview.len());
    for row in &overview {
        println!(
            "  {:<22} {:<10} stock {}",
            row.variant_sku, row.variant_value, row.stock
        );
    }

    let summary = db.reports().financial_summary(last_week, today).await?;
    println!();
    println!("Period summary:");
    println!("  revenue  {}", summary.revenue);
    println!("  profit   {}", summary.profit);
    println!("  expenses {}", summary.expenses);
    println!("  result   {}", summary.result);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
