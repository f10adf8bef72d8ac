//! # Seed Data Generator
//!
//! Populates a database with sample purchases and sales for development.
//!
//! ## Usage
//! ```bash
//! # 60 sales for the given owner (default)
//! cargo run -p brownie-db --bin seed -- --owner 11111111-1111-4111-8111-111111111111
//!
//! # Write unowned rows to exercise the legacy migration prompt
//! cargo run -p brownie-db --bin seed -- --legacy --count 20
//!
//! # Specify database path
//! cargo run -p brownie-db --bin seed -- --db ./data/brownie.db
//! ```
//!
//! ## Generated Data
//! - One purchase of 50 brownies per week, R$ 2,80 - R$ 3,40 each
//! - Sales spread over the last 90 days to a small set of regulars,
//!   with the occasional lowercase spelling of a name
//! - Customers recomputed from the generated sales

use chrono::{Duration, Utc};
use std::env;

use brownie_core::customers::recompute_customers;
use brownie_core::{
    BrownieType, Money, OwnerId, PaymentMethod, Purchase, PurchaseInput, Sale, SaleInput,
    ValidationError,
};
use brownie_db::{Database, DbConfig};

/// Regular customers, some typed two ways on purpose.
const CUSTOMERS: &[&str] = &[
    "Maria Silva",
    "maria silva",
    "João Pereira",
    "Ana Costa",
    "Ana",
    "ana",
    "Carlos Souza",
    "Fernanda Lima",
    "Dona Cida",
    "Padaria Central",
];

const SUPPLIERS: &[&str] = &["Atacadão", "Confeitaria da Vila", "Produção própria"];

/// Unit prices in centavos.
const PRICES: &[i64] = &[700, 800, 800, 900, 1000];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./brownie_dev.db");
    let mut owner: Option<OwnerId> = None;
    let mut legacy = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner = Some(OwnerId::parse(&args[i + 1])?);
                    i += 1;
                }
            }
            "--legacy" => legacy = true,
            "--help" | "-h" => {
                println!("Brownie Book Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>     Number of sales to generate (default: 60)");
                println!("  -d, --db <PATH>     Database file path (default: ./brownie_dev.db)");
                println!("  -o, --owner <UUID>  Owner to seed for");
                println!("      --legacy        Write unowned (legacy) rows instead");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    if owner.is_none() && !legacy {
        eprintln!("Either --owner <UUID> or --legacy is required (see --help)");
        std::process::exit(2);
    }
    let owner = if legacy { None } else { owner };

    println!("🍫 Brownie Book Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", count);
    match &owner {
        Some(owner) => println!("Owner:    {}", owner),
        None => println!("Owner:    (legacy)"),
    }
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.sales().count(owner.as_ref()).await?;
    if existing > 0 {
        println!("⚠ Database already has {} sales for this owner", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let now = Utc::now();
    let today = now.date_naive();

    // Purchases: one batch a week over the last 13 weeks.
    let mut purchases = 0;
    for week in 0..13i64 {
        let purchase = generate_purchase(week as usize, today - Duration::weeks(12 - week), now);
        db.purchases().insert(owner.as_ref(), &purchase).await?;
        purchases += 1;
    }
    println!("✓ Generated {} purchases", purchases);

    // Sales: spread over the last 90 days, recorded in date order.
    let mut sales = Vec::with_capacity(count);
    for n in 0..count {
        let days_ago = 90 - (n * 90 / count.max(1)) as i64;
        let recorded = now - Duration::days(days_ago) + Duration::seconds(n as i64);
        let sale = generate_sale(n, today - Duration::days(days_ago), recorded)?;

        if let Err(e) = db.sales().insert(owner.as_ref(), &sale).await {
            eprintln!("Failed to insert sale {}: {}", sale.id, e);
            continue;
        }
        sales.push(sale);
    }
    println!("✓ Generated {} sales", sales.len());

    let customers = recompute_customers(&[], &sales);
    for customer in &customers {
        db.customers().insert(owner.as_ref(), customer).await?;
    }
    println!("✓ Derived {} customers", customers.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn generate_purchase(
    seed: usize,
    date: chrono::NaiveDate,
    recorded: chrono::DateTime<Utc>,
) -> Purchase {
    // R$ 2,80 - R$ 3,40 per brownie, 50 per batch
    let unit_cost = 280 + ((seed * 13) % 61) as i64;

    Purchase::new(
        PurchaseInput {
            date,
            quantity: 50,
            total_value: Money::from_cents(unit_cost * 50),
            supplier: Some(SUPPLIERS[seed % SUPPLIERS.len()].to_string()),
            notes: None,
        },
        recorded,
    )
}

fn generate_sale(
    seed: usize,
    date: chrono::NaiveDate,
    recorded: chrono::DateTime<Utc>,
) -> Result<Sale, ValidationError> {
    let payment_method = PaymentMethod::ALL[seed % PaymentMethod::ALL.len()];
    let brownie_type = BrownieType::ALL[(seed / 3) % BrownieType::ALL.len()];

    Sale::new(
        SaleInput {
            date,
            customer_name: CUSTOMERS[(seed * 7) % CUSTOMERS.len()].to_string(),
            quantity: 1 + (seed % 6) as i64,
            unit_price: Money::from_cents(PRICES[seed % PRICES.len()]),
            payment_method,
            brownie_type,
            notes: None,
        },
        recorded,
    )
}
