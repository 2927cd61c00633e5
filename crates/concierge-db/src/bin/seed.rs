//! # Seed Data Generator
//!
//! Populates the database with development customers and requests.
//!
//! ## Usage
//! ```bash
//! # Default database path (./concierge.db)
//! cargo run -p concierge-db --bin seed
//!
//! # Specify database path
//! cargo run -p concierge-db --bin seed -- --db ./data/concierge.db
//!
//! # Generate a custom number of requests
//! cargo run -p concierge-db --bin seed -- --count 25
//! ```
//!
//! Each generated request carries 1-4 items across the merchandise
//! categories with plausible park prices.

use std::env;

use chrono::Utc;
use uuid::Uuid;

use concierge_core::{ItemCategory, RequestItem, RequestItemStatus};
use concierge_db::repository::customer::new_customer;
use concierge_db::repository::request::new_request;
use concierge_db::{Database, DbConfig};

/// Sample shoppers for seed data.
const CUSTOMERS: &[(&str, &str)] = &[
    ("Alice Park", "alice@example.com"),
    ("Bob Ride", "bob@example.com"),
    ("Carol Coaster", "carol@example.com"),
    ("Dan Drop", "dan@example.com"),
    ("Erin Ears", "erin@example.com"),
];

/// Sample merchandise by category: (category, name, typical price cents).
const CATALOG: &[(ItemCategory, &str, i64)] = &[
    (ItemCategory::Apparel, "Spirit Jersey", 7999),
    (ItemCategory::Apparel, "Castle Tee", 2999),
    (ItemCategory::Plush, "Figment Plush", 3499),
    (ItemCategory::Plush, "Orange Bird Plush", 2999),
    (ItemCategory::Toys, "Droid Builder Kit", 11999),
    (ItemCategory::Collectibles, "Anniversary Pin Set", 4999),
    (ItemCategory::Collectibles, "Light-Up Ears", 3999),
    (ItemCategory::Food, "Caramel Corn Tin", 1899),
    (ItemCategory::Media, "Park Icons Art Print", 4500),
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let db_path = arg_value(&args, "--db").unwrap_or_else(|| "./concierge.db".to_string());
    let count: usize = arg_value(&args, "--count")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    println!("Seeding {count} requests into {db_path}");

    let db = match Database::new(DbConfig::new(&db_path)).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = seed(&db, count).await {
        eprintln!("Seed failed: {e}");
        std::process::exit(1);
    }

    let customers = db.customers().count().await.unwrap_or(0);
    println!("Done. {customers} customers in database.");
}

async fn seed(db: &Database, count: usize) -> Result<(), concierge_db::DbError> {
    let mut customer_ids = Vec::new();

    for (name, email) in CUSTOMERS {
        match db.customers().get_by_email(email).await? {
            Some(existing) => customer_ids.push(existing.id),
            None => {
                let customer = new_customer(name, email);
                db.customers().insert(&customer).await?;
                customer_ids.push(customer.id);
            }
        }
    }

    for i in 0..count {
        let customer_id = &customer_ids[i % customer_ids.len()];
        let request = new_request(
            customer_id,
            &format!("Park run #{}", i + 1),
            Some("Seeded request".to_string()),
        );

        let item_count = 1 + i % 4;
        let now = Utc::now();
        let items: Vec<RequestItem> = (0..item_count)
            .map(|j| {
                let (category, name, price) = CATALOG[(i + j) % CATALOG.len()];
                RequestItem {
                    id: Uuid::new_v4().to_string(),
                    request_id: request.id.clone(),
                    name: name.to_string(),
                    details: None,
                    quantity: 1 + (j as i64 % 2),
                    category,
                    status: RequestItemStatus::Pending,
                    estimated_price_cents: Some(price),
                    found_price_cents: None,
                    substitution_note: None,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();

        db.requests().create(&request, &items).await?;
    }

    Ok(())
}

/// Returns the value following a `--flag` argument, if present.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
