//! CSV → SurrealDB ingestion
//! Loads the raw tables into the embedded store, warn-and-continue on bad
//! rows, then verifies the stored counts.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use csv::ReaderBuilder;
use fraudscope::db;
use fraudscope::models::{CustomerRow, DriverRow, MissingItemRow, OrderRow, ProductRow};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load raw CSV tables into the fraudscope store")]
struct Args {
    /// Directory holding orders.csv, drivers.csv, customers.csv,
    /// products.csv and missing_items.csv
    #[arg(long, default_value = "data/raw")]
    input: PathBuf,

    /// Store path
    #[arg(long, default_value = "data/fraudscope.db")]
    db_path: String,
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    let mut error_count = 0;
    for record in reader.deserialize() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                if error_count < 5 {
                    warn!("Skipping bad row in {:?}: {}", path, e);
                }
                error_count += 1;
            }
        }
    }
    if error_count > 0 {
        warn!("{} rows skipped in {:?}", error_count, path);
    }
    Ok(rows)
}

async fn count_table(db: &db::DbConn, table: &str) -> Result<Option<i64>> {
    let total: Option<i64> = db
        .query(format!("SELECT count() FROM {} GROUP ALL", table))
        .await?
        .take("count")?;
    Ok(total)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();

    info!("Connecting to SurrealDB at {}", args.db_path);
    let db = db::connect(&args.db_path).await?;

    info!("Initializing schema...");
    db::init_schema(&db).await?;

    let orders: Vec<OrderRow> = read_table(&args.input.join("orders.csv"))?;
    let drivers: Vec<DriverRow> = read_table(&args.input.join("drivers.csv"))?;
    let customers: Vec<CustomerRow> = read_table(&args.input.join("customers.csv"))?;
    let products: Vec<ProductRow> = read_table(&args.input.join("products.csv"))?;
    let missing: Vec<MissingItemRow> = read_table(&args.input.join("missing_items.csv"))?;

    info!(
        "Parsed {} orders, {} drivers, {} customers, {} products, {} missing-item reports",
        orders.len(),
        drivers.len(),
        customers.len(),
        products.len(),
        missing.len()
    );

    info!("Inserting drivers...");
    for d in &drivers {
        db.query("CREATE drivers SET driver_id = $driver_id, name = $name, age = $age")
            .bind(("driver_id", d.driver_id.clone()))
            .bind(("name", d.name.clone()))
            .bind(("age", d.age))
            .await?
            .check()?;
    }

    info!("Inserting customers...");
    for c in &customers {
        db.query(
            "CREATE customers SET customer_id = $customer_id, name = $name, age = $age, region = $region",
        )
        .bind(("customer_id", c.customer_id.clone()))
        .bind(("name", c.name.clone()))
        .bind(("age", c.age))
        .bind(("region", c.region.clone()))
        .await?
        .check()?;
    }

    info!("Inserting products...");
    for p in &products {
        db.query(
            "CREATE products SET product_id = $product_id, name = $name, category = $category, price = $price",
        )
        .bind(("product_id", p.product_id.clone()))
        .bind(("name", p.name.clone()))
        .bind(("category", p.category.clone()))
        .bind(("price", p.price))
        .await?
        .check()?;
    }

    info!("Inserting orders...");
    let mut order_count = 0;
    let mut error_count = 0;
    for (i, o) in orders.iter().enumerate() {
        let result = db
            .query(
                r#"
                CREATE orders CONTENT {
                    order_id: $order_id,
                    date: $date,
                    delivery_hour: $delivery_hour,
                    region: $region,
                    driver_id: $driver_id,
                    customer_id: $customer_id,
                    items_delivered: $items_delivered,
                    items_missing: $items_missing
                };
                "#,
            )
            .bind(("order_id", o.order_id.clone()))
            .bind(("date", o.date.to_string()))
            .bind(("delivery_hour", o.delivery_hour))
            .bind(("region", o.region.clone()))
            .bind(("driver_id", o.driver_id.clone()))
            .bind(("customer_id", o.customer_id.clone()))
            .bind(("items_delivered", o.items_delivered))
            .bind(("items_missing", o.items_missing))
            .await;

        match result {
            Ok(mut response) => match response.check() {
                Ok(_) => order_count += 1,
                Err(e) => {
                    if error_count < 5 {
                        warn!("Query check failed for order {}: {}", i, e);
                    }
                    error_count += 1;
                }
            },
            Err(e) => {
                if error_count < 5 {
                    warn!("Query error for order {}: {}", i, e);
                }
                error_count += 1;
            }
        }

        if (i + 1) % 1000 == 0 {
            info!("Processed {}/{} orders...", i + 1, orders.len());
        }
    }

    info!("Inserting missing-item reports...");
    for m in &missing {
        db.query("CREATE missing_items SET order_id = $order_id, product_id = $product_id")
            .bind(("order_id", m.order_id.clone()))
            .bind(("product_id", m.product_id.clone()))
            .await?
            .check()?;
    }

    info!(
        "Ingestion complete: {} orders, {} errors",
        order_count, error_count
    );

    info!("Database totals:");
    info!("  Orders: {:?}", count_table(&db, "orders").await?);
    info!("  Drivers: {:?}", count_table(&db, "drivers").await?);
    info!("  Customers: {:?}", count_table(&db, "customers").await?);
    info!("  Products: {:?}", count_table(&db, "products").await?);
    info!(
        "  Missing-item reports: {:?}",
        count_table(&db, "missing_items").await?
    );

    Ok(())
}
