//! SurrealDB access
//! Embedded RocksDB store. The read side issues plain row SELECTs only;
//! every group-by lives in the metrics layer, so the table and column
//! names below are the whole storage contract.

use anyhow::Result;
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::Surreal;

use crate::models::{CustomerRow, DriverRow, MissingItemRow, OrderRow, ProductRow};

pub type DbConn = Surreal<Db>;

/// Initialize database connection with RocksDB backend
pub async fn connect(path: &str) -> Result<DbConn> {
    let db = Surreal::new::<RocksDb>(path).await?;
    db.use_ns("fraudscope").use_db("retail").await?;
    Ok(db)
}

/// Initialize database schema
pub async fn init_schema(db: &DbConn) -> Result<()> {
    db.query(
        r#"
        -- Orders (schemaless for flexibility)
        DEFINE TABLE orders SCHEMALESS;
        DEFINE INDEX idx_order_id ON orders FIELDS order_id UNIQUE;
        DEFINE INDEX idx_order_date ON orders FIELDS date;
        DEFINE INDEX idx_order_region ON orders FIELDS region;
        DEFINE INDEX idx_order_driver ON orders FIELDS driver_id;

        -- Driver roster
        DEFINE TABLE drivers SCHEMAFULL;
        DEFINE FIELD driver_id ON drivers TYPE string;
        DEFINE FIELD name ON drivers TYPE string;
        DEFINE FIELD age ON drivers TYPE int;
        DEFINE INDEX idx_driver_id ON drivers FIELDS driver_id UNIQUE;

        -- Customer roster
        DEFINE TABLE customers SCHEMAFULL;
        DEFINE FIELD customer_id ON customers TYPE string;
        DEFINE FIELD name ON customers TYPE string;
        DEFINE FIELD age ON customers TYPE int;
        DEFINE FIELD region ON customers TYPE string;
        DEFINE INDEX idx_customer_id ON customers FIELDS customer_id UNIQUE;

        -- Product catalog
        DEFINE TABLE products SCHEMAFULL;
        DEFINE FIELD product_id ON products TYPE string;
        DEFINE FIELD name ON products TYPE string;
        DEFINE FIELD category ON products TYPE string;
        DEFINE FIELD price ON products TYPE float;
        DEFINE INDEX idx_product_id ON products FIELDS product_id UNIQUE;

        -- Missing-item reports (one row per missing unit)
        DEFINE TABLE missing_items SCHEMAFULL;
        DEFINE FIELD order_id ON missing_items TYPE string;
        DEFINE FIELD product_id ON missing_items TYPE string;
        DEFINE INDEX idx_missing_order ON missing_items FIELDS order_id;
        "#,
    )
    .await?;

    Ok(())
}

pub async fn fetch_orders(db: &DbConn) -> Result<Vec<OrderRow>> {
    let rows: Vec<OrderRow> = db.query("SELECT * FROM orders").await?.take(0)?;
    Ok(rows)
}

pub async fn fetch_drivers(db: &DbConn) -> Result<Vec<DriverRow>> {
    let rows: Vec<DriverRow> = db.query("SELECT * FROM drivers").await?.take(0)?;
    Ok(rows)
}

pub async fn fetch_customers(db: &DbConn) -> Result<Vec<CustomerRow>> {
    let rows: Vec<CustomerRow> = db.query("SELECT * FROM customers").await?.take(0)?;
    Ok(rows)
}

pub async fn fetch_products(db: &DbConn) -> Result<Vec<ProductRow>> {
    let rows: Vec<ProductRow> = db.query("SELECT * FROM products").await?.take(0)?;
    Ok(rows)
}

pub async fn fetch_missing_items(db: &DbConn) -> Result<Vec<MissingItemRow>> {
    let rows: Vec<MissingItemRow> = db.query("SELECT * FROM missing_items").await?.take(0)?;
    Ok(rows)
}
