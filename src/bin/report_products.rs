//! Product Report - What is going missing?
//! Missing-item reports joined against the catalog, with category rollups
//!
//! Run: ./target/release/report_products [section] [category]
//! Sections: all, products, categories, export
//! An optional category narrows the tables; "all" (default) keeps every row.

use std::env;
use std::path::Path;

use anyhow::Result;
use fraudscope::config::AnalysisConfig;
use fraudscope::filters::{self, Selection};
use fraudscope::models::ProductLoss;
use fraudscope::source::{CachedSource, DataSource, Dataset};
use fraudscope::{export, metrics, synthetic};
use tracing::warn;

const DB_PATH: &str = "data/fraudscope.db";

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn run_guarded(name: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!("Section '{}' failed: {:#}", name, e);
    }
}

async fn load_data(cfg: &AnalysisConfig) -> Result<Dataset> {
    let source = CachedSource::new(
        DataSource::open(DB_PATH, synthetic::DEFAULT_SEED).await,
        cfg.cache_ttl,
    );
    let data = source.load().await?;
    if data.synthetic {
        println!("⚠  Store unavailable - this report runs over SYNTHETIC data\n");
    }
    Ok(data)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = env::args().collect();
    let section = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let category = Selection::from_arg(args.get(2).map(|s| s.as_str()));

    let cfg = AnalysisConfig::default();
    let data = load_data(&cfg).await?;
    let losses = filters::filter_by_category(
        &metrics::product_losses(&data.missing_items, &data.products),
        &category,
    );

    println!("\n{}", "█".repeat(80));
    println!("{}  PRODUCT REPORT  {}", "█".repeat(31), "█".repeat(32));
    println!("{}\n", "█".repeat(80));
    if category != Selection::All {
        println!("Category filter: {}\n", category);
    }

    match section {
        "all" => {
            run_guarded("products", run_products(&losses));
            run_guarded("categories", run_categories(&losses));
        }
        "products" => run_products(&losses)?,
        "categories" => run_categories(&losses)?,
        "export" => run_export(&losses)?,
        _ => {
            println!("Unknown section: {}", section);
            println!("Available: all, products, categories, export");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_products(losses: &[ProductLoss]) -> Result<()> {
    print_section_header("1. PRODUCTS BY VALUE LOST");

    if losses.is_empty() {
        println!("  No missing-item reports in this window.");
        return Ok(());
    }

    println!(
        "  {:8} {:24} {:14} {:>8} {:>8} {:>12}",
        "ID", "Name", "Category", "Price", "Reports", "Value Lost"
    );
    println!("  {}", "─".repeat(80));
    for l in losses.iter().take(15) {
        println!(
            "  {:8} {:24} {:14} {:>8.2} {:>8} {:>12.2}",
            l.product_id, l.name, l.category, l.price, l.complaint_count, l.value_lost
        );
    }
    if losses.len() > 15 {
        println!("  ... and {} more products", losses.len() - 15);
    }

    let total_value: f64 = losses.iter().map(|l| l.value_lost).sum();
    let total_reports: u64 = losses.iter().map(|l| l.complaint_count).sum();
    println!(
        "\n  Total: {} reports across {} products, {:.2} in lost value",
        total_reports,
        losses.len(),
        total_value
    );

    Ok(())
}

fn run_categories(losses: &[ProductLoss]) -> Result<()> {
    print_section_header("2. CATEGORY ROLLUP");

    let summary = metrics::category_summary(losses);
    if summary.is_empty() {
        println!("  No missing-item reports in this window.");
        return Ok(());
    }

    println!(
        "  {:14} {:>10} {:>10} {:>10} {:>12}",
        "Category", "Products", "Reports", "Avg Price", "Value Lost"
    );
    println!("  {}", "─".repeat(60));
    for c in &summary {
        println!(
            "  {:14} {:>10} {:>10} {:>10.2} {:>12.2}",
            c.category, c.product_count, c.total_reports, c.avg_price, c.value_lost
        );
    }

    Ok(())
}

fn run_export(losses: &[ProductLoss]) -> Result<()> {
    print_section_header("EXPORT");

    export::write_csv(Path::new("reports/products.csv"), losses)?;
    let summary = metrics::category_summary(losses);
    export::write_csv(Path::new("reports/categories.csv"), &summary)?;

    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                c.product_count.to_string(),
                c.total_reports.to_string(),
                format!("{:.2}", c.value_lost),
            ]
        })
        .collect();
    let table =
        export::markdown_table(&["Category", "Products", "Reports", "Value Lost"], &rows);
    let report =
        export::markdown_report("Product Report", &[("Category Rollup".to_string(), table)]);
    export::write_markdown(Path::new("reports/products.md"), &report)?;

    println!("  Wrote reports/products.csv");
    println!("  Wrote reports/categories.csv");
    println!("  Wrote reports/products.md");

    Ok(())
}
