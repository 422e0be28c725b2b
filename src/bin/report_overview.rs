//! Fraud Overview Report - Where does the operation stand?
//! Headline KPIs with top regions and drivers
//!
//! Run: ./target/release/report_overview [section]
//! Sections: all, kpi, regions, drivers, customers, export

use std::env;
use std::path::Path;

use anyhow::Result;
use fraudscope::config::AnalysisConfig;
use fraudscope::models::{DriverStats, RegionStats};
use fraudscope::source::{CachedSource, DataSource, Dataset};
use fraudscope::{export, metrics, synthetic};
use tracing::warn;

const DB_PATH: &str = "data/fraudscope.db";

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
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

    let cfg = AnalysisConfig::default();
    let data = load_data(&cfg).await?;

    println!("\n{}", "█".repeat(80));
    println!("{}  FRAUD OVERVIEW  {}", "█".repeat(31), "█".repeat(31));
    println!("{}\n", "█".repeat(80));

    match section {
        "all" => {
            run_guarded("kpi", run_kpi(&data));
            run_guarded("regions", run_regions(&data));
            run_guarded("drivers", run_drivers(&data, &cfg));
            run_guarded("customers", run_customers(&data, &cfg));
        }
        "kpi" => run_kpi(&data)?,
        "regions" => run_regions(&data)?,
        "drivers" => run_drivers(&data, &cfg)?,
        "customers" => run_customers(&data, &cfg)?,
        "export" => run_export(&data, &cfg)?,
        _ => {
            println!("Unknown section: {}", section);
            println!("Available: all, kpi, regions, drivers, customers, export");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_kpi(data: &Dataset) -> Result<()> {
    print_section_header("1. HEADLINE KPIs");

    let total_orders = data.orders.len() as u64;
    let total_missing: u64 = data.orders.iter().map(|o| o.items_missing as u64).sum();
    let affected = data.orders.iter().filter(|o| o.items_missing > 0).count() as u64;
    let overall_rate = metrics::fraud_rate(total_missing, total_orders);
    let affected_rate = metrics::fraud_rate(affected, total_orders);
    let avg_per_affected = if affected == 0 {
        0.0
    } else {
        total_missing as f64 / affected as f64
    };

    println!("  Total Orders:            {:>12}", total_orders);
    println!("  Drivers:                 {:>12}", data.drivers.len());
    println!("  Customers:               {:>12}", data.customers.len());
    println!("  Catalog Products:        {:>12}", data.products.len());
    println!("  Missing Items Reported:  {:>12}", total_missing);
    println!("  Overall Complaint Rate:  {:>11.2}%", overall_rate);
    println!("  Orders With Missing:     {:>11.2}%", affected_rate);
    println!("  Avg Missing (affected):  {:>12.2}", avg_per_affected);

    Ok(())
}

fn region_rows(regions: &[RegionStats], take: usize) -> Vec<Vec<String>> {
    regions
        .iter()
        .take(take)
        .map(|r| {
            vec![
                r.region.clone(),
                r.total_orders.to_string(),
                r.total_missing_items.to_string(),
                format!("{:.2}", r.complaint_rate),
                format!("{:.2}", r.risk_score),
            ]
        })
        .collect()
}

fn run_regions(data: &Dataset) -> Result<()> {
    print_section_header("2. TOP REGIONS BY RISK");

    let regions = metrics::region_stats(&data.orders);
    println!(
        "  {:12} {:>10} {:>10} {:>8} {:>8}",
        "Region", "Orders", "Missing", "Rate%", "Risk"
    );
    println!("  {}", "─".repeat(52));
    for r in regions.iter().take(5) {
        println!(
            "  {:12} {:>10} {:>10} {:>8.2} {:>8.2}",
            r.region, r.total_orders, r.total_missing_items, r.complaint_rate, r.risk_score
        );
    }

    Ok(())
}

fn run_drivers(data: &Dataset, cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("3. TOP DRIVERS BY COMPLAINT RATE");

    let stats = metrics::driver_stats(&data.orders, &data.drivers, cfg);
    let ranked: Vec<&DriverStats> = stats
        .iter()
        .filter(|s| s.total_deliveries >= cfg.suspicious_min_volume)
        .take(5)
        .collect();

    print_subsection(&format!(
        "Drivers with at least {} deliveries",
        cfg.suspicious_min_volume
    ));
    println!(
        "  {:8} {:22} {:>10} {:>10} {:>8}",
        "ID", "Name", "Deliveries", "Missing", "Rate%"
    );
    println!("  {}", "─".repeat(64));
    for s in ranked {
        let marker = if s.suspicious { "🔴" } else { "  " };
        println!(
            "  {:8} {:22} {:>10} {:>10} {:>8.2} {}",
            s.driver_id, s.name, s.total_deliveries, s.complaint_count, s.complaint_rate, marker
        );
    }

    Ok(())
}

fn run_customers(data: &Dataset, cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("4. SUSPICIOUS CUSTOMERS");

    let stats = metrics::customer_stats(&data.orders, &data.customers, cfg);
    let suspicious = metrics::suspicious_customers(&stats);

    println!(
        "  Cutoff: rate > {:.0}% AND orders >= {}",
        cfg.suspicious_rate_pct, cfg.suspicious_min_volume
    );
    if suspicious.is_empty() {
        println!("\n  No customers over the cutoff in this window.");
        return Ok(());
    }

    print_subsection(&format!("{} customers flagged", suspicious.len()));
    println!(
        "  {:8} {:22} {:>8} {:>10} {:>8}",
        "ID", "Name", "Orders", "Missing", "Rate%"
    );
    println!("  {}", "─".repeat(62));
    for s in &suspicious {
        println!(
            "  {:8} {:22} {:>8} {:>10} {:>8.2}",
            s.customer_id, s.name, s.total_orders, s.complaint_count, s.complaint_rate
        );
    }

    Ok(())
}

fn run_export(data: &Dataset, cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("EXPORT");

    let regions = metrics::region_stats(&data.orders);
    let stats = metrics::driver_stats(&data.orders, &data.drivers, cfg);

    export::write_csv(Path::new("reports/overview_regions.csv"), &regions)?;

    let region_table = export::markdown_table(
        &["Region", "Orders", "Missing", "Rate%", "Risk"],
        &region_rows(&regions, 5),
    );
    let driver_table = export::markdown_table(
        &["ID", "Name", "Deliveries", "Rate%"],
        &stats
            .iter()
            .filter(|s| s.total_deliveries >= cfg.suspicious_min_volume)
            .take(5)
            .map(|s| {
                vec![
                    s.driver_id.clone(),
                    s.name.clone(),
                    s.total_deliveries.to_string(),
                    format!("{:.2}", s.complaint_rate),
                ]
            })
            .collect::<Vec<_>>(),
    );

    let report = export::markdown_report(
        "Fraud Overview",
        &[
            ("Top Regions by Risk".to_string(), region_table),
            ("Top Drivers by Complaint Rate".to_string(), driver_table),
        ],
    );
    export::write_markdown(Path::new("reports/overview.md"), &report)?;

    println!("  Wrote reports/overview_regions.csv");
    println!("  Wrote reports/overview.md");

    Ok(())
}
