//! Region Report - Where is the fraud concentrated?
//! Regional complaint rates, risk ranking and the problematic cutoff
//!
//! Run: ./target/release/report_regions [section]
//! Sections: all, table, problematic, export

use std::env;
use std::path::Path;

use anyhow::Result;
use fraudscope::config::AnalysisConfig;
use fraudscope::models::RegionStats;
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
    let regions = metrics::region_stats(&data.orders);

    println!("\n{}", "█".repeat(80));
    println!("{}  REGION REPORT  {}", "█".repeat(32), "█".repeat(32));
    println!("{}\n", "█".repeat(80));

    match section {
        "all" => {
            run_guarded("table", run_table(&regions));
            run_guarded("problematic", run_problematic(&regions));
        }
        "table" => run_table(&regions)?,
        "problematic" => run_problematic(&regions)?,
        "export" => run_export(&regions)?,
        _ => {
            println!("Unknown section: {}", section);
            println!("Available: all, table, problematic, export");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_table(regions: &[RegionStats]) -> Result<()> {
    print_section_header("1. REGIONS BY RISK SCORE");

    println!(
        "  {:12} {:>10} {:>10} {:>12} {:>8} {:>8}",
        "Region", "Orders", "Missing", "Avg/Order", "Rate%", "Risk"
    );
    println!("  {}", "─".repeat(66));
    for r in regions {
        println!(
            "  {:12} {:>10} {:>10} {:>12.2} {:>8.2} {:>8.2}",
            r.region,
            r.total_orders,
            r.total_missing_items,
            r.avg_missing_per_order,
            r.complaint_rate,
            r.risk_score
        );
    }

    Ok(())
}

fn run_problematic(regions: &[RegionStats]) -> Result<()> {
    print_section_header("2. PROBLEMATIC REGIONS");

    let threshold = match metrics::problematic_region_threshold(regions) {
        Some(t) => t,
        None => {
            println!("  No regional data in this window.");
            return Ok(());
        }
    };

    println!(
        "  Cutoff: complaint rate >= {:.2}% (mean + one standard deviation)",
        threshold
    );

    let problematic: Vec<&RegionStats> = regions
        .iter()
        .filter(|r| r.complaint_rate >= threshold)
        .collect();

    if problematic.is_empty() {
        println!("\n  No region is over the cutoff.");
        return Ok(());
    }

    print_subsection(&format!("{} regions over the cutoff", problematic.len()));
    for r in &problematic {
        println!(
            "  🔴 {:12} rate {:>6.2}%  ({} missing items across {} orders)",
            r.region, r.complaint_rate, r.total_missing_items, r.total_orders
        );
    }

    Ok(())
}

fn run_export(regions: &[RegionStats]) -> Result<()> {
    print_section_header("EXPORT");

    export::write_csv(Path::new("reports/regions.csv"), regions)?;

    let rows: Vec<Vec<String>> = regions
        .iter()
        .map(|r| {
            vec![
                r.region.clone(),
                r.total_orders.to_string(),
                r.total_missing_items.to_string(),
                format!("{:.2}", r.complaint_rate),
                format!("{:.2}", r.risk_score),
            ]
        })
        .collect();
    let table = export::markdown_table(&["Region", "Orders", "Missing", "Rate%", "Risk"], &rows);
    let report = export::markdown_report(
        "Region Report",
        &[("Regions by Risk Score".to_string(), table)],
    );
    export::write_markdown(Path::new("reports/regions.md"), &report)?;

    println!("  Wrote reports/regions.csv");
    println!("  Wrote reports/regions.md");

    Ok(())
}
