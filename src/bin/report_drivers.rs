//! Driver Report - Who is losing the items?
//! Per-driver complaint rates, suspicious subset and statistical outliers
//!
//! Run: ./target/release/report_drivers [section]
//! Sections: all, table, suspicious, anomalies, export

use std::env;
use std::path::Path;

use anyhow::Result;
use fraudscope::config::AnalysisConfig;
use fraudscope::models::DriverStats;
use fraudscope::source::{CachedSource, DataSource, Dataset};
use fraudscope::{export, metrics, stats, synthetic};
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
    let driver_stats = metrics::driver_stats(&data.orders, &data.drivers, &cfg);

    println!("\n{}", "█".repeat(80));
    println!("{}  DRIVER REPORT  {}", "█".repeat(32), "█".repeat(32));
    println!("{}\n", "█".repeat(80));

    match section {
        "all" => {
            run_guarded("table", run_table(&driver_stats));
            run_guarded("suspicious", run_suspicious(&driver_stats, &cfg));
            run_guarded("anomalies", run_anomalies(&driver_stats, &cfg));
        }
        "table" => run_table(&driver_stats)?,
        "suspicious" => run_suspicious(&driver_stats, &cfg)?,
        "anomalies" => run_anomalies(&driver_stats, &cfg)?,
        "export" => run_export(&driver_stats, &cfg)?,
        _ => {
            println!("Unknown section: {}", section);
            println!("Available: all, table, suspicious, anomalies, export");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn print_driver_rows(rows: &[&DriverStats]) {
    println!(
        "  {:8} {:22} {:>5} {:>10} {:>10} {:>8} {:>8}",
        "ID", "Name", "Age", "Deliveries", "Missing", "Rate%", "Avg"
    );
    println!("  {}", "─".repeat(78));
    for s in rows {
        let age = s.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
        let marker = if s.suspicious { "🔴" } else { "  " };
        println!(
            "  {:8} {:22} {:>5} {:>10} {:>10} {:>8.2} {:>8.2} {}",
            s.driver_id,
            s.name,
            age,
            s.total_deliveries,
            s.complaint_count,
            s.complaint_rate,
            s.avg_missing_items,
            marker
        );
    }
}

fn run_table(driver_stats: &[DriverStats]) -> Result<()> {
    print_section_header("1. DRIVERS BY COMPLAINT RATE");

    let rows: Vec<&DriverStats> = driver_stats.iter().take(20).collect();
    print_driver_rows(&rows);
    if driver_stats.len() > 20 {
        println!("  ... and {} more drivers", driver_stats.len() - 20);
    }

    Ok(())
}

fn run_suspicious(driver_stats: &[DriverStats], cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("2. SUSPICIOUS DRIVERS");

    println!(
        "  Cutoff: rate > {:.0}% AND deliveries >= {}",
        cfg.suspicious_rate_pct, cfg.suspicious_min_volume
    );

    let suspicious = metrics::suspicious_drivers(driver_stats);
    if suspicious.is_empty() {
        println!("\n  No drivers over the cutoff in this window.");
        return Ok(());
    }

    print_subsection(&format!("{} drivers flagged", suspicious.len()));
    let rows: Vec<&DriverStats> = suspicious.iter().collect();
    print_driver_rows(&rows);

    Ok(())
}

fn run_anomalies(driver_stats: &[DriverStats], cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("3. STATISTICAL OUTLIERS (IQR)");

    let active: Vec<&DriverStats> = driver_stats
        .iter()
        .filter(|s| s.total_deliveries > 0)
        .collect();
    let rates: Vec<f64> = active.iter().map(|s| s.complaint_rate).collect();
    let flags = stats::flag_anomalies(&rates, cfg.anomaly_iqr_k);

    let outliers: Vec<&DriverStats> = active
        .iter()
        .zip(&flags)
        .filter(|(_, flagged)| **flagged)
        .map(|(s, _)| *s)
        .collect();

    println!(
        "  {} of {} active drivers fall outside the {:.1}x IQR bounds",
        outliers.len(),
        active.len(),
        cfg.anomaly_iqr_k
    );

    if !outliers.is_empty() {
        print_subsection("Outlier drivers");
        print_driver_rows(&outliers);
    }

    Ok(())
}

fn run_export(driver_stats: &[DriverStats], cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("EXPORT");

    export::write_csv(Path::new("reports/drivers.csv"), driver_stats)?;

    let suspicious = metrics::suspicious_drivers(driver_stats);
    export::write_csv(Path::new("reports/suspicious_drivers.csv"), &suspicious)?;

    let table = export::markdown_table(
        &["ID", "Name", "Deliveries", "Missing", "Rate%"],
        &suspicious
            .iter()
            .map(|s| {
                vec![
                    s.driver_id.clone(),
                    s.name.clone(),
                    s.total_deliveries.to_string(),
                    s.complaint_count.to_string(),
                    format!("{:.2}", s.complaint_rate),
                ]
            })
            .collect::<Vec<_>>(),
    );
    let report = export::markdown_report(
        "Driver Report",
        &[(
            format!(
                "Suspicious Drivers (rate > {:.0}%, volume >= {})",
                cfg.suspicious_rate_pct, cfg.suspicious_min_volume
            ),
            table,
        )],
    );
    export::write_markdown(Path::new("reports/drivers.md"), &report)?;

    println!("  Wrote reports/drivers.csv");
    println!("  Wrote reports/suspicious_drivers.csv");
    println!("  Wrote reports/drivers.md");

    Ok(())
}
