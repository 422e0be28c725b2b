//! Pattern Report - What groups and outliers hide in the data?
//! K-Means driver families and IQR outliers on the daily trend
//!
//! Run: ./target/release/report_patterns [section]
//! Sections: all, clusters, anomalies, export

use std::env;
use std::path::Path;

use anyhow::Result;
use fraudscope::config::AnalysisConfig;
use fraudscope::models::DriverStats;
use fraudscope::source::{CachedSource, DataSource, Dataset};
use fraudscope::stats::{self, ClusterOutcome};
use fraudscope::{export, metrics, synthetic};
use serde::Serialize;
use tracing::warn;

const DB_PATH: &str = "data/fraudscope.db";

/// Driver with its cluster assignment.
#[derive(Debug, Clone, Serialize)]
struct ClusteredDriver {
    driver_id: String,
    name: String,
    total_deliveries: u64,
    complaint_rate: f64,
    avg_missing_items: f64,
    cluster_id: usize,
}

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

/// Cluster active drivers on rate, average missing items and volume.
/// Returns None with a printed warning when clustering is not possible.
fn cluster_drivers(driver_stats: &[DriverStats], cfg: &AnalysisConfig) -> Option<Vec<ClusteredDriver>> {
    let active: Vec<&DriverStats> = driver_stats
        .iter()
        .filter(|s| s.total_deliveries > 0)
        .collect();

    let features: Vec<Vec<f64>> = active
        .iter()
        .map(|s| {
            vec![
                s.complaint_rate,
                s.avg_missing_items,
                s.total_deliveries as f64,
            ]
        })
        .collect();

    match stats::cluster_rows(&features, cfg.cluster_count, cfg.cluster_seed) {
        ClusterOutcome::Clustered(labels) => Some(
            active
                .iter()
                .zip(labels)
                .map(|(s, cluster_id)| ClusteredDriver {
                    driver_id: s.driver_id.clone(),
                    name: s.name.clone(),
                    total_deliveries: s.total_deliveries,
                    complaint_rate: s.complaint_rate,
                    avg_missing_items: s.avg_missing_items,
                    cluster_id,
                })
                .collect(),
        ),
        ClusterOutcome::Skipped(reason) => {
            println!("  ⚠  Clustering skipped: {}", reason);
            warn!("Clustering skipped: {}", reason);
            None
        }
    }
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
    println!("{}  PATTERN REPORT  {}", "█".repeat(31), "█".repeat(32));
    println!("{}\n", "█".repeat(80));

    match section {
        "all" => {
            run_guarded("clusters", run_clusters(&driver_stats, &cfg));
            run_guarded("anomalies", run_anomalies(&data, &cfg));
        }
        "clusters" => run_clusters(&driver_stats, &cfg)?,
        "anomalies" => run_anomalies(&data, &cfg)?,
        "export" => run_export(&driver_stats, &cfg)?,
        _ => {
            println!("Unknown section: {}", section);
            println!("Available: all, clusters, anomalies, export");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_clusters(driver_stats: &[DriverStats], cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("1. DRIVER BEHAVIOR CLUSTERS");

    let clustered = match cluster_drivers(driver_stats, cfg) {
        Some(c) => c,
        None => return Ok(()),
    };

    println!(
        "  {} active drivers grouped into {} clusters (seed {})",
        clustered.len(),
        cfg.cluster_count,
        cfg.cluster_seed
    );

    for cluster_id in 0..cfg.cluster_count {
        let members: Vec<&ClusteredDriver> = clustered
            .iter()
            .filter(|d| d.cluster_id == cluster_id)
            .collect();
        if members.is_empty() {
            continue;
        }

        let n = members.len() as f64;
        let avg_rate = members.iter().map(|d| d.complaint_rate).sum::<f64>() / n;
        let avg_volume = members.iter().map(|d| d.total_deliveries as f64).sum::<f64>() / n;
        let avg_missing = members.iter().map(|d| d.avg_missing_items).sum::<f64>() / n;

        print_subsection(&format!("Cluster {} ({} drivers)", cluster_id, members.len()));
        println!(
            "  Avg Rate: {:.2}% | Avg Deliveries: {:.1} | Avg Missing/Order: {:.2}",
            avg_rate, avg_volume, avg_missing
        );

        let mut ranked = members.clone();
        ranked.sort_by(|a, b| {
            b.complaint_rate
                .partial_cmp(&a.complaint_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        print!("  Top drivers: ");
        for (i, d) in ranked.iter().take(5).enumerate() {
            if i > 0 {
                print!(", ");
            }
            print!("{} ({:.1}%)", d.name, d.complaint_rate);
        }
        println!();
    }

    Ok(())
}

fn run_anomalies(data: &Dataset, cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("2. ANOMALOUS DAYS (IQR)");

    let buckets = metrics::daily_buckets(&data.orders);
    if buckets.is_empty() {
        println!("  No orders in this window.");
        return Ok(());
    }

    let rates: Vec<f64> = buckets.iter().map(|b| b.complaint_rate).collect();
    let flags = stats::flag_anomalies(&rates, cfg.anomaly_iqr_k);

    let anomalous: Vec<_> = buckets
        .iter()
        .zip(&flags)
        .filter(|(_, flagged)| **flagged)
        .map(|(b, _)| b)
        .collect();

    println!(
        "  {} of {} days fall outside the {:.1}x IQR bounds",
        anomalous.len(),
        buckets.len(),
        cfg.anomaly_iqr_k
    );

    if !anomalous.is_empty() {
        print_subsection("Anomalous days");
        println!(
            "  {:12} {:10} {:>8} {:>8} {:>8}",
            "Date", "Weekday", "Orders", "Missing", "Rate%"
        );
        println!("  {}", "─".repeat(52));
        for b in anomalous {
            println!(
                "  {:12} {:10} {:>8} {:>8} {:>8.2}",
                b.date.to_string(),
                b.weekday,
                b.total_orders,
                b.missing_items,
                b.complaint_rate
            );
        }
    }

    Ok(())
}

fn run_export(driver_stats: &[DriverStats], cfg: &AnalysisConfig) -> Result<()> {
    print_section_header("EXPORT");

    let clustered = match cluster_drivers(driver_stats, cfg) {
        Some(c) => c,
        None => return Ok(()),
    };

    export::write_csv(Path::new("reports/driver_clusters.csv"), &clustered)?;

    let rows: Vec<Vec<String>> = (0..cfg.cluster_count)
        .filter_map(|cluster_id| {
            let members: Vec<&ClusteredDriver> = clustered
                .iter()
                .filter(|d| d.cluster_id == cluster_id)
                .collect();
            if members.is_empty() {
                return None;
            }
            let n = members.len() as f64;
            Some(vec![
                cluster_id.to_string(),
                members.len().to_string(),
                format!(
                    "{:.2}",
                    members.iter().map(|d| d.complaint_rate).sum::<f64>() / n
                ),
                format!(
                    "{:.1}",
                    members.iter().map(|d| d.total_deliveries as f64).sum::<f64>() / n
                ),
            ])
        })
        .collect();
    let table = export::markdown_table(&["Cluster", "Drivers", "Avg Rate%", "Avg Volume"], &rows);
    let report = export::markdown_report(
        "Pattern Report",
        &[("Driver Behavior Clusters".to_string(), table)],
    );
    export::write_markdown(Path::new("reports/patterns.md"), &report)?;

    println!("  Wrote reports/driver_clusters.csv");
    println!("  Wrote reports/patterns.md");

    Ok(())
}
