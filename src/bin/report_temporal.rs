//! Temporal Report - When does the fraud happen?
//! Hour-of-day buckets, daily trend with rolling averages, weekday rollup
//!
//! Run: ./target/release/report_temporal [section] [start] [end]
//! Sections: all, hourly, daily, weekday, export
//! Optional start/end dates (YYYY-MM-DD, inclusive) narrow the window.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use fraudscope::config::AnalysisConfig;
use fraudscope::models::{OrderRow, PeriodOfDay};
use fraudscope::source::{CachedSource, DataSource, Dataset};
use fraudscope::{export, filters, metrics, synthetic};
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

fn parse_date(arg: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .with_context(|| format!("expected YYYY-MM-DD, got '{}'", arg))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = env::args().collect();
    let section = args.get(1).map(|s| s.as_str()).unwrap_or("all");

    let cfg = AnalysisConfig::default();
    let data = load_data(&cfg).await?;

    let orders: Vec<OrderRow> = match (args.get(2), args.get(3)) {
        (Some(start), Some(end)) => {
            let start = parse_date(start)?;
            let end = parse_date(end)?;
            println!("Date window: {} to {} (inclusive)\n", start, end);
            filters::filter_by_date_range(&data.orders, start, end)
        }
        _ => data.orders.clone(),
    };

    println!("\n{}", "█".repeat(80));
    println!("{}  TEMPORAL REPORT  {}", "█".repeat(31), "█".repeat(31));
    println!("{}\n", "█".repeat(80));

    match section {
        "all" => {
            run_guarded("hourly", run_hourly(&orders));
            run_guarded("daily", run_daily(&orders));
            run_guarded("weekday", run_weekday(&orders));
        }
        "hourly" => run_hourly(&orders)?,
        "daily" => run_daily(&orders)?,
        "weekday" => run_weekday(&orders)?,
        "export" => run_export(&orders)?,
        _ => {
            println!("Unknown section: {}", section);
            println!("Available: all, hourly, daily, weekday, export");
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn run_hourly(orders: &[OrderRow]) -> Result<()> {
    print_section_header("1. COMPLAINTS BY DELIVERY HOUR");

    let buckets = metrics::hourly_buckets(orders);
    if buckets.is_empty() {
        println!("  No orders in this window.");
        return Ok(());
    }

    println!(
        "  {:>4} {:12} {:>10} {:>10} {:>8}",
        "Hour", "Period", "Orders", "Missing", "Rate%"
    );
    println!("  {}", "─".repeat(48));
    for b in &buckets {
        println!(
            "  {:>4} {:12} {:>10} {:>10} {:>8.2}",
            b.hour,
            b.period.label(),
            b.total_orders,
            b.missing_items,
            b.complaint_rate
        );
    }

    print_subsection("Period rollup");
    for period in [
        PeriodOfDay::Night,
        PeriodOfDay::Morning,
        PeriodOfDay::Afternoon,
        PeriodOfDay::Evening,
    ] {
        let total: u64 = buckets
            .iter()
            .filter(|b| b.period == period)
            .map(|b| b.total_orders)
            .sum();
        let missing: u64 = buckets
            .iter()
            .filter(|b| b.period == period)
            .map(|b| b.missing_items)
            .sum();
        println!(
            "  {:12} {:>10} orders {:>10} missing {:>7.2}%",
            period.label(),
            total,
            missing,
            metrics::fraud_rate(missing, total)
        );
    }

    Ok(())
}

fn run_daily(orders: &[OrderRow]) -> Result<()> {
    print_section_header("2. DAILY TREND");

    let buckets = metrics::daily_buckets(orders);
    if buckets.is_empty() {
        println!("  No orders in this window.");
        return Ok(());
    }

    print_subsection(&format!("Last 14 of {} days", buckets.len()));
    println!(
        "  {:12} {:10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Date", "Weekday", "Orders", "Missing", "Rate%", "MA7", "MA30"
    );
    println!("  {}", "─".repeat(70));
    let tail_start = buckets.len().saturating_sub(14);
    for b in &buckets[tail_start..] {
        println!(
            "  {:12} {:10} {:>8} {:>8} {:>8.2} {:>8.2} {:>8.2}",
            b.date.to_string(),
            b.weekday,
            b.total_orders,
            b.missing_items,
            b.complaint_rate,
            b.rate_ma7,
            b.rate_ma30
        );
    }

    Ok(())
}

fn run_weekday(orders: &[OrderRow]) -> Result<()> {
    print_section_header("3. WEEKDAY ROLLUP");

    if orders.is_empty() {
        println!("  No orders in this window.");
        return Ok(());
    }

    // number_from_monday keeps the table in calendar order.
    let mut grouped: [(u64, u64); 7] = [(0, 0); 7];
    for o in orders {
        let idx = o.date.weekday().number_from_monday() as usize - 1;
        grouped[idx].0 += 1;
        grouped[idx].1 += o.items_missing as u64;
    }

    const WEEKDAYS: [&str; 7] = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    ];
    println!(
        "  {:12} {:>10} {:>10} {:>8}",
        "Weekday", "Orders", "Missing", "Rate%"
    );
    println!("  {}", "─".repeat(44));
    for (i, name) in WEEKDAYS.iter().enumerate() {
        let (total, missing) = grouped[i];
        println!(
            "  {:12} {:>10} {:>10} {:>8.2}",
            name,
            total,
            missing,
            metrics::fraud_rate(missing, total)
        );
    }

    Ok(())
}

fn run_export(orders: &[OrderRow]) -> Result<()> {
    print_section_header("EXPORT");

    let hourly = metrics::hourly_buckets(orders);
    let daily = metrics::daily_buckets(orders);

    export::write_csv(Path::new("reports/hourly.csv"), &hourly)?;
    export::write_csv(Path::new("reports/daily.csv"), &daily)?;

    let rows: Vec<Vec<String>> = hourly
        .iter()
        .map(|b| {
            vec![
                b.hour.to_string(),
                b.period.label().to_string(),
                b.total_orders.to_string(),
                format!("{:.2}", b.complaint_rate),
            ]
        })
        .collect();
    let table = export::markdown_table(&["Hour", "Period", "Orders", "Rate%"], &rows);
    let report = export::markdown_report(
        "Temporal Report",
        &[("Complaints by Delivery Hour".to_string(), table)],
    );
    export::write_markdown(Path::new("reports/temporal.md"), &report)?;

    println!("  Wrote reports/hourly.csv");
    println!("  Wrote reports/daily.csv");
    println!("  Wrote reports/temporal.md");

    Ok(())
}
