use anyhow::Result;
use fraudscope::config::AnalysisConfig;
use fraudscope::source::{CachedSource, DataSource};
use fraudscope::{metrics, synthetic};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cfg = AnalysisConfig::default();
    let source = CachedSource::new(
        DataSource::open("data/fraudscope.db", synthetic::DEFAULT_SEED).await,
        cfg.cache_ttl,
    );
    let data = source.load().await?;
    if data.synthetic {
        warn!("Store unavailable; reporting over SYNTHETIC data");
    }

    info!("=== Dataset Summary ===");
    info!("Orders: {}", data.orders.len());
    info!("Drivers: {}", data.drivers.len());
    info!("Customers: {}", data.customers.len());
    info!("Products: {}", data.products.len());
    info!("Missing-item reports: {}", data.missing_items.len());

    let total_missing: u64 = data.orders.iter().map(|o| o.items_missing as u64).sum();
    let overall_rate = metrics::fraud_rate(total_missing, data.orders.len() as u64);
    info!("Overall complaint rate: {:.2}%", overall_rate);

    let regions = metrics::region_stats(&data.orders);
    if let Some(top) = regions.first() {
        info!(
            "Highest-risk region: {} (rate {:.2}%, risk {:.2})",
            top.region, top.complaint_rate, top.risk_score
        );
    }

    let suspicious = metrics::suspicious_drivers(&metrics::driver_stats(
        &data.orders,
        &data.drivers,
        &cfg,
    ));
    info!(
        "Suspicious drivers: {} (rate > {:.0}%, volume >= {})",
        suspicious.len(),
        cfg.suspicious_rate_pct,
        cfg.suspicious_min_volume
    );

    // Machine-readable one-liner for scripts that wrap this binary.
    let summary = serde_json::json!({
        "orders": data.orders.len(),
        "missing_items": total_missing,
        "overall_rate_pct": overall_rate,
        "suspicious_drivers": suspicious.len(),
        "synthetic": data.synthetic,
    });
    info!("Summary: {}", summary);

    Ok(())
}
