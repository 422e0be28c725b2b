//! Metric derivation
//! Turns raw order/driver/product rows into the aggregate tables every
//! report consumes. All group-bys live here, not in the store.
//!
//! Every function degrades gracefully: empty input yields an empty table,
//! a zero denominator yields a zero rate, never an error.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;

use crate::config::AnalysisConfig;
use crate::models::{
    CategorySummary, CustomerRow, CustomerStats, DailyBucket, DriverRow, DriverStats,
    HourlyBucket, MissingItemRow, OrderRow, PeriodOfDay, ProductLoss, ProductRow, RegionStats,
};

/// Complaint rate as a percentage. 0 when `total` is 0. Not clamped: more
/// than one missing item per order legitimately pushes the rate past 100.
pub fn fraud_rate(complaints: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        complaints as f64 / total as f64 * 100.0
    }
}

/// Simple moving average with a shrinking window at the head of the
/// series, so index 0 is always the first value itself.
pub fn rolling_average(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &series[start..=i];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }
    out
}

fn sort_by_rate_desc<T, F: Fn(&T) -> f64>(items: &mut [T], rate: F) {
    items.sort_by(|a, b| {
        rate(b)
            .partial_cmp(&rate(a))
            .unwrap_or(Ordering::Equal)
    });
}

fn driver_entry(
    driver_id: String,
    name: String,
    age: Option<u32>,
    deliveries: u64,
    complaints: u64,
    cfg: &AnalysisConfig,
) -> DriverStats {
    let rate = fraud_rate(complaints, deliveries);
    DriverStats {
        driver_id,
        name,
        age,
        total_deliveries: deliveries,
        complaint_count: complaints,
        complaint_rate: rate,
        avg_missing_items: if deliveries == 0 {
            0.0
        } else {
            complaints as f64 / deliveries as f64
        },
        suspicious: rate > cfg.suspicious_rate_pct && deliveries >= cfg.suspicious_min_volume,
    }
}

/// Per-driver aggregates over the order table, sorted by complaint rate.
/// Roster drivers with no orders appear with zero counts; order rows
/// referencing drivers missing from the roster get a placeholder name.
pub fn driver_stats(
    orders: &[OrderRow],
    drivers: &[DriverRow],
    cfg: &AnalysisConfig,
) -> Vec<DriverStats> {
    let mut grouped: HashMap<&str, (u64, u64)> = HashMap::new();
    for o in orders {
        let entry = grouped.entry(o.driver_id.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += o.items_missing as u64;
    }

    let mut stats: Vec<DriverStats> = Vec::with_capacity(drivers.len());
    for d in drivers {
        let (deliveries, complaints) = grouped
            .remove(d.driver_id.as_str())
            .unwrap_or((0, 0));
        stats.push(driver_entry(
            d.driver_id.clone(),
            d.name.clone(),
            Some(d.age),
            deliveries,
            complaints,
            cfg,
        ));
    }

    let mut unrostered: Vec<(&str, (u64, u64))> = grouped.into_iter().collect();
    unrostered.sort_unstable_by_key(|(id, _)| *id);
    for (id, (deliveries, complaints)) in unrostered {
        stats.push(driver_entry(
            id.to_string(),
            format!("Driver {}", id),
            None,
            deliveries,
            complaints,
            cfg,
        ));
    }

    sort_by_rate_desc(&mut stats, |s| s.complaint_rate);
    stats
}

/// Suspicious subset of `driver_stats`: rate above the configured cutoff
/// AND volume at or above the floor. Rate alone is never enough.
pub fn suspicious_drivers(stats: &[DriverStats]) -> Vec<DriverStats> {
    stats.iter().filter(|s| s.suspicious).cloned().collect()
}

/// Per-customer aggregates, mirror of `driver_stats`.
pub fn customer_stats(
    orders: &[OrderRow],
    customers: &[CustomerRow],
    cfg: &AnalysisConfig,
) -> Vec<CustomerStats> {
    let mut grouped: HashMap<&str, (u64, u64)> = HashMap::new();
    for o in orders {
        let entry = grouped.entry(o.customer_id.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += o.items_missing as u64;
    }

    let mut stats: Vec<CustomerStats> = Vec::with_capacity(customers.len());
    for c in customers {
        let (order_count, complaints) = grouped
            .remove(c.customer_id.as_str())
            .unwrap_or((0, 0));
        let rate = fraud_rate(complaints, order_count);
        stats.push(CustomerStats {
            customer_id: c.customer_id.clone(),
            name: c.name.clone(),
            age: Some(c.age),
            total_orders: order_count,
            complaint_count: complaints,
            complaint_rate: rate,
            avg_missing_items: if order_count == 0 {
                0.0
            } else {
                complaints as f64 / order_count as f64
            },
            suspicious: rate > cfg.suspicious_rate_pct
                && order_count >= cfg.suspicious_min_volume,
        });
    }

    let mut unrostered: Vec<(&str, (u64, u64))> = grouped.into_iter().collect();
    unrostered.sort_unstable_by_key(|(id, _)| *id);
    for (id, (order_count, complaints)) in unrostered {
        let rate = fraud_rate(complaints, order_count);
        stats.push(CustomerStats {
            customer_id: id.to_string(),
            name: format!("Customer {}", id),
            age: None,
            total_orders: order_count,
            complaint_count: complaints,
            complaint_rate: rate,
            avg_missing_items: if order_count == 0 {
                0.0
            } else {
                complaints as f64 / order_count as f64
            },
            suspicious: rate > cfg.suspicious_rate_pct
                && order_count >= cfg.suspicious_min_volume,
        });
    }

    sort_by_rate_desc(&mut stats, |s| s.complaint_rate);
    stats
}

pub fn suspicious_customers(stats: &[CustomerStats]) -> Vec<CustomerStats> {
    stats.iter().filter(|s| s.suspicious).cloned().collect()
}

/// Per-region aggregates with a risk score for ranking: 0.7 on the
/// complaint rate plus 0.3 on average missing items per order, each
/// normalized by the column maximum (a zero maximum normalizes to 0).
pub fn region_stats(orders: &[OrderRow]) -> Vec<RegionStats> {
    let mut grouped: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for o in orders {
        let entry = grouped.entry(o.region.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += o.items_missing as u64;
    }

    let mut stats: Vec<RegionStats> = grouped
        .into_iter()
        .map(|(region, (order_count, missing))| RegionStats {
            region: region.to_string(),
            total_orders: order_count,
            total_missing_items: missing,
            avg_missing_per_order: if order_count == 0 {
                0.0
            } else {
                missing as f64 / order_count as f64
            },
            complaint_rate: fraud_rate(missing, order_count),
            risk_score: 0.0,
        })
        .collect();

    let max_rate = stats.iter().map(|s| s.complaint_rate).fold(0.0, f64::max);
    let max_avg = stats
        .iter()
        .map(|s| s.avg_missing_per_order)
        .fold(0.0, f64::max);
    for s in &mut stats {
        let rate_norm = if max_rate > 0.0 {
            s.complaint_rate / max_rate
        } else {
            0.0
        };
        let avg_norm = if max_avg > 0.0 {
            s.avg_missing_per_order / max_avg
        } else {
            0.0
        };
        s.risk_score = 0.7 * rate_norm + 0.3 * avg_norm;
    }

    sort_by_rate_desc(&mut stats, |s| s.risk_score);
    stats
}

/// Cutoff for calling a region problematic: mean complaint rate plus one
/// population standard deviation. Regions at or above it qualify.
pub fn problematic_region_threshold(regions: &[RegionStats]) -> Option<f64> {
    if regions.is_empty() {
        return None;
    }
    let rates: Vec<f64> = regions.iter().map(|r| r.complaint_rate).collect();
    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / rates.len() as f64;
    Some(mean + variance.sqrt())
}

/// Missing-item reports counted per product and joined against the
/// catalog. Products absent from the catalog get a placeholder name and
/// zero price rather than being dropped.
pub fn product_losses(missing: &[MissingItemRow], products: &[ProductRow]) -> Vec<ProductLoss> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for m in missing {
        *counts.entry(m.product_id.as_str()).or_insert(0) += 1;
    }

    let catalog: HashMap<&str, &ProductRow> = products
        .iter()
        .map(|p| (p.product_id.as_str(), p))
        .collect();

    let mut losses: Vec<ProductLoss> = counts
        .into_iter()
        .map(|(product_id, count)| match catalog.get(product_id) {
            Some(p) => ProductLoss {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                category: p.category.clone(),
                price: p.price,
                complaint_count: count,
                value_lost: p.price * count as f64,
            },
            None => ProductLoss {
                product_id: product_id.to_string(),
                name: format!("Product {}", product_id),
                category: "Uncategorized".to_string(),
                price: 0.0,
                complaint_count: count,
                value_lost: 0.0,
            },
        })
        .collect();

    losses.sort_by(|a, b| {
        b.value_lost
            .partial_cmp(&a.value_lost)
            .unwrap_or(Ordering::Equal)
            .then(b.complaint_count.cmp(&a.complaint_count))
            .then(a.product_id.cmp(&b.product_id))
    });
    losses
}

/// Category rollup of product losses, sorted by value lost.
pub fn category_summary(losses: &[ProductLoss]) -> Vec<CategorySummary> {
    let mut grouped: BTreeMap<&str, (u64, u64, f64, f64)> = BTreeMap::new();
    for l in losses {
        let entry = grouped.entry(l.category.as_str()).or_insert((0, 0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += l.complaint_count;
        entry.2 += l.price;
        entry.3 += l.value_lost;
    }

    let mut summaries: Vec<CategorySummary> = grouped
        .into_iter()
        .map(
            |(category, (product_count, total_reports, price_sum, value_lost))| CategorySummary {
                category: category.to_string(),
                product_count,
                total_reports,
                avg_price: if product_count == 0 {
                    0.0
                } else {
                    price_sum / product_count as f64
                },
                value_lost,
            },
        )
        .collect();

    sort_by_rate_desc(&mut summaries, |s| s.value_lost);
    summaries
}

/// Order volume and complaint rate per delivery hour, ascending by hour.
/// Only hours present in the data appear.
pub fn hourly_buckets(orders: &[OrderRow]) -> Vec<HourlyBucket> {
    let mut grouped: BTreeMap<u8, (u64, u64)> = BTreeMap::new();
    for o in orders {
        let entry = grouped.entry(o.delivery_hour).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += o.items_missing as u64;
    }

    grouped
        .into_iter()
        .map(|(hour, (order_count, missing))| HourlyBucket {
            hour,
            period: PeriodOfDay::from_hour(hour),
            total_orders: order_count,
            missing_items: missing,
            complaint_rate: fraud_rate(missing, order_count),
        })
        .collect()
}

/// Daily trend: one bucket per calendar date, sorted ascending and unique,
/// with calendar fields and 7/30-day rolling averages of the rate.
pub fn daily_buckets(orders: &[OrderRow]) -> Vec<DailyBucket> {
    let mut grouped: BTreeMap<chrono::NaiveDate, (u64, u64)> = BTreeMap::new();
    for o in orders {
        let entry = grouped.entry(o.date).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += o.items_missing as u64;
    }

    let mut buckets: Vec<DailyBucket> = grouped
        .into_iter()
        .map(|(date, (order_count, missing))| DailyBucket {
            date,
            weekday: date.format("%A").to_string(),
            month: date.month(),
            quarter: (date.month() - 1) / 3 + 1,
            iso_week: date.iso_week().week(),
            total_orders: order_count,
            missing_items: missing,
            complaint_rate: fraud_rate(missing, order_count),
            rate_ma7: 0.0,
            rate_ma30: 0.0,
        })
        .collect();

    let rates: Vec<f64> = buckets.iter().map(|b| b.complaint_rate).collect();
    let ma7 = rolling_average(&rates, 7);
    let ma30 = rolling_average(&rates, 30);
    for (i, b) in buckets.iter_mut().enumerate() {
        b.rate_ma7 = ma7[i];
        b.rate_ma30 = ma30[i];
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(id: &str, date: (i32, u32, u32), hour: u8, region: &str, driver: &str, missing: u32) -> OrderRow {
        OrderRow {
            order_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            delivery_hour: hour,
            region: region.to_string(),
            driver_id: driver.to_string(),
            customer_id: "C001".to_string(),
            items_delivered: 5,
            items_missing: missing,
        }
    }

    fn driver(id: &str, name: &str) -> DriverRow {
        DriverRow {
            driver_id: id.to_string(),
            name: name.to_string(),
            age: 35,
        }
    }

    #[test]
    fn fraud_rate_is_zero_on_zero_total() {
        assert_eq!(fraud_rate(5, 0), 0.0);
    }

    #[test]
    fn fraud_rate_is_never_negative_and_not_clamped() {
        assert_eq!(fraud_rate(0, 10), 0.0);
        assert_eq!(fraud_rate(3, 3), 100.0);
        assert_eq!(fraud_rate(6, 3), 200.0);
    }

    #[test]
    fn rolling_average_shrinks_window_at_head() {
        let series = [4.0, 8.0, 6.0, 10.0];
        let ma = rolling_average(&series, 7);
        assert_eq!(ma[0], series[0]);
        assert!((ma[1] - 6.0).abs() < 1e-9);
        assert!((ma[3] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn rolling_average_uses_trailing_window() {
        let series = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ma = rolling_average(&series, 3);
        assert!((ma[4] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn driver_rate_counts_multiple_missing_items() {
        let orders = vec![
            order("O1", (2025, 3, 1), 9, "North", "D1", 0),
            order("O2", (2025, 3, 2), 9, "North", "D1", 1),
            order("O3", (2025, 3, 3), 9, "North", "D1", 2),
        ];
        let drivers = vec![driver("D1", "Alex Moreno")];
        let stats = driver_stats(&orders, &drivers, &AnalysisConfig::default());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_deliveries, 3);
        assert_eq!(stats[0].complaint_count, 3);
        assert_eq!(stats[0].complaint_rate, 100.0);
    }

    #[test]
    fn suspicious_needs_rate_and_volume() {
        let cfg = AnalysisConfig {
            suspicious_rate_pct: 10.0,
            suspicious_min_volume: 3,
            ..AnalysisConfig::default()
        };
        // High rate, low volume: two orders, one missing item.
        let low_volume = vec![
            order("O1", (2025, 3, 1), 9, "North", "D1", 1),
            order("O2", (2025, 3, 2), 9, "North", "D1", 0),
        ];
        let drivers = vec![driver("D1", "Alex Moreno")];
        let stats = driver_stats(&low_volume, &drivers, &cfg);
        assert!(!stats[0].suspicious);
        assert!(suspicious_drivers(&stats).is_empty());

        // Same rate with enough volume.
        let enough = vec![
            order("O1", (2025, 3, 1), 9, "North", "D1", 1),
            order("O2", (2025, 3, 2), 9, "North", "D1", 0),
            order("O3", (2025, 3, 3), 9, "North", "D1", 1),
            order("O4", (2025, 3, 4), 9, "North", "D1", 0),
        ];
        let stats = driver_stats(&enough, &drivers, &cfg);
        assert!(stats[0].suspicious);
        assert_eq!(suspicious_drivers(&stats).len(), 1);
    }

    #[test]
    fn unrostered_driver_gets_placeholder() {
        let orders = vec![order("O1", (2025, 3, 1), 9, "North", "D9", 1)];
        let stats = driver_stats(&orders, &[], &AnalysisConfig::default());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "Driver D9");
        assert_eq!(stats[0].age, None);
    }

    #[test]
    fn empty_orders_yield_zeroed_roster() {
        let drivers = vec![driver("D1", "Alex Moreno")];
        let stats = driver_stats(&[], &drivers, &AnalysisConfig::default());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_deliveries, 0);
        assert_eq!(stats[0].complaint_rate, 0.0);
        assert!(!stats[0].suspicious);
    }

    #[test]
    fn customer_stats_mirror_driver_aggregation() {
        let mut orders = vec![
            order("O1", (2025, 3, 1), 9, "North", "D1", 1),
            order("O2", (2025, 3, 2), 9, "North", "D1", 1),
        ];
        orders[0].customer_id = "C7".to_string();
        orders[1].customer_id = "C7".to_string();
        let customers = vec![CustomerRow {
            customer_id: "C7".to_string(),
            name: "Helena Dias".to_string(),
            age: 41,
            region: "North".to_string(),
        }];
        let stats = customer_stats(&orders, &customers, &AnalysisConfig::default());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_orders, 2);
        assert_eq!(stats[0].complaint_count, 2);
        assert_eq!(stats[0].complaint_rate, 100.0);
        assert_eq!(stats[0].age, Some(41));
    }

    #[test]
    fn region_risk_score_is_normalized_weighted_sum() {
        let orders = vec![
            // North: 2 orders, 2 missing -> rate 100, avg 1.0
            order("O1", (2025, 3, 1), 9, "North", "D1", 1),
            order("O2", (2025, 3, 2), 9, "North", "D1", 1),
            // South: 2 orders, 1 missing -> rate 50, avg 0.5
            order("O3", (2025, 3, 1), 9, "South", "D2", 1),
            order("O4", (2025, 3, 2), 9, "South", "D2", 0),
        ];
        let stats = region_stats(&orders);
        assert_eq!(stats.len(), 2);
        let north = stats.iter().find(|s| s.region == "North").unwrap();
        let south = stats.iter().find(|s| s.region == "South").unwrap();
        assert!((north.risk_score - 1.0).abs() < 1e-9);
        assert!((south.risk_score - 0.5).abs() < 1e-9);
        // Sorted by risk descending.
        assert_eq!(stats[0].region, "North");
    }

    #[test]
    fn region_risk_score_survives_all_zero_columns() {
        let orders = vec![order("O1", (2025, 3, 1), 9, "North", "D1", 0)];
        let stats = region_stats(&orders);
        assert_eq!(stats[0].risk_score, 0.0);
    }

    #[test]
    fn problematic_threshold_is_mean_plus_std() {
        let regions = vec![
            RegionStats {
                region: "A".to_string(),
                total_orders: 100,
                total_missing_items: 2,
                avg_missing_per_order: 0.02,
                complaint_rate: 2.0,
                risk_score: 0.0,
            },
            RegionStats {
                region: "B".to_string(),
                total_orders: 100,
                total_missing_items: 9,
                avg_missing_per_order: 0.09,
                complaint_rate: 9.0,
                risk_score: 0.0,
            },
        ];
        let threshold = problematic_region_threshold(&regions).unwrap();
        // mean 5.5, population std 3.5
        assert!((threshold - 9.0).abs() < 1e-9);
        let problematic: Vec<&RegionStats> = regions
            .iter()
            .filter(|r| r.complaint_rate >= threshold)
            .collect();
        assert_eq!(problematic.len(), 1);
        assert_eq!(problematic[0].region, "B");
    }

    #[test]
    fn problematic_threshold_on_empty_input() {
        assert!(problematic_region_threshold(&[]).is_none());
    }

    #[test]
    fn product_losses_join_and_value() {
        let products = vec![ProductRow {
            product_id: "P1".to_string(),
            name: "Wireless Earbuds".to_string(),
            category: "Electronics".to_string(),
            price: 50.0,
            }];
        let missing = vec![
            MissingItemRow { order_id: "O1".to_string(), product_id: "P1".to_string() },
            MissingItemRow { order_id: "O2".to_string(), product_id: "P1".to_string() },
            MissingItemRow { order_id: "O3".to_string(), product_id: "P9".to_string() },
        ];
        let losses = product_losses(&missing, &products);
        assert_eq!(losses.len(), 2);
        assert_eq!(losses[0].product_id, "P1");
        assert_eq!(losses[0].complaint_count, 2);
        assert!((losses[0].value_lost - 100.0).abs() < 1e-9);
        // Unknown product kept with placeholder, not dropped.
        assert_eq!(losses[1].name, "Product P9");
        assert_eq!(losses[1].value_lost, 0.0);
    }

    #[test]
    fn category_summary_rolls_up() {
        let losses = vec![
            ProductLoss {
                product_id: "P1".to_string(),
                name: "Wireless Earbuds".to_string(),
                category: "Electronics".to_string(),
                price: 50.0,
                complaint_count: 2,
                value_lost: 100.0,
            },
            ProductLoss {
                product_id: "P2".to_string(),
                name: "HDMI Cable".to_string(),
                category: "Electronics".to_string(),
                price: 10.0,
                complaint_count: 1,
                value_lost: 10.0,
            },
        ];
        let summary = category_summary(&losses);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].product_count, 2);
        assert_eq!(summary[0].total_reports, 3);
        assert!((summary[0].avg_price - 30.0).abs() < 1e-9);
        assert!((summary[0].value_lost - 110.0).abs() < 1e-9);
    }

    #[test]
    fn hourly_buckets_sorted_with_period() {
        let orders = vec![
            order("O1", (2025, 3, 1), 18, "North", "D1", 1),
            order("O2", (2025, 3, 1), 6, "North", "D1", 0),
            order("O3", (2025, 3, 1), 6, "North", "D1", 1),
        ];
        let buckets = hourly_buckets(&orders);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].hour, 6);
        assert_eq!(buckets[0].period, PeriodOfDay::Morning);
        assert_eq!(buckets[0].total_orders, 2);
        assert_eq!(buckets[0].complaint_rate, 50.0);
        assert_eq!(buckets[1].period, PeriodOfDay::Evening);
    }

    #[test]
    fn daily_buckets_sorted_unique_with_rolling() {
        let orders = vec![
            order("O1", (2025, 3, 3), 9, "North", "D1", 0),
            order("O2", (2025, 3, 1), 9, "North", "D1", 1),
            order("O3", (2025, 3, 3), 9, "North", "D1", 2),
            order("O4", (2025, 3, 2), 9, "North", "D1", 0),
        ];
        let buckets = daily_buckets(&orders);
        assert_eq!(buckets.len(), 3);
        assert!(buckets.windows(2).all(|w| w[0].date < w[1].date));
        // March 3rd deduplicated into one bucket of two orders.
        assert_eq!(buckets[2].total_orders, 2);
        assert_eq!(buckets[2].complaint_rate, 100.0);
        // Head of the series: shrunk window equals the day's own rate.
        assert_eq!(buckets[0].rate_ma7, buckets[0].complaint_rate);
        assert_eq!(buckets[0].weekday, "Saturday");
        assert_eq!(buckets[0].quarter, 1);
    }
}
