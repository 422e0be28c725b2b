use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Delivery order as stored in the `orders` table. Source of truth,
/// immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub order_id: String,
    pub date: NaiveDate,
    pub delivery_hour: u8,
    pub region: String,
    pub driver_id: String,
    pub customer_id: String,
    pub items_delivered: u32,
    pub items_missing: u32,
}

impl OrderRow {
    pub fn total_items(&self) -> u32 {
        self.items_delivered + self.items_missing
    }

    /// Fraction of the order reported missing. 0 when the order is empty.
    pub fn missing_ratio(&self) -> f64 {
        let total = self.total_items();
        if total == 0 {
            0.0
        } else {
            self.items_missing as f64 / total as f64
        }
    }

    pub fn period(&self) -> PeriodOfDay {
        PeriodOfDay::from_hour(self.delivery_hour)
    }
}

/// Driver roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRow {
    pub driver_id: String,
    pub name: String,
    pub age: u32,
}

/// Customer roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub customer_id: String,
    pub name: String,
    pub age: u32,
    pub region: String,
}

/// Product catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// One reported missing unit, joining an order to a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingItemRow {
    pub order_id: String,
    pub product_id: String,
}

/// Six-hour delivery window buckets. Half-open intervals, so a boundary
/// hour belongs to the later bucket (hour 6 is Morning, hour 18 Evening).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl PeriodOfDay {
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            0..=5 => PeriodOfDay::Night,
            6..=11 => PeriodOfDay::Morning,
            12..=17 => PeriodOfDay::Afternoon,
            _ => PeriodOfDay::Evening,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodOfDay::Night => "Night",
            PeriodOfDay::Morning => "Morning",
            PeriodOfDay::Afternoon => "Afternoon",
            PeriodOfDay::Evening => "Evening",
        }
    }
}

impl std::fmt::Display for PeriodOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-driver aggregate, recomputed from orders on every request.
#[derive(Debug, Clone, Serialize)]
pub struct DriverStats {
    pub driver_id: String,
    pub name: String,
    pub age: Option<u32>,
    pub total_deliveries: u64,
    pub complaint_count: u64,
    pub complaint_rate: f64,
    pub avg_missing_items: f64,
    pub suspicious: bool,
}

/// Per-customer aggregate, mirror of `DriverStats`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerStats {
    pub customer_id: String,
    pub name: String,
    pub age: Option<u32>,
    pub total_orders: u64,
    pub complaint_count: u64,
    pub complaint_rate: f64,
    pub avg_missing_items: f64,
    pub suspicious: bool,
}

/// Per-region aggregate with a normalized risk score for ranking.
#[derive(Debug, Clone, Serialize)]
pub struct RegionStats {
    pub region: String,
    pub total_orders: u64,
    pub total_missing_items: u64,
    pub avg_missing_per_order: f64,
    pub complaint_rate: f64,
    pub risk_score: f64,
}

/// Missing-item reports joined against the product catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ProductLoss {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub complaint_count: u64,
    pub value_lost: f64,
}

/// Category-level rollup of `ProductLoss` rows.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub product_count: u64,
    pub total_reports: u64,
    pub avg_price: f64,
    pub value_lost: f64,
}

/// Hour-of-day aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyBucket {
    pub hour: u8,
    pub period: PeriodOfDay,
    pub total_orders: u64,
    pub missing_items: u64,
    pub complaint_rate: f64,
}

/// Calendar-date aggregate with derived calendar fields and rolling
/// averages. Always chronologically sorted and unique per date.
#[derive(Debug, Clone, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub weekday: String,
    pub month: u32,
    pub quarter: u32,
    pub iso_week: u32,
    pub total_orders: u64,
    pub missing_items: u64,
    pub complaint_rate: f64,
    pub rate_ma7: f64,
    pub rate_ma30: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(hour: u8, delivered: u32, missing: u32) -> OrderRow {
        OrderRow {
            order_id: "O001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            delivery_hour: hour,
            region: "North".to_string(),
            driver_id: "D001".to_string(),
            customer_id: "C001".to_string(),
            items_delivered: delivered,
            items_missing: missing,
        }
    }

    #[test]
    fn period_boundaries_belong_to_later_bucket() {
        let hours = [5u8, 6, 11, 12, 17, 18];
        let periods: Vec<PeriodOfDay> = hours.iter().map(|h| PeriodOfDay::from_hour(*h)).collect();
        assert_eq!(
            periods,
            vec![
                PeriodOfDay::Night,
                PeriodOfDay::Morning,
                PeriodOfDay::Morning,
                PeriodOfDay::Afternoon,
                PeriodOfDay::Afternoon,
                PeriodOfDay::Evening,
            ]
        );
    }

    #[test]
    fn period_covers_midnight_and_late_evening() {
        assert_eq!(PeriodOfDay::from_hour(0), PeriodOfDay::Night);
        assert_eq!(PeriodOfDay::from_hour(23), PeriodOfDay::Evening);
    }

    #[test]
    fn missing_ratio_handles_empty_order() {
        assert_eq!(order(10, 0, 0).missing_ratio(), 0.0);
    }

    #[test]
    fn missing_ratio_counts_missing_against_total() {
        let o = order(10, 3, 1);
        assert_eq!(o.total_items(), 4);
        assert!((o.missing_ratio() - 0.25).abs() < 1e-9);
    }
}
