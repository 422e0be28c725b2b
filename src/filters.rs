//! Filtering layer
//! Pure, idempotent narrowing of tables before display. Each function
//! returns a new vector; inputs are never mutated.

use chrono::NaiveDate;

use crate::models::{OrderRow, ProductLoss};

/// A user selection where "all" is a valid, no-op choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    /// Parse a CLI argument; absent or any casing of "all" means no filter.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => Selection::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Selection::All,
            Some(s) => Selection::Only(s.to_string()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(v) => v == value,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Only(v) => f.write_str(v),
        }
    }
}

/// Orders within `[start, end]`, bounds inclusive.
pub fn filter_by_date_range(orders: &[OrderRow], start: NaiveDate, end: NaiveDate) -> Vec<OrderRow> {
    orders
        .iter()
        .filter(|o| o.date >= start && o.date <= end)
        .cloned()
        .collect()
}

pub fn filter_by_region(orders: &[OrderRow], region: &Selection) -> Vec<OrderRow> {
    orders
        .iter()
        .filter(|o| region.matches(&o.region))
        .cloned()
        .collect()
}

pub fn filter_by_category(losses: &[ProductLoss], category: &Selection) -> Vec<ProductLoss> {
    losses
        .iter()
        .filter(|l| category.matches(&l.category))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, date: (i32, u32, u32), region: &str) -> OrderRow {
        OrderRow {
            order_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            delivery_hour: 12,
            region: region.to_string(),
            driver_id: "D001".to_string(),
            customer_id: "C001".to_string(),
            items_delivered: 5,
            items_missing: 0,
        }
    }

    fn sample_orders() -> Vec<OrderRow> {
        vec![
            order("O1", (2025, 1, 10), "North"),
            order("O2", (2025, 2, 15), "South"),
            order("O3", (2025, 3, 20), "North"),
        ]
    }

    #[test]
    fn date_range_is_inclusive() {
        let orders = sample_orders();
        let start = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
        let filtered = filter_by_date_range(&orders, start, end);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn date_range_filter_is_idempotent() {
        let orders = sample_orders();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let once = filter_by_date_range(&orders, start, end);
        let twice = filter_by_date_range(&once, start, end);
        assert_eq!(once, twice);
    }

    #[test]
    fn all_selection_is_a_no_op() {
        let orders = sample_orders();
        let filtered = filter_by_region(&orders, &Selection::All);
        assert_eq!(filtered, orders);
    }

    #[test]
    fn region_filter_keeps_exact_matches_and_is_idempotent() {
        let orders = sample_orders();
        let sel = Selection::Only("North".to_string());
        let once = filter_by_region(&orders, &sel);
        assert_eq!(once.len(), 2);
        assert!(once.iter().all(|o| o.region == "North"));
        assert_eq!(filter_by_region(&once, &sel), once);
    }

    #[test]
    fn selection_parses_all_case_insensitively() {
        assert_eq!(Selection::from_arg(None), Selection::All);
        assert_eq!(Selection::from_arg(Some("ALL")), Selection::All);
        assert_eq!(
            Selection::from_arg(Some("Electronics")),
            Selection::Only("Electronics".to_string())
        );
    }

    #[test]
    fn category_filter_on_losses() {
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
                name: "Orange Juice".to_string(),
                category: "Groceries".to_string(),
                price: 4.0,
                complaint_count: 5,
                value_lost: 20.0,
            },
        ];
        let sel = Selection::Only("Groceries".to_string());
        let filtered = filter_by_category(&losses, &sel);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].product_id, "P2");
    }
}
