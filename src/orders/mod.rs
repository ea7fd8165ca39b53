//! Orders Module
//!
//! Read-through access to the external sales-order API. [`OrderSource`] is
//! the API seam; [`HttpOrderSource`] talks to the real API and
//! [`CachedOrderFeed`] decides when to call it and memoizes what it returns.

mod feed;
mod http;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde_json::Value;

use crate::error::SourceError;

pub use feed::{CachedOrderFeed, FetchedOrders};
pub use http::HttpOrderSource;

/// Order statuses listed when the caller names none.
pub const DEFAULT_STATUSES: [&str; 3] = ["12001", "12002", "12003"];

/// Days of history covered by the default sales-order window.
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

// == Order Query ==
/// What to fetch from the order API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderQuery {
    /// Orders in any of `statuses` created within `[created_from, created_to]`
    Range {
        statuses: Vec<String>,
        created_from: NaiveDate,
        created_to: NaiveDate,
    },
    /// A single order by its external number
    Single { order_number: String },
}

impl OrderQuery {
    pub fn range(
        statuses: impl IntoIterator<Item = impl Into<String>>,
        created_from: NaiveDate,
        created_to: NaiveDate,
    ) -> Self {
        OrderQuery::Range {
            statuses: statuses.into_iter().map(Into::into).collect(),
            created_from,
            created_to,
        }
    }

    pub fn single(order_number: impl Into<String>) -> Self {
        OrderQuery::Single {
            order_number: order_number.into(),
        }
    }

    /// Cache key built from every parameter of the query, so two queries
    /// share an entry only when they would fetch the same data.
    pub fn cache_key(&self) -> String {
        match self {
            OrderQuery::Range {
                statuses,
                created_from,
                created_to,
            } => format!(
                "sales-orders:{}:{}:{}",
                statuses.join(","),
                created_from.format("%Y-%m-%d"),
                created_to.format("%Y-%m-%d")
            ),
            OrderQuery::Single { order_number } => format!("order:{}", order_number),
        }
    }
}

/// `[today - DEFAULT_WINDOW_DAYS, tomorrow]`, clamped to the calendar.
pub fn default_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from = today
        .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let to = today.succ_opt().unwrap_or(today);
    (from, to)
}

/// External order numbers found in an order list, in list order.
///
/// Entries without a string `OrderNumber` are skipped.
pub fn order_numbers(orders: &Value) -> Vec<&str> {
    orders
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|order| order.get("OrderNumber").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

// == Order Source ==
/// The external order API.
#[async_trait]
pub trait OrderSource: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, query: &OrderQuery) -> Result<Value, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_cache_key() {
        let query = OrderQuery::range(["12001", "12002"], date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(
            query.cache_key(),
            "sales-orders:12001,12002:2024-01-01:2024-01-31"
        );
    }

    #[test]
    fn test_single_cache_key() {
        assert_eq!(OrderQuery::single("A100").cache_key(), "order:A100");
    }

    #[test]
    fn test_default_window() {
        assert_eq!(
            default_window(date(2024, 3, 1)),
            (date(2024, 1, 31), date(2024, 3, 2))
        );
        assert_eq!(
            default_window(date(2023, 12, 31)),
            (date(2023, 12, 1), date(2024, 1, 1))
        );
    }

    #[test]
    fn test_order_numbers_skips_malformed_entries() {
        let orders = serde_json::json!([
            { "OrderNumber": "A100" },
            { "Total": 3 },
            { "OrderNumber": 7 },
            { "OrderNumber": "A101" }
        ]);
        assert_eq!(order_numbers(&orders), vec!["A100", "A101"]);
        assert!(order_numbers(&serde_json::json!({})).is_empty());
    }

    #[test]
    fn test_different_windows_have_different_keys() {
        let last_30 = OrderQuery::range(["12001"], date(2024, 1, 1), date(2024, 1, 31));
        let last_7 = OrderQuery::range(["12001"], date(2024, 1, 24), date(2024, 1, 31));
        assert_ne!(last_30.cache_key(), last_7.cache_key());
    }
}
