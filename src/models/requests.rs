//! Request DTOs for the invoice service API
//!
//! Defines the query strings accepted by the HTTP handlers.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::orders::{default_window, OrderQuery, DEFAULT_STATUSES};

/// Query string for endpoints backed by the order cache
/// (`?force=true` bypasses the cache)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshParams {
    /// Refetch from the order API even if a cached copy exists
    #[serde(default)]
    pub force: bool,
}

/// Query string for GET /api/sales-orders
///
/// Dates are `YYYY-MM-DD`; `statuses` is comma-separated. Missing dates come
/// from [`default_window`], missing statuses from [`DEFAULT_STATUSES`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesOrdersParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub statuses: Option<String>,
    #[serde(default)]
    pub force: bool,
}

impl SalesOrdersParams {
    /// Builds the order query for these parameters, or a message saying why
    /// they do not describe a window.
    pub fn order_query(&self, today: NaiveDate) -> Result<OrderQuery, String> {
        let (default_from, default_to) = default_window(today);

        let from = self.from.unwrap_or(default_from);
        let to = self.to.unwrap_or(default_to);
        if from > to {
            return Err(format!("'from' ({}) is after 'to' ({})", from, to));
        }

        let statuses: Vec<String> = self
            .statuses
            .iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .map(str::to_string)
            .collect();
        if statuses.is_empty() {
            return Ok(OrderQuery::range(DEFAULT_STATUSES, from, to));
        }

        Ok(OrderQuery::range(statuses, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_refresh_params_default() {
        let params: RefreshParams = serde_json::from_str("{}").unwrap();
        assert!(!params.force);
    }

    #[test]
    fn test_refresh_params_force() {
        let params: RefreshParams = serde_json::from_str(r#"{"force": true}"#).unwrap();
        assert!(params.force);
    }

    #[test]
    fn test_sales_orders_params_defaults() {
        let params = SalesOrdersParams::default();
        let today = date(2024, 3, 1);

        assert_eq!(
            params.order_query(today).unwrap(),
            OrderQuery::range(DEFAULT_STATUSES, date(2024, 1, 31), date(2024, 3, 2))
        );
    }

    #[test]
    fn test_sales_orders_params_explicit_window() {
        let params = SalesOrdersParams {
            from: Some(date(2024, 1, 1)),
            to: Some(date(2024, 1, 31)),
            statuses: Some(" 12001, ,12003".to_string()),
            force: false,
        };

        assert_eq!(
            params.order_query(date(2024, 3, 1)).unwrap(),
            OrderQuery::range(["12001", "12003"], date(2024, 1, 1), date(2024, 1, 31))
        );
    }

    #[test]
    fn test_sales_orders_params_blank_statuses_use_defaults() {
        let params = SalesOrdersParams {
            statuses: Some(",".to_string()),
            ..Default::default()
        };

        match params.order_query(date(2024, 3, 1)).unwrap() {
            OrderQuery::Range { statuses, .. } => assert_eq!(statuses, DEFAULT_STATUSES),
            other => panic!("expected a range query, got {other:?}"),
        }
    }

    #[test]
    fn test_sales_orders_params_inverted_window() {
        let params = SalesOrdersParams {
            from: Some(date(2024, 2, 1)),
            to: Some(date(2024, 1, 1)),
            ..Default::default()
        };

        assert!(params.order_query(date(2024, 3, 1)).is_err());
    }
}
