//! Response DTOs for the invoice service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for GET /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Entries currently held
    pub total: usize,
    /// Entries within their TTL
    pub valid: usize,
    /// Entries past their TTL, not yet swept
    pub expired: usize,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub message: String,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            total: stats.total,
            valid: stats.valid,
            expired: stats.expired,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            message: "Cache status retrieved successfully".to_string(),
        }
    }
}

/// Response body for DELETE /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for GET /api/invoices/:order_number
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub order_number: String,
    pub invoice_number: i64,
}

/// Response body for GET /api/invoices/:order_number/exists
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub order_number: String,
    pub exists: bool,
}

/// Response body for GET /api/invoices
#[derive(Debug, Clone, Serialize)]
pub struct OrderNumbersResponse {
    pub count: usize,
    pub order_numbers: Vec<String>,
}

impl OrderNumbersResponse {
    pub fn new(order_numbers: Vec<String>) -> Self {
        Self {
            count: order_numbers.len(),
            order_numbers,
        }
    }
}

/// Response body for GET /api/orders/:order_number
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    /// Order details as returned by the order API
    pub orders: Value,
    pub invoice_number: i64,
    /// True when the order details came from the cache
    pub cached: bool,
}

/// Response body for GET /api/sales-orders
#[derive(Debug, Clone, Serialize)]
pub struct SalesOrdersResponse {
    /// Orders in the window, newest first
    pub sales_orders: Value,
    /// Listed orders that already have an invoice number
    pub order_numbers: Vec<String>,
    /// True when the orders came from the cache
    pub cached: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
