//! API Handlers
//!
//! HTTP request handlers for each invoice service endpoint.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::{self, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{ApiError, Result, StoreError};
use crate::invoice::{
    InvoiceAllocator, InvoiceStore, MemoryInvoiceStore, SqliteInvoiceStore, SqliteStoreConfig,
};
use crate::models::{
    CacheStatsResponse, ExistsResponse, HealthResponse, InvoiceResponse, MessageResponse,
    OrderNumbersResponse, OrderResponse, RefreshParams, SalesOrdersParams, SalesOrdersResponse,
};
use crate::orders::{self, CachedOrderFeed, HttpOrderSource, OrderQuery, OrderSource};

/// Application state shared across all handlers.
///
/// Everything here is constructed by the process entry point and injected;
/// there is no global state.
#[derive(Clone)]
pub struct AppState {
    /// Order cache shared with the sweep task
    pub cache: SharedCache<Value>,
    /// Invoice number allocator
    pub allocator: Arc<InvoiceAllocator>,
    /// Read-through access to the order API, when one is wired in
    pub orders: Option<CachedOrderFeed>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(cache: CacheStore<Value>, allocator: InvoiceAllocator) -> Self {
        Self {
            cache: cache::shared(cache),
            allocator: Arc::new(allocator),
            orders: None,
        }
    }

    /// Wires an order API client in front of the shared cache.
    pub fn with_order_source(mut self, source: Arc<dyn OrderSource>) -> Self {
        self.orders = Some(CachedOrderFeed::new(self.cache.clone(), source));
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the SQLite store when `database_url` is set, otherwise falls
    /// back to a non-durable in-memory store. The order API is wired in when
    /// `order_api_url` is set.
    pub async fn from_config(config: &Config) -> std::result::Result<Self, StoreError> {
        let store: Arc<dyn InvoiceStore> = match &config.database_url {
            Some(url) => {
                let store_config =
                    SqliteStoreConfig::new(url).max_connections(config.db_max_connections);
                Arc::new(SqliteInvoiceStore::connect(store_config).await?)
            }
            None => {
                info!("DATABASE_URL not set, invoice numbers will not survive a restart");
                Arc::new(MemoryInvoiceStore::new())
            }
        };

        let allocator = InvoiceAllocator::with_max_attempts(store, config.allocation_attempts);
        let state = Self::new(CacheStore::new(config.cache_ttl()), allocator);

        match &config.order_api_url {
            Some(url) => Ok(state.with_order_source(Arc::new(HttpOrderSource::new(url)))),
            None => {
                info!("ORDER_API_URL not set, order endpoints are disabled");
                Ok(state)
            }
        }
    }

    fn order_feed(&self) -> Result<&CachedOrderFeed> {
        self.orders
            .as_ref()
            .ok_or_else(|| ApiError::Unavailable("Order API is not configured".to_string()))
    }
}

/// Handler for GET /api/cache
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(CacheStatsResponse::from(stats))
}

/// Handler for DELETE /api/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.write().await.clear();
    info!("Cache cleared on request");
    Json(MessageResponse::new("Cache cleared successfully"))
}

/// Handler for GET /api/invoices
pub async fn list_invoices_handler(
    State(state): State<AppState>,
) -> Result<Json<OrderNumbersResponse>> {
    let order_numbers = state.allocator.all_order_numbers().await?;
    Ok(Json(OrderNumbersResponse::new(order_numbers)))
}

/// Handler for GET /api/invoices/:order_number
///
/// Returns the order's invoice number, assigning the next one if needed.
pub async fn allocate_invoice_handler(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<InvoiceResponse>> {
    let invoice_number = state.allocator.allocate(&order_number).await?;

    Ok(Json(InvoiceResponse {
        order_number,
        invoice_number,
    }))
}

/// Handler for GET /api/invoices/:order_number/exists
pub async fn invoice_exists_handler(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ExistsResponse>> {
    let exists = state.allocator.exists(&order_number).await?;
    Ok(Json(ExistsResponse {
        order_number,
        exists,
    }))
}

/// Handler for GET /api/orders/:order_number
///
/// Fetches the order through the cache, then resolves its invoice number.
/// `?force=true` refetches the order from the API.
pub async fn order_handler(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<OrderResponse>> {
    let feed = state.order_feed()?;

    if order_number.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Order number is required".to_string()));
    }

    let fetched = feed
        .get(&OrderQuery::single(order_number.as_str()), params.force)
        .await?;
    let invoice_number = state.allocator.allocate(&order_number).await?;

    Ok(Json(OrderResponse {
        orders: fetched.orders,
        invoice_number,
        cached: fetched.cached,
    }))
}

/// Handler for GET /api/sales-orders
///
/// Lists orders in a date window through the cache and reports which of them
/// already have an invoice number. No invoice numbers are assigned here.
pub async fn sales_orders_handler(
    State(state): State<AppState>,
    Query(params): Query<SalesOrdersParams>,
) -> Result<Json<SalesOrdersResponse>> {
    let feed = state.order_feed()?;
    let query = params
        .order_query(chrono::Utc::now().date_naive())
        .map_err(ApiError::InvalidRequest)?;

    let fetched = feed.get(&query, params.force).await?;

    let invoiced: HashSet<String> = state
        .allocator
        .all_order_numbers()
        .await?
        .into_iter()
        .collect();
    let order_numbers = orders::order_numbers(&fetched.orders)
        .into_iter()
        .filter(|number| invoiced.contains(*number))
        .map(str::to_string)
        .collect();

    Ok(Json(SalesOrdersResponse {
        sales_orders: fetched.orders,
        order_numbers,
        cached: fetched.cached,
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
