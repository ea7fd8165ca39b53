//! API Routes
//!
//! Configures the Axum router with all invoice service endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    allocate_invoice_handler, cache_stats_handler, clear_cache_handler, health_handler,
    invoice_exists_handler, list_invoices_handler, order_handler, sales_orders_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/cache` - Cache statistics
/// - `DELETE /api/cache` - Clear the cache
/// - `GET /api/invoices` - All order numbers with an invoice number
/// - `GET /api/invoices/:order_number` - Get or assign an invoice number
/// - `GET /api/invoices/:order_number/exists` - Whether an invoice number exists
/// - `GET /api/orders/:order_number` - Cached order details plus invoice number
/// - `GET /api/sales-orders` - Cached order listing plus which are invoiced
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (internal tool)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/cache",
            get(cache_stats_handler).delete(clear_cache_handler),
        )
        .route("/api/invoices", get(list_invoices_handler))
        .route("/api/invoices/:order_number", get(allocate_invoice_handler))
        .route(
            "/api/invoices/:order_number/exists",
            get(invoice_exists_handler),
        )
        .route("/api/orders/:order_number", get(order_handler))
        .route("/api/sales-orders", get(sales_orders_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::invoice::{InvoiceAllocator, MemoryInvoiceStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(
            CacheStore::new(Duration::from_secs(3600)),
            InvoiceAllocator::new(Arc::new(MemoryInvoiceStore::new())),
        );
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cache_endpoint_methods() {
        let app = create_test_app();

        let get_response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(get_response.status(), StatusCode::OK);

        let delete_response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(delete_response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invoice_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/invoices/A100")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/print")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
