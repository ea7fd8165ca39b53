//! API Module
//!
//! HTTP handlers and routing for the invoice service REST API.
//!
//! # Endpoints
//! - `GET /api/cache` - Cache statistics
//! - `DELETE /api/cache` - Clear the cache
//! - `GET /api/invoices` - List order numbers with invoice numbers
//! - `GET /api/invoices/:order_number` - Get or assign an invoice number
//! - `GET /api/invoices/:order_number/exists` - Check for an invoice number
//! - `GET /api/orders/:order_number` - Order details plus invoice number
//! - `GET /api/sales-orders` - Orders in a date window plus which are invoiced
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
