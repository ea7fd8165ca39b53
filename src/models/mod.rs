//! Request and Response models for the invoice service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{RefreshParams, SalesOrdersParams};
pub use responses::{
    CacheStatsResponse, ExistsResponse, HealthResponse, InvoiceResponse, MessageResponse,
    OrderNumbersResponse, OrderResponse, SalesOrdersResponse,
};
