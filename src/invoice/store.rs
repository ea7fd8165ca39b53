//! Invoice Store Trait
//!
//! The durable side of invoice numbering: a single relation from order
//! number to invoice number.

use async_trait::async_trait;

use crate::error::StoreError;

/// Durable order-number to invoice-number mapping.
///
/// Implementations must enforce uniqueness of both columns and report a
/// violation as [`StoreError::Conflict`], never as `Unavailable`; the
/// allocator relies on that to tell a lost race from an outage.
#[async_trait]
pub trait InvoiceStore: Send + Sync + std::fmt::Debug {
    /// Invoice number already mapped to `order_number`, if any.
    async fn find_invoice_number(&self, order_number: &str) -> Result<Option<i64>, StoreError>;

    /// Highest invoice number issued so far, `None` when nothing is stored.
    async fn max_invoice_number(&self) -> Result<Option<i64>, StoreError>;

    /// Persists a new mapping.
    async fn insert(&self, order_number: &str, invoice_number: i64) -> Result<(), StoreError>;

    /// Every order number with a mapping, in no particular order.
    async fn list_order_numbers(&self) -> Result<Vec<String>, StoreError>;

    /// Releases connections held by the store.
    async fn close(&self) {}
}
