//! In-memory invoice store
//!
//! Non-durable store used when no database is configured, and in tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::invoice::InvoiceStore;

#[derive(Debug, Default)]
struct Mappings {
    by_order: HashMap<String, i64>,
    issued: HashSet<i64>,
}

/// Mutex-guarded map with the same uniqueness rules as the SQL table.
#[derive(Debug, Default)]
pub struct MemoryInvoiceStore {
    inner: Mutex<Mappings>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn find_invoice_number(&self, order_number: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.inner.lock().await.by_order.get(order_number).copied())
    }

    async fn max_invoice_number(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.inner.lock().await.issued.iter().max().copied())
    }

    async fn insert(&self, order_number: &str, invoice_number: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        if inner.by_order.contains_key(order_number) || inner.issued.contains(&invoice_number) {
            return Err(StoreError::Conflict {
                order_number: order_number.to_string(),
                invoice_number,
            });
        }

        inner.by_order.insert(order_number.to_string(), invoice_number);
        inner.issued.insert(invoice_number);
        Ok(())
    }

    async fn list_order_numbers(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.lock().await.by_order.keys().cloned().collect())
    }
}
