//! Invoice Number Allocator
//!
//! Issues sequential invoice numbers to order numbers, once per order.
//!
//! Allocation is read-max-then-insert, which is not atomic on its own. Two
//! guards make it safe:
//! - an async mutex serializes allocations inside this process, held only
//!   across the store calls of one allocation;
//! - the store's uniqueness constraints catch writers outside this process,
//!   and a conflicting insert is retried with a fresh maximum.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::AllocatorError;
use crate::invoice::InvoiceStore;

/// Attempts made before a conflicting allocation gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug)]
pub struct InvoiceAllocator {
    store: Arc<dyn InvoiceStore>,
    /// Serializes the find/max/insert sequence
    allocation_lock: Mutex<()>,
    max_attempts: u32,
}

impl InvoiceAllocator {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self::with_max_attempts(store, DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates an allocator retrying conflicts up to `max_attempts` times in
    /// total. Values below 1 are treated as 1.
    pub fn with_max_attempts(store: Arc<dyn InvoiceStore>, max_attempts: u32) -> Self {
        Self {
            store,
            allocation_lock: Mutex::new(()),
            max_attempts: max_attempts.max(1),
        }
    }

    /// The store behind this allocator.
    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }

    // == Allocate ==
    /// Returns the invoice number for `order_number`, issuing the next one
    /// in sequence if the order has none yet.
    ///
    /// Repeated calls for the same order number always return the same
    /// value. Store failures are returned immediately; uniqueness conflicts
    /// are retried.
    pub async fn allocate(&self, order_number: &str) -> Result<i64, AllocatorError> {
        validate_order_number(order_number)?;

        // Already-mapped orders need no serialization
        if let Some(existing) = self.store.find_invoice_number(order_number).await? {
            debug!(order_number, invoice_number = existing, "Invoice number already assigned");
            return Ok(existing);
        }

        let _guard = self.allocation_lock.lock().await;
        let mut attempt = 0;

        loop {
            attempt += 1;

            // Re-check under the lock: a concurrent call may have just won
            if let Some(existing) = self.store.find_invoice_number(order_number).await? {
                debug!(order_number, invoice_number = existing, "Invoice number already assigned");
                return Ok(existing);
            }

            let next = match self.store.max_invoice_number().await? {
                None => 1,
                Some(max) => max
                    .checked_add(1)
                    .ok_or(AllocatorError::SequenceExhausted { max })?,
            };

            match self.store.insert(order_number, next).await {
                Ok(()) => {
                    info!(order_number, invoice_number = next, "Assigned invoice number");
                    return Ok(next);
                }
                Err(e) if e.is_conflict() => {
                    if attempt >= self.max_attempts {
                        warn!(order_number, attempt, "Giving up on invoice allocation: {}", e);
                        return Err(AllocatorError::AllocationConflict {
                            order_number: order_number.to_string(),
                            attempts: attempt,
                            source: e,
                        });
                    }
                    warn!(order_number, attempt, "Invoice allocation conflict, retrying: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // == Exists ==
    /// True iff a mapping has been persisted for `order_number`.
    pub async fn exists(&self, order_number: &str) -> Result<bool, AllocatorError> {
        Ok(self.store.find_invoice_number(order_number).await?.is_some())
    }

    // == All Order Numbers ==
    /// Every order number that has an invoice number, in no particular order.
    pub async fn all_order_numbers(&self) -> Result<Vec<String>, AllocatorError> {
        Ok(self.store.list_order_numbers().await?)
    }
}

fn validate_order_number(order_number: &str) -> Result<(), AllocatorError> {
    if order_number.trim().is_empty() {
        return Err(AllocatorError::InvalidOrderNumber(order_number.to_string()));
    }
    Ok(())
}
