//! Invoice Module
//!
//! Maps external order numbers to durable, sequential invoice numbers.

mod allocator;
mod memory;
mod sqlite;
mod store;

pub use allocator::{InvoiceAllocator, DEFAULT_MAX_ATTEMPTS};
pub use memory::MemoryInvoiceStore;
pub use sqlite::{SqliteInvoiceStore, SqliteStoreConfig};
pub use store::InvoiceStore;
