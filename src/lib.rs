//! Invoice Desk - sales-order cache and invoice numbering service
//!
//! Memoizes sales-order fetches in a TTL cache and assigns sequential,
//! durable invoice numbers to order numbers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod invoice;
pub mod models;
pub mod orders;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_sweep_task, SweepHandle};
