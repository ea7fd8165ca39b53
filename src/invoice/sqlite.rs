//! SQLite invoice store
//!
//! Persists mappings in a single `orders` table through a sqlx pool. The
//! table's PRIMARY KEY and UNIQUE constraints are what turn a lost
//! allocation race into a [`StoreError::Conflict`].

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::invoice::InvoiceStore;

const CREATE_ORDERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS orders (
        order_number   TEXT    PRIMARY KEY NOT NULL,
        invoice_number INTEGER NOT NULL UNIQUE
    )
";

// == Configuration ==
/// Connection settings for [`SqliteInvoiceStore`].
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// sqlx connection URL, e.g. `sqlite://invoices.db`
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
    /// Idle connections are closed after this long; `None` keeps them
    pub idle_timeout: Option<Duration>,
}

impl SqliteStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Private in-memory database on a single connection, for tests.
    ///
    /// The connection is never idled out since the data dies with it.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
        }
    }
}

// == Store ==
#[derive(Debug, Clone)]
pub struct SqliteInvoiceStore {
    pool: SqlitePool,
}

impl SqliteInvoiceStore {
    /// Opens the pool, creating the database file and `orders` table if
    /// they do not exist yet.
    pub async fn connect(config: SqliteStoreConfig) -> Result<Self, StoreError> {
        info!(url = %config.url, "Connecting invoice store");

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_ORDERS_TABLE).execute(&pool).await?;

        info!(
            max_connections = config.max_connections,
            "Invoice store ready"
        );

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl InvoiceStore for SqliteInvoiceStore {
    async fn find_invoice_number(&self, order_number: &str) -> Result<Option<i64>, StoreError> {
        let invoice_number =
            sqlx::query_scalar::<_, i64>("SELECT invoice_number FROM orders WHERE order_number = ?")
                .bind(order_number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(invoice_number)
    }

    async fn max_invoice_number(&self) -> Result<Option<i64>, StoreError> {
        let max = sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(invoice_number) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(max)
    }

    async fn insert(&self, order_number: &str, invoice_number: i64) -> Result<(), StoreError> {
        let result = sqlx::query("INSERT INTO orders (order_number, invoice_number) VALUES (?, ?)")
            .bind(order_number)
            .bind(invoice_number)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                debug!(order_number, invoice_number, "Inserted invoice mapping");
                Ok(())
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict {
                    order_number: order_number.to_string(),
                    invoice_number,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_order_numbers(&self) -> Result<Vec<String>, StoreError> {
        let orders = sqlx::query_scalar::<_, String>("SELECT order_number FROM orders")
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    async fn close(&self) {
        info!("Closing invoice store");
        self.pool.close().await;
    }
}
