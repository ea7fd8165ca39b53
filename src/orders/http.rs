//! HTTP order source
//!
//! Reads sales orders from the vendor's `SalesOrder` endpoint. Each response
//! carries its orders under a `List` key; a missing key means no orders.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::orders::{OrderQuery, OrderSource};

/// Orders requested per status when listing a date window.
const RANGE_PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
struct SalesOrderPage {
    #[serde(rename = "List", default)]
    list: Vec<Value>,
}

/// [`OrderSource`] backed by the sales-order REST API.
#[derive(Debug, Clone)]
pub struct HttpOrderSource {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpOrderSource {
    /// `base_url` is the API root, e.g. `https://api.example.com/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    async fn fetch_page(&self, params: &[(&str, String)]) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}/SalesOrder", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Request(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let page: SalesOrderPage = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        debug!(count = page.list.len(), "Fetched sales-order page");
        Ok(page.list)
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn fetch(&self, query: &OrderQuery) -> Result<Value, SourceError> {
        match query {
            OrderQuery::Single { order_number } => {
                let list = self
                    .fetch_page(&[
                        ("pageNumber", "1".to_string()),
                        ("pageSize", "1".to_string()),
                        ("orderNumber", order_number.clone()),
                    ])
                    .await?;
                Ok(Value::Array(list))
            }
            OrderQuery::Range {
                statuses,
                created_from,
                created_to,
            } => {
                let mut merged = Vec::new();
                for status in statuses {
                    let list = self
                        .fetch_page(&[
                            ("pageNumber", "1".to_string()),
                            ("pageSize", RANGE_PAGE_SIZE.to_string()),
                            ("status", status.clone()),
                            ("createdFrom", api_date(created_from)),
                            ("createdTo", api_date(created_to)),
                        ])
                        .await?;
                    merged.extend(list);
                }

                sort_newest_first(&mut merged);
                Ok(Value::Array(merged))
            }
        }
    }
}

/// Dates go over the wire as `MM/dd/yy`.
fn api_date(date: &NaiveDate) -> String {
    date.format("%m/%d/%y").to_string()
}

/// Orders by `CreatedDate` descending. The API sends ISO 8601 timestamps in
/// one format, so they order correctly as strings; undated orders go last.
fn sort_newest_first(orders: &mut [Value]) {
    orders.sort_by(|a, b| {
        let created = |order: &Value| {
            order
                .get("CreatedDate")
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        created(b).cmp(&created(a))
    });
}
