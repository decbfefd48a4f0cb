//! Public order book fetching over the Tor proxy.

use crate::order::Order;
use async_trait::async_trait;
use reqwest::{Client, Proxy, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Public book, all currencies, both sides.
pub const PUBLIC_ORDERS_QUERY: &str = "/api/book/?currency=0&type=2";

/// Upper bound on one fetch, connect through body.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid order book url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid proxy url {url:?}: {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("order book request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("order book returned status {0}")]
    Status(StatusCode),
    #[error("failed to decode order book: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can produce the current list of open orders.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetch the whole book. An error means no orders at all, never a partial list.
    async fn fetch(&self) -> Result<Vec<Order>, FetchError>;
}

/// Client for the coordinator's public API.
#[derive(Debug, Clone)]
pub struct RobosatsClient {
    url: Url,
    /// HTTP client (reused across cycles)
    client: Client,
}

impl RobosatsClient {
    /// Build a client for `base_url`, routing every request through `proxy_url`
    /// when one is given.
    pub fn new(
        base_url: &str,
        proxy_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let url = book_url(base_url)?;

        let mut builder = Client::builder().timeout(timeout);
        if let Some(proxy_url) = proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|source| FetchError::InvalidProxy {
                url: proxy_url.to_string(),
                source,
            })?;
            builder = builder.proxy(proxy);
        } else {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl OrderSource for RobosatsClient {
    async fn fetch(&self) -> Result<Vec<Order>, FetchError> {
        info!("Fetching orders...");

        let resp = self
            .client
            .get(self.url.clone())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = resp.bytes().await.map_err(FetchError::Request)?;
        debug!(body = %String::from_utf8_lossy(&bytes), "Got order book body");

        let orders = parse_order_book(&bytes)?;
        info!("Found {} orders", orders.len());

        Ok(orders)
    }
}

/// The API returns a JSON array at the top level.
pub fn parse_order_book(bytes: &[u8]) -> Result<Vec<Order>, FetchError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn book_url(base_url: &str) -> Result<Url, FetchError> {
    let full = format!("{}{}", base_url.trim_end_matches('/'), PUBLIC_ORDERS_QUERY);
    Url::parse(&full).map_err(|e| FetchError::InvalidUrl {
        url: full,
        reason: e.to_string(),
    })
}
