//! Prometheus instant-query client.
//!
//! Issues `GET {address}/api/v1/query?query=<expr>` and reads the first
//! series of the vector result:
//!
//! ```json
//! {"status":"success","data":{"resultType":"vector",
//!   "result":[{"metric":{...},"value":[1718000000.5,"42"]}]}}
//! ```

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use tracing::{debug, warn};

use podtune_core::config::PrometheusConfig;

use crate::error::{SignalError, SignalResult};
use crate::{FALLBACK_SESSIONS, SignalSource};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<QueryData>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    result: Vec<Sample>,
}

#[derive(Debug, Deserialize)]
struct Sample {
    /// `[unix_timestamp, "value"]`
    value: (f64, String),
}

/// Signal source backed by a Prometheus-compatible HTTP API.
pub struct PrometheusSource {
    client: Client<HttpConnector, Empty<Bytes>>,
    uri: http::Uri,
    timeout: Duration,
}

impl PrometheusSource {
    /// Build a source for the configured address and query expression.
    ///
    /// Only plain `http://` addresses are supported.
    pub fn new(config: &PrometheusConfig, timeout: Duration) -> SignalResult<Self> {
        let uri = query_uri(&config.address, &config.query)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            uri,
            timeout,
        })
    }

    /// The fully-encoded query URI.
    pub fn uri(&self) -> &http::Uri {
        &self.uri
    }

    /// Run the query once. Unlike [`SignalSource::sessions`], errors are
    /// returned to the caller.
    pub async fn query(&self) -> SignalResult<u64> {
        let body = tokio::time::timeout(self.timeout, self.fetch())
            .await
            .map_err(|_| SignalError::Timeout(self.timeout))??;
        parse_query_response(&body)
    }

    async fn fetch(&self) -> SignalResult<Bytes> {
        let resp = self
            .client
            .get(self.uri.clone())
            .await
            .map_err(|e| SignalError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SignalError::Status(status.as_u16()));
        }

        let collected = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| SignalError::Body(e.to_string()))?;
        Ok(collected.to_bytes())
    }
}

#[async_trait::async_trait]
impl SignalSource for PrometheusSource {
    async fn sessions(&self) -> u64 {
        match self.query().await {
            Ok(sessions) => {
                debug!(sessions, "session count fetched");
                sessions
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = FALLBACK_SESSIONS,
                    "failed to fetch session count from prometheus"
                );
                FALLBACK_SESSIONS
            }
        }
    }
}

/// Decode an instant-query response body into a session count.
///
/// An empty result set is a valid answer (no active series) and yields
/// `0`. Fractional samples are truncated.
pub fn parse_query_response(body: &[u8]) -> SignalResult<u64> {
    let resp: QueryResponse = serde_json::from_slice(body)?;

    if resp.status.as_deref() == Some("error") {
        return Err(SignalError::Backend(
            resp.error.unwrap_or_else(|| "unspecified error".to_string()),
        ));
    }

    let data = resp
        .data
        .ok_or_else(|| SignalError::Backend("response has no data".to_string()))?;

    let Some(first) = data.result.first() else {
        return Ok(0);
    };

    let raw = &first.value.1;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SignalError::InvalidValue(raw.clone()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(SignalError::InvalidValue(raw.clone()));
    }

    Ok(value.trunc() as u64)
}

fn query_uri(address: &str, query: &str) -> SignalResult<http::Uri> {
    let base = format!("{}/api/v1/query", address.trim_end_matches('/'));
    let url = url::Url::parse_with_params(&base, &[("query", query)])
        .map_err(|e| SignalError::Address(format!("{address}: {e}")))?;

    if url.scheme() != "http" {
        return Err(SignalError::Address(format!(
            "{address}: unsupported scheme {}",
            url.scheme()
        )));
    }

    url.as_str()
        .parse::<http::Uri>()
        .map_err(|e| SignalError::Address(format!("{address}: {e}")))
}
